//! Structural hash over JSON CRDT schema nodes.
//!
//! Mirrors `packages/json-joy/src/json-hash/structHashSchema.ts`.
//!
//! Provides `struct_hash_schema` which takes any schema node (via the
//! `NodeBuilder` trait) and returns a structural hash string.  The hash
//! format mirrors `struct_hash` / `struct_hash_crdt` for the equivalent
//! value type.

use crate::json_crdt_patch::schema::NodeBuilder;

/// Compute a structural hash string for any schema node.
///
/// Delegates to `NodeBuilder::struct_hash()` which is implemented by all
/// concrete schema node types (`ConNode`, `StrNode`, `BinNode`, `ValNode`,
/// `ObjNode`, `ArrNode`, `VecNode`).
///
/// Returns `"U"` for unknown or unimplemented node types.
pub fn struct_hash_schema(node: &dyn NodeBuilder) -> String {
    node.struct_hash()
}

// ── Tests ─────────────────────────────────────────────────────────────────
