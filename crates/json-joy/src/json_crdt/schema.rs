//! Schema inference from CRDT nodes.
//!
//! Mirrors:
//! - `json-crdt/schema/toSchema.ts`  → [`to_schema`]
//! - `json-crdt/schema/types.ts`      → (type aliases only — no runtime code)
//!
//! `to_schema` converts any JSON CRDT node tree to the corresponding schema
//! representation (a [`NodeBuilder`] box), which can then be used to
//! reproduce the structure in another document.

use super::nodes::{CrdtNode, NodeIndex, TsKey};
use crate::json_crdt_patch::clock::Ts;
use crate::json_crdt_patch::operations::ConValue;
use crate::json_crdt_patch::schema::{
    ArrNode as ArrSchema, BinNode as BinSchema, ConNode as ConSchema, NodeBuilder,
    ObjNode as ObjSchema, StrNode as StrSchema, ValNode as ValSchema, VecNode as VecSchema,
};

/// Resolve a node from the index by `Ts`.
#[inline]
fn get_node<'a>(index: &'a NodeIndex, id: &Ts) -> Option<&'a CrdtNode> {
    index.get(&TsKey::from(*id))
}

/// Convert a JSON CRDT node to its schema representation.
///
/// The returned `Box<dyn NodeBuilder>` captures the structural shape and
/// leaf values of the node tree.  It can be applied to a fresh document to
/// reproduce that structure.
///
/// Mirrors `toSchema` in `toSchema.ts`.
pub fn to_schema(node: &CrdtNode, index: &NodeIndex) -> Box<dyn NodeBuilder> {
    match node {
        CrdtNode::Con(n) => {
            let raw = match &n.val {
                ConValue::Val(pv) => pv.clone(),
                ConValue::Ref(_) => json_joy_json_pack::PackValue::Null,
            };
            Box::new(ConSchema { raw })
        }
        CrdtNode::Val(n) => {
            let inner_node = get_node(index, &n.val);
            let inner_schema: Box<dyn NodeBuilder> = match inner_node {
                Some(child) => to_schema(child, index),
                None => Box::new(ConSchema {
                    raw: json_joy_json_pack::PackValue::Null,
                }),
            };
            Box::new(ValSchema {
                value: inner_schema,
            })
        }
        CrdtNode::Str(n) => Box::new(StrSchema { raw: n.view_str() }),
        CrdtNode::Bin(n) => Box::new(BinSchema { raw: n.view() }),
        CrdtNode::Obj(n) => {
            let mut entries: Vec<(String, Box<dyn NodeBuilder>)> = Vec::new();
            let mut sorted_keys: Vec<&String> = n.keys.keys().collect();
            sorted_keys.sort();
            for key in &sorted_keys {
                let id = n.keys[key.as_str()];
                let child_schema = match get_node(index, &id) {
                    Some(child) => to_schema(child, index),
                    None => Box::new(ConSchema {
                        raw: json_joy_json_pack::PackValue::Null,
                    }),
                };
                entries.push(((*key).clone(), child_schema));
            }
            Box::new(ObjSchema { entries })
        }
        CrdtNode::Vec(n) => {
            let len = n.elements.len();
            let mut slots: Vec<Option<Box<dyn NodeBuilder>>> = Vec::with_capacity(len);
            for opt_id in &n.elements {
                let schema = match opt_id {
                    Some(id) => match get_node(index, id) {
                        Some(child) => Some(to_schema(child, index)),
                        None => None,
                    },
                    None => None,
                };
                slots.push(schema);
            }
            Box::new(VecSchema { value: slots })
        }
        CrdtNode::Arr(n) => {
            let mut items: Vec<Box<dyn NodeBuilder>> = Vec::new();
            for chunk in n.rga.iter_live() {
                if let Some(ids) = &chunk.data {
                    for id in ids {
                        let child_schema = match get_node(index, id) {
                            Some(child) => to_schema(child, index),
                            None => Box::new(ConSchema {
                                raw: json_joy_json_pack::PackValue::Null,
                            }),
                        };
                        items.push(child_schema);
                    }
                }
            }
            Box::new(ArrSchema { items })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
