//! Peritext rich-text extension.
//!
//! Mirrors `packages/json-joy/src/json-crdt-extensions/peritext/`.
//!
//! Peritext is a CRDT-native approach to rich text that separates the RGA
//! character sequence (a [`StrNode`]) from the annotations covering it
//! (slices stored in an [`ArrNode`]).  Characters are referenced by their
//! stable timestamp IDs, so annotations survive concurrent edits without
//! drifting.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use json_joy::json_crdt::model::Model;
//! use json_joy::json_crdt_extensions::peritext::{Peritext, rga::Anchor, slice::SliceStacking};
//!
//! let mut model = Model::new(1);
//! // ... set up StrNode (str_id) and ArrNode (arr_id) in the model ...
//! let peritext = Peritext::new(str_id, arr_id);
//!
//! peritext.ins_at(&mut model, 0, "hello world");
//! let range = peritext.range_at(&model, 6, 5).unwrap(); // "world"
//! peritext.saved_slices.ins_stack(&mut model, &range, "bold", None);
//! assert_eq!(peritext.text(&model), "hello world");
//! ```

pub mod rga;
pub mod slice;

pub use rga::{Anchor, Point, Range};
pub use slice::{Slice, SliceStacking, SliceType, Slices};

use serde_json::Value;

use crate::json_crdt::constants::ORIGIN;
use crate::json_crdt::model::Model;
use crate::json_crdt::nodes::{CrdtNode, IndexExt, TsKey};
use crate::json_crdt_patch::clock::Ts;
use crate::json_crdt_patch::operations::Op;

// ── Peritext ──────────────────────────────────────────────────────────────

/// Main Peritext context — ties a [`StrNode`] (text) to a [`Slices`]
/// collection (annotations).
///
/// Construct with the IDs of an existing `StrNode` and `ArrNode` in a
/// [`Model`].  All mutation methods apply operations to the model via
/// [`Model::apply_operation`].
#[derive(Debug, Clone, Copy)]
pub struct Peritext {
    /// ID of the `StrNode` holding the text content.
    pub str_id: Ts,

    /// The persisted annotation set (synced to all peers).
    pub saved_slices: Slices,
}

impl Peritext {
    /// Create a Peritext view over an existing StrNode + ArrNode.
    pub fn new(str_id: Ts, arr_id: Ts) -> Self {
        Self {
            str_id,
            saved_slices: Slices::new(arr_id),
        }
    }

    // ── Text queries ──────────────────────────────────────────────────────

    /// Return the current text content as a plain `String`.
    pub fn text(&self, model: &Model) -> String {
        match model.index.get(&TsKey::from(self.str_id)) {
            Some(CrdtNode::Str(s)) => s.view_str(),
            _ => String::new(),
        }
    }

    /// Number of visible characters.
    pub fn len(&self, model: &Model) -> usize {
        match model.index.get(&TsKey::from(self.str_id)) {
            Some(CrdtNode::Str(s)) => s.size(),
            _ => 0,
        }
    }

    // ── Text mutation ─────────────────────────────────────────────────────

    /// Insert `text` so that it starts at visible position `pos`.
    ///
    /// `pos = 0` prepends; `pos = len()` appends.
    pub fn ins_at(&self, model: &mut Model, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let after = {
            match model.index.get(&TsKey::from(self.str_id)) {
                Some(CrdtNode::Str(s)) => {
                    if pos == 0 {
                        ORIGIN
                    } else {
                        s.find(pos - 1).unwrap_or(ORIGIN)
                    }
                }
                _ => return,
            }
        };
        let id = model.next_ts();
        model.apply_operation(&Op::InsStr {
            id,
            obj: self.str_id,
            after,
            data: text.to_string(),
        });
    }

    /// Delete `len` visible characters starting at position `pos`.
    pub fn del_at(&self, model: &mut Model, pos: usize, len: usize) {
        if len == 0 {
            return;
        }
        let spans = {
            match model.index.get(&TsKey::from(self.str_id)) {
                Some(CrdtNode::Str(s)) => s.find_interval(pos, len),
                _ => return,
            }
        };
        if spans.is_empty() {
            return;
        }
        let id = model.next_ts();
        model.apply_operation(&Op::Del {
            id,
            obj: self.str_id,
            what: spans,
        });
    }

    // ── Position helpers ──────────────────────────────────────────────────

    /// Create a [`Point`] at visible position `pos` with the given anchor.
    ///
    /// Returns `None` when `pos` is out of range.
    pub fn point_at(&self, model: &Model, pos: usize, anchor: Anchor) -> Option<Point> {
        match model.index.get(&TsKey::from(self.str_id)) {
            Some(CrdtNode::Str(s)) => s.find(pos).map(|id| Point::new(id, anchor)),
            _ => None,
        }
    }

    /// Create a [`Range`] covering `len` characters starting at visible
    /// position `start`.
    ///
    /// The range uses `Anchor::Before` on the start character and
    /// `Anchor::After` on the last character, matching the upstream's
    /// inclusive-range semantics.
    ///
    /// Returns `None` when `start` or `start + len - 1` is out of range.
    pub fn range_at(&self, model: &Model, start: usize, len: usize) -> Option<Range> {
        if len == 0 {
            let start_point = self.point_at(model, start, Anchor::Before)?;
            return Some(Range::new(start_point, start_point));
        }
        match model.index.get(&TsKey::from(self.str_id)) {
            Some(CrdtNode::Str(s)) => {
                let start_id = s.find(start)?;
                let end_id   = s.find(start + len - 1)?;
                Some(Range::new(
                    Point::new(start_id, Anchor::Before),
                    Point::new(end_id,   Anchor::After),
                ))
            }
            _ => None,
        }
    }

    /// Convenience: insert a `Many`-stacking slice covering the given range.
    ///
    /// Returns the ID of the new slice's backing `VecNode`.
    pub fn ins_slice(
        &self,
        model: &mut Model,
        range: &Range,
        stacking: SliceStacking,
        slice_type: impl Into<SliceType>,
        data: Option<Value>,
    ) -> Ts {
        self.saved_slices.ins(model, range, stacking, slice_type, data)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
