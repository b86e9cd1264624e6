//! Multi-value register extension (`mval`).
//!
//! Mirrors `packages/json-joy/src/json-crdt-extensions/mval/`.

use serde_json::Value;
use json_joy_json_pack::PackValue;

use crate::json_crdt::constants::ORIGIN;
use crate::json_crdt::model::Model;
use crate::json_crdt::nodes::{CrdtNode, IndexExt, TsKey};
use crate::json_crdt_patch::clock::Ts;
use crate::json_crdt_patch::operations::{ConValue, Op};

// ── MvalNode ──────────────────────────────────────────────────────────────

/// A multi-value register backed by an [`ArrNode`].
#[derive(Debug, Clone, Copy)]
pub struct MvalNode {
    pub arr_id: Ts,
}

impl MvalNode {
    pub fn new(arr_id: Ts) -> Self {
        Self { arr_id }
    }

    /// Return all live values as a `Vec<Value>`.
    pub fn view(&self, model: &Model) -> Vec<Value> {
        let Some(CrdtNode::Arr(arr)) = model.index.get(&TsKey::from(self.arr_id)) else {
            return Vec::new();
        };
        let data_ids: Vec<Ts> = arr
            .rga
            .iter_live()
            .filter_map(|chunk| chunk.data.as_ref())
            .flat_map(|ids| ids.iter().copied())
            .collect();

        data_ids
            .into_iter()
            .filter_map(|id| model.index.get(&TsKey::from(id)))
            .map(|node| node.view(&model.index))
            .collect()
    }

    /// Replace the current value with `value`.
    pub fn set(&self, model: &mut Model, value: Value) {
        let (size, spans) = {
            let Some(CrdtNode::Arr(arr)) = model.index.get(&TsKey::from(self.arr_id)) else {
                return;
            };
            let size = arr.size();
            let spans = if size > 0 { arr.find_interval(0, size) } else { Vec::new() };
            (size, spans)
        };

        if size > 0 {
            let del_id = model.next_ts();
            model.apply_operation(&Op::Del {
                id:   del_id,
                obj:  self.arr_id,
                what: spans,
            });
        }

        let con_id = model.next_ts();
        model.apply_operation(&Op::NewCon {
            id:  con_id,
            val: ConValue::Val(PackValue::from(value)),
        });

        let ins_id = model.next_ts();
        model.apply_operation(&Op::InsArr {
            id:    ins_id,
            obj:   self.arr_id,
            after: ORIGIN,
            data:  vec![con_id],
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
