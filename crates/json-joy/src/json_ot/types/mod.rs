//! OT type implementations.
//!
//! Mirrors `packages/json-joy/src/json-ot/types/`.

pub mod ot_string;
pub mod ot_string_irrev;
pub mod ot_binary_irrev;
pub mod ot_json;
