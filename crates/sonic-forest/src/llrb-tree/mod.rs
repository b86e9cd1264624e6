//! Mirrors upstream `llrb-tree/*` family.

pub mod index;
#[path = "LlrbTree.rs"]
#[allow(clippy::module_inception)]
pub mod llrb_tree;
pub mod util;

pub use index::*;
pub use llrb_tree::{LlrbNode, LlrbTree};
