//! Mirrors upstream `avl/index.ts`.

pub use super::types::{AvlNode, AvlNodeLike};
pub use super::util::{assert_avl_tree, insert, insert_left, insert_right, print, remove};
