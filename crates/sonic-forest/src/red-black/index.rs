//! Mirrors upstream `red-black/index.ts`.

pub use super::types::{RbNode, RbNodeLike};
pub use super::util::{assert_red_black_tree, insert, insert_left, insert_right, print, remove};
