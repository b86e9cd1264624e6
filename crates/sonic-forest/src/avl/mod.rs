//! Mirrors upstream `avl/*` family.

#[path = "AvlBstNumNumMap.rs"]
pub mod avl_bst_num_num_map;
#[path = "AvlMap.rs"]
pub mod avl_map;
#[path = "AvlMapOld.rs"]
pub mod avl_map_old;
#[path = "AvlSet.rs"]
pub mod avl_set;
pub mod index;
pub mod types;
pub mod util;

pub use avl_bst_num_num_map::AvlBstNumNumMap;
pub use avl_map::AvlMap;
pub use avl_map_old::AvlMapOld;
pub use avl_set::AvlSet;
pub use index::*;
