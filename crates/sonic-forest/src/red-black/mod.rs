//! Mirrors upstream `red-black/*` family.

pub mod index;
#[path = "RbMap.rs"]
pub mod rb_map;
pub mod types;
pub mod util;

pub use index::*;
pub use rb_map::RbMap;
