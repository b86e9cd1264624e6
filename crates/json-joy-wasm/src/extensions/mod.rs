pub mod prosemirror;
pub mod quill;
pub mod slate;

pub use prosemirror::from_prosemirror_to_view_range;
pub use quill::{diff_quill_attributes, remove_quill_erasures};
pub use slate::from_slate_to_view_range;
