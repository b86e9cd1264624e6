//! Mirrors upstream `findByPointer/index.ts`.

pub use super::v1::find_by_pointer_v1;
pub use super::v2::find_by_pointer_v2;
pub use super::v3::find_by_pointer_v3;
pub use super::v4::find_by_pointer_v4;
pub use super::v5::find_by_pointer_v5;
pub use super::v6::find_by_pointer_v6;
