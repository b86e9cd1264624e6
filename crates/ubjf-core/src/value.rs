//! The decoded scalar payload handed to [`crate::Consumer::on_value`].

/// A decoded UBJSON scalar.
///
/// `Null`/`Noop` carry no payload; strings and high-precision numbers own
/// their bytes (already validated UTF-8, already the allocation handed to
/// the consumer — Rust's `String` makes the C source's manual
/// alloc/NUL-terminate/hand-off dance unnecessary).
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    Null,
    Noop,
    Bool(bool),
    Char(u8),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// An arbitrary-precision decimal, decoded under `HighPMode::AsString`.
    HighPrecision(String),
    String(String),
}

/// Which container kind a `begin`/`end` pair describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Object,
}
