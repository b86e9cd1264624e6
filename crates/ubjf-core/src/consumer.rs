//! The consumer adapter (§4.C): the sink a parse delivers decoded values and
//! container boundaries to. Every callback has a no-op default, the direct
//! translation of "if not provided, events are silently dropped" from the
//! optional C function-pointer fields this crate's `Consumer` replaces —
//! this is what lets a consumer implement only `on_value` to get a
//! validate-only or count-only parse for free.

use crate::value::{ContainerKind, Value};
use crate::TypeTag;

/// What a consumer's [`Consumer::on_string_alloc`] hook decided, distinct
/// from "hook not configured" — the split `Alloc` needs to ever surface.
#[derive(Debug, Default)]
pub enum StringAlloc {
    /// No hook configured, or the consumer chose not to supply a buffer:
    /// fall back to a plain `Vec<u8>`.
    #[default]
    Default,
    /// The consumer's own buffer, at least `size` bytes, to decode into.
    Owned(Vec<u8>),
    /// The consumer's allocator was invoked and failed. Aborts the parse
    /// with [`crate::ParseError::Alloc`].
    Failed,
}

/// Receives the events one `read_next` call emits, in wire order.
pub trait Consumer {
    /// The error a callback can abort the parse with. Propagated verbatim
    /// through [`crate::ParseError::Consumer`].
    type Error: std::error::Error + 'static;

    /// Delivers one decoded scalar. Returning `Err` aborts the parse.
    fn on_value(&mut self, _value: Value) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Delivers a container's opening. `length` is `None` for an unbounded
    /// container; `element_type` is `None` for a weakly-typed one.
    /// Returning `Err` aborts the parse — no matching `on_container_end`
    /// will follow.
    fn on_container_begin(
        &mut self,
        _kind: ContainerKind,
        _length: Option<usize>,
        _element_type: Option<TypeTag>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Delivers a container's close. Called exactly once per successful
    /// `on_container_begin`, including for unbounded containers once their
    /// terminator is seen.
    fn on_container_end(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Requests a writable buffer of at least `size` bytes to decode a
    /// string or high-precision number into. `StringAlloc::Default` falls
    /// back to the default allocator (a plain `Vec<u8>`) — the Rust
    /// equivalent of the C source's "consumer's allocator, or the default"
    /// rule, minus the manual free path Rust's ownership already handles.
    /// `StringAlloc::Failed` aborts the parse with `ParseError::Alloc`,
    /// the case a bare `Option` can't distinguish from "not configured".
    fn on_string_alloc(&mut self, _size: usize) -> StringAlloc {
        StringAlloc::Default
    }
}

/// A [`Consumer`] that drops every event — useful for a validate-only or
/// count-only parse, and as the building block most tests start from.
#[derive(Default)]
pub struct NullConsumer;

impl Consumer for NullConsumer {
    type Error = std::convert::Infallible;
}
