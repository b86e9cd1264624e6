use thiserror::Error;

use crate::source::SourceError;

/// Everything that can end a parse, parameterized over both the byte
/// source's error type and the consumer's, so neither has to be boxed into
/// a trait object to surface its own failure.
///
/// §4.B of the format this crate ports says a byte-source failure — a
/// short read, a `bump` past the end, a `peek` at end-of-stream — always
/// "signals EOF"; `Eof` is that signal. A backend can still fail for a
/// reason that is not exhaustion (a disk error, a broken pipe); that comes
/// through as `Source` instead, distinguished at the `ByteSource` trait
/// boundary (see [`SourceError`]) rather than by inspecting the backend's
/// own error value — so `Eof` and `Source` stay mutually exclusive instead
/// of collapsing into whichever one the backend's error type happens to
/// look like.
///
/// `PARAM` from the format this crate ports (a null parse-state check) has
/// no variant here: `read_next` takes `&mut S`/`&mut C`, so there is no
/// null state the type system doesn't already rule out.
#[derive(Debug, Error)]
pub enum ParseError<RE, CE> {
    /// The byte source was exhausted: a short `read`, a `bump` past the
    /// end, or a `peek` that reported end-of-stream where a token was
    /// expected.
    #[error("unexpected end of input")]
    Eof,
    /// A structural grammar violation: an unrecognized tag where a type was
    /// expected, a non-integer or negative length, `$` without a following
    /// `#`, a missing container terminator, or an invalid element type in a
    /// strongly-typed container.
    #[error("malformed UBJSON data: {0}")]
    BadData(&'static str),
    /// A high-precision number was encountered while `HighPMode::Throw` is
    /// configured.
    #[error("high-precision number encountered while in throw mode")]
    HighPrecision,
    /// The consumer's string allocator hook ([`crate::Consumer::on_string_alloc`])
    /// was invoked and reported failure. Never raised when a consumer
    /// leaves the hook at its default (the fallback `Vec<u8>` allocator
    /// cannot fail this way).
    #[error("string buffer allocation failed")]
    Alloc,
    /// The byte source reported a failure that was not exhaustion (a
    /// `peek` backend error, or a `read`/`bump` that failed for a reason
    /// other than running out of bytes).
    #[error("byte source error: {0}")]
    Source(RE),
    /// A consumer callback returned an error, aborting the parse. Propagated
    /// verbatim, as the format this crate ports requires.
    #[error("consumer aborted the parse: {0}")]
    Consumer(CE),
}

/// Collapses a [`SourceError`] into the two `ParseError` variants it can
/// produce, so `?` does the mapping at every `ByteSource::read`/`bump`
/// call site instead of each one writing its own `match`.
impl<RE, CE> From<SourceError<RE>> for ParseError<RE, CE> {
    fn from(err: SourceError<RE>) -> Self {
        match err {
            SourceError::Eof => ParseError::Eof,
            SourceError::Other(inner) => ParseError::Source(inner),
        }
    }
}
