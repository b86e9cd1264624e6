use thiserror::Error;

/// Failure modes of [`crate::Reader`].
///
/// Every variant corresponds to a bounds or encoding violation the cursor
/// itself can detect; the cursor never panics on malformed input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("end of buffer")]
    EndOfBuffer,
    #[error("invalid utf-8 in buffer")]
    InvalidUtf8,
}
