//! The byte-source adapter (§4.B): the abstract input every parse reads
//! through, plus the one in-memory reference implementation this crate
//! ships. Concrete backends for files or sockets are an external
//! collaborator's job — `SliceSource` exists only so this crate's own tests
//! (and any caller already holding a full buffer) have something to decode
//! against.

use ubjf_buffers::{BufferError, Reader};

/// A `read`/`bump` failure: either the source ran out of bytes — always
/// `Eof`, a structural signal the parser maps to [`crate::ParseError::Eof`]
/// without inspecting `E` — or some other backend failure, threaded through
/// as [`crate::ParseError::Source`]. Keeping the two apart here, at the
/// trait boundary, is what lets the parser honor §4.B ("on failure it
/// signals EOF") without having to guess whether a given backend's error
/// type encodes exhaustion or something else.
#[derive(Debug)]
pub enum SourceError<E> {
    /// The source had fewer bytes than `read` or `bump` needed.
    Eof,
    /// Some other backend failure (a disk error, a broken pipe, ...).
    Other(E),
}

/// Three primitive operations a byte source must support. `read`/`bump`
/// report exhaustion structurally via [`SourceError::Eof`]; `peek` reports
/// it via `Ok(None)` instead, since end-of-stream is itself a valid "no
/// more tokens" answer there, not a failure the caller need unwrap.
pub trait ByteSource {
    /// The backend's own error type (e.g. an I/O error for a file source).
    type Error: std::error::Error + 'static;

    /// Fills `dest` with exactly `dest.len()` bytes. A short read is
    /// `Err(SourceError::Eof)`, not a partial fill.
    fn read(&mut self, dest: &mut [u8]) -> Result<(), SourceError<Self::Error>>;

    /// Returns the next byte without consuming it, or `Ok(None)` at
    /// end-of-stream.
    fn peek(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Advances the cursor by exactly `n` bytes without reading them.
    /// Running past the end is `Err(SourceError::Eof)`.
    fn bump(&mut self, n: usize) -> Result<(), SourceError<Self::Error>>;
}

/// The reference byte source: an in-memory byte slice.
pub struct SliceSource<'a> {
    reader: Reader<'a>,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(data),
        }
    }

    /// Bytes remaining before the end of the slice — useful for asserting
    /// that `read_next` left the cursor exactly after one value (§4.H
    /// idempotence).
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    type Error = BufferError;

    fn read(&mut self, dest: &mut [u8]) -> Result<(), SourceError<Self::Error>> {
        match self.reader.try_buf(dest.len()) {
            Ok(bytes) => {
                dest.copy_from_slice(bytes);
                Ok(())
            }
            Err(BufferError::EndOfBuffer) => Err(SourceError::Eof),
            Err(other) => Err(SourceError::Other(other)),
        }
    }

    fn peek(&mut self) -> Result<Option<u8>, Self::Error> {
        match self.reader.try_peek() {
            Ok(b) => Ok(Some(b)),
            Err(BufferError::EndOfBuffer) => Ok(None),
            Err(other) => Err(other),
        }
    }

    fn bump(&mut self, n: usize) -> Result<(), SourceError<Self::Error>> {
        match self.reader.try_skip(n) {
            Ok(()) => Ok(()),
            Err(BufferError::EndOfBuffer) => Err(SourceError::Eof),
            Err(other) => Err(SourceError::Other(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_fills_exact_length() {
        let data = [1u8, 2, 3, 4];
        let mut src = SliceSource::new(&data);
        let mut buf = [0u8; 2];
        src.read(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.remaining(), 2);
    }

    #[test]
    fn peek_reports_end_of_stream_as_none() {
        let data: [u8; 0] = [];
        let mut src = SliceSource::new(&data);
        assert_eq!(src.peek(), Ok(None));
    }

    #[test]
    fn short_read_is_eof_not_a_generic_backend_error() {
        let data = [1u8];
        let mut src = SliceSource::new(&data);
        let mut buf = [0u8; 4];
        assert!(matches!(src.read(&mut buf), Err(SourceError::Eof)));
    }

    #[test]
    fn bump_past_end_is_eof_not_a_generic_backend_error() {
        let data = [1u8, 2];
        let mut src = SliceSource::new(&data);
        assert!(matches!(src.bump(5), Err(SourceError::Eof)));
    }
}
