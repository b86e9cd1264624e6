//! Property-based tests for the two universal properties `spec.md` §8
//! singles out as worth generalizing beyond their fixed scenarios:
//! concatenated streams decode one node per call, and truncation never
//! panics or spuriously succeeds.
//!
//! There is no encoder in this crate (out of scope, §1) so these tests
//! build just enough of one, locally, to generate valid documents to
//! decode against — the same approach the `facet-html-diff` roundtrip
//! suite this crate borrows the pattern from takes for its own diff/apply
//! invariant.

use proptest::prelude::*;
use ubjf_core::{read_next, Consumer, HighPMode, ParseError, SliceSource, Value};

#[derive(Debug, Clone)]
enum Doc {
    Null,
    Bool(bool),
    Int8(i8),
    Str(String),
    Array(Vec<Doc>),
}

fn arb_doc() -> impl Strategy<Value = Doc> {
    let leaf = prop_oneof![
        Just(Doc::Null),
        any::<bool>().prop_map(Doc::Bool),
        any::<i8>().prop_map(Doc::Int8),
        "[a-zA-Z0-9]{0,8}".prop_map(Doc::Str),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Doc::Array)
    })
}

fn encode(doc: &Doc, out: &mut Vec<u8>) {
    match doc {
        Doc::Null => out.push(b'Z'),
        Doc::Bool(true) => out.push(b'T'),
        Doc::Bool(false) => out.push(b'F'),
        Doc::Int8(v) => {
            out.push(b'i');
            out.push(*v as u8);
        }
        Doc::Str(s) => {
            out.push(b'S');
            encode_length(s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
        Doc::Array(items) => {
            out.push(b'[');
            for item in items {
                encode(item, out);
            }
            out.push(b']');
        }
    }
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    out.push(b'i');
    out.push(len as u8);
}

#[derive(Default)]
struct Counter(usize);

impl Consumer for Counter {
    type Error = std::convert::Infallible;

    fn on_value(&mut self, _value: Value) -> Result<(), Self::Error> {
        self.0 += 1;
        Ok(())
    }
}

proptest! {
    /// §8 property 2: concatenating N encoded values yields a stream over
    /// which N successive `read_next` calls each succeed; the (N+1)-th
    /// returns `Eof`.
    #[test]
    fn concatenated_docs_decode_one_per_call(docs in prop::collection::vec(arb_doc(), 0..6)) {
        let mut bytes = Vec::new();
        for doc in &docs {
            encode(doc, &mut bytes);
        }
        let mut source = SliceSource::new(&bytes);
        let mut consumer = Counter::default();
        for _ in 0..docs.len() {
            let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
            prop_assert!(result.is_ok());
            prop_assert!(nodes >= 1);
        }
        prop_assert_eq!(source.remaining(), 0);
        let (result, _) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        prop_assert!(matches!(result, Err(ParseError::Eof)));
    }

    /// §8 property 5: truncating a valid stream at any byte offset yields
    /// `Eof`/`Source`/`BadData`, never a silent success or an out-of-bounds
    /// read (which would show up here as a panic, since `SliceSource` is a
    /// plain bounds-checked slice cursor).
    #[test]
    fn truncated_stream_never_panics_or_succeeds_past_its_bytes(
        doc in arb_doc(),
        cut_fraction in 0u32..100,
    ) {
        let mut bytes = Vec::new();
        encode(&doc, &mut bytes);
        if bytes.len() < 2 {
            return Ok(());
        }
        let cut = ((bytes.len() - 1) * cut_fraction as usize) / 100;
        let truncated = &bytes[..cut];
        let mut source = SliceSource::new(truncated);
        let mut consumer = Counter::default();
        let (result, _nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        prop_assert!(result.is_err());
    }
}
