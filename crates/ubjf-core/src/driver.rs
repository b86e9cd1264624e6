//! The parse driver (§4.H): the public entry point, `read_next`.

use crate::consumer::Consumer;
use crate::context::Context;
use crate::dispatch;
use crate::error::ParseError;
use crate::source::ByteSource;

/// How a parse configured with this mode handles a high-precision number
/// (`H` token) it encounters (§6 "Configuration").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighPMode {
    /// Fail the parse with [`ParseError::HighPrecision`].
    Throw,
    /// Read the length, discard that many bytes, emit no value event.
    Skip,
    /// Decode as a string, emit tagged [`crate::Value::HighPrecision`].
    AsString,
}

impl Default for HighPMode {
    fn default() -> Self {
        HighPMode::Throw
    }
}

/// Decodes exactly one top-level node from `source`, recursively, emitting
/// events to `consumer` in wire order.
///
/// Returns the node count alongside the result rather than through an
/// out-parameter — it is populated whether or not the parse succeeded, so a
/// caller always learns how many complete nodes preceded a failure.
///
/// On success, `source` is left positioned immediately after the decoded
/// node, so repeated calls against the same source stream a sequence of
/// concatenated top-level values.
pub fn read_next<S: ByteSource, C: Consumer>(
    source: &mut S,
    consumer: &mut C,
    highp_mode: HighPMode,
) -> (Result<(), ParseError<S::Error, C::Error>>, usize) {
    let mut ctx = Context::new(source, consumer, highp_mode);
    let result = dispatch::parse_node(&mut ctx);
    let nodes = ctx.node_count();
    (result, nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;
    use crate::value::{ContainerKind, Value};
    use crate::TypeTag;
    use std::fmt;

    #[derive(Debug, PartialEq)]
    enum Event {
        Value(Value),
        Begin(ContainerKind, Option<usize>, Option<TypeTag>),
        End,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct AbortError(u8);
    impl fmt::Display for AbortError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "consumer aborted with code {}", self.0)
        }
    }
    impl std::error::Error for AbortError {}

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        abort_on_nth_value: Option<usize>,
        seen_values: usize,
    }

    impl Consumer for Recorder {
        type Error = AbortError;

        fn on_value(&mut self, value: Value) -> Result<(), Self::Error> {
            self.seen_values += 1;
            if self.abort_on_nth_value == Some(self.seen_values) {
                return Err(AbortError(42));
            }
            self.events.push(Event::Value(value));
            Ok(())
        }

        fn on_container_begin(
            &mut self,
            kind: ContainerKind,
            length: Option<usize>,
            element_type: Option<TypeTag>,
        ) -> Result<(), Self::Error> {
            self.events.push(Event::Begin(kind, length, element_type));
            Ok(())
        }

        fn on_container_end(&mut self) -> Result<(), Self::Error> {
            self.events.push(Event::End);
            Ok(())
        }
    }

    #[test]
    fn s1_null() {
        let data = [0x5A];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(result.is_ok());
        assert_eq!(nodes, 1);
        assert_eq!(consumer.events, vec![Event::Value(Value::Null)]);
    }

    #[test]
    fn s2_int32_42() {
        let data = [0x6C, 0x00, 0x00, 0x00, 0x2A];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(result.is_ok());
        assert_eq!(nodes, 1);
        assert_eq!(consumer.events, vec![Event::Value(Value::Int32(42))]);
    }

    #[test]
    fn s3_string_hi() {
        let data = [0x53, 0x69, 0x02, b'h', b'i'];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(result.is_ok());
        assert_eq!(nodes, 1);
        assert_eq!(
            consumer.events,
            vec![Event::Value(Value::String("hi".to_string()))]
        );
    }

    #[test]
    fn s4_unbounded_array() {
        let data = [0x5B, 0x69, 0x01, 0x69, 0x02, 0x69, 0x03, 0x5D];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(result.is_ok());
        assert_eq!(nodes, 4);
        assert_eq!(
            consumer.events,
            vec![
                Event::Begin(ContainerKind::Array, None, None),
                Event::Value(Value::Int8(1)),
                Event::Value(Value::Int8(2)),
                Event::Value(Value::Int8(3)),
                Event::End,
            ]
        );
    }

    #[test]
    fn s5_strongly_typed_int8_array() {
        let data = [0x5B, 0x24, 0x69, 0x23, 0x69, 0x03, 0x0A, 0x14, 0x1E];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(result.is_ok());
        assert_eq!(nodes, 4);
        assert_eq!(
            consumer.events,
            vec![
                Event::Begin(ContainerKind::Array, Some(3), Some(TypeTag::Int8)),
                Event::Value(Value::Int8(10)),
                Event::Value(Value::Int8(20)),
                Event::Value(Value::Int8(30)),
                Event::End,
            ]
        );
    }

    #[test]
    fn s6_object_with_one_entry() {
        let data = [0x7B, 0x69, 0x01, b'a', 0x69, 0x01, 0x7D];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(result.is_ok());
        assert_eq!(nodes, 3); // begin + key + value (the container itself plus its two scalar children)
        assert_eq!(
            consumer.events,
            vec![
                Event::Begin(ContainerKind::Object, None, None),
                Event::Value(Value::String("a".to_string())),
                Event::Value(Value::Int8(1)),
                Event::End,
            ]
        );
    }

    #[test]
    fn s7_highp_skip_advances_past_payload() {
        let data = [0x48, 0x69, 0x03, b'1', b'.', b'5'];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Skip);
        assert!(result.is_ok());
        assert_eq!(nodes, 1);
        assert!(consumer.events.is_empty());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn s7_highp_as_string() {
        let data = [0x48, 0x69, 0x03, b'1', b'.', b'5'];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, _) = read_next(&mut source, &mut consumer, HighPMode::AsString);
        assert!(result.is_ok());
        assert_eq!(
            consumer.events,
            vec![Event::Value(Value::HighPrecision("1.5".to_string()))]
        );
    }

    #[test]
    fn s7_highp_throw() {
        let data = [0x48, 0x69, 0x03, b'1', b'.', b'5'];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, _) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(matches!(result, Err(ParseError::HighPrecision)));
    }

    #[test]
    fn s8_consumer_abort_on_second_element() {
        let data = [0x5B, 0x69, 0x01, 0x69, 0x02, 0x69, 0x03, 0x5D];
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder {
            abort_on_nth_value: Some(2),
            ..Recorder::default()
        };
        let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(matches!(result, Err(ParseError::Consumer(AbortError(42)))));
        assert_eq!(nodes, 2);
        assert_eq!(
            consumer.events,
            vec![
                Event::Begin(ContainerKind::Array, None, None),
                Event::Value(Value::Int8(1)),
            ]
        );
    }

    #[test]
    fn truncated_stream_is_eof_not_a_panic() {
        let data = [0x6C, 0x00, 0x00]; // int32 tag with only 2 of 4 payload bytes
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        let (result, _) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(matches!(result, Err(ParseError::Eof)));
    }

    #[test]
    fn concatenated_values_stream_one_node_per_call() {
        let data = [0x5A, 0x5A, 0x5A]; // three NULLs back to back
        let mut source = SliceSource::new(&data);
        let mut consumer = Recorder::default();
        for _ in 0..3 {
            let (result, nodes) = read_next(&mut source, &mut consumer, HighPMode::Throw);
            assert!(result.is_ok());
            assert_eq!(nodes, 1);
        }
        assert_eq!(source.remaining(), 0);
        let (result, _) = read_next(&mut source, &mut consumer, HighPMode::Throw);
        assert!(matches!(result, Err(ParseError::Eof)));
    }
}
