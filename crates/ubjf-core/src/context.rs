//! The per-call parse context (§3 "Parse context"): owns the running node
//! count and funnels every byte-source read and consumer callback through
//! one place so error mapping and node-count bookkeeping live in exactly
//! one spot.

use crate::consumer::{Consumer, StringAlloc};
use crate::error::ParseError;
use crate::numeric;
use crate::source::ByteSource;
use crate::token::Token;
use crate::value::{ContainerKind, Value};
use crate::{HighPMode, TypeTag};

pub(crate) type Res<T, S, C> =
    Result<T, ParseError<<S as ByteSource>::Error, <C as Consumer>::Error>>;

/// Stack-local: constructed once per [`crate::read_next`] call, borrows its
/// source and consumer for that call's lifetime only, and is dropped at
/// return — nothing here survives across parses.
pub(crate) struct Context<'a, S: ByteSource, C: Consumer> {
    source: &'a mut S,
    consumer: &'a mut C,
    pub(crate) highp_mode: HighPMode,
    nodes: usize,
}

impl<'a, S: ByteSource, C: Consumer> Context<'a, S, C> {
    pub(crate) fn new(source: &'a mut S, consumer: &'a mut C, highp_mode: HighPMode) -> Self {
        Self {
            source,
            consumer,
            highp_mode,
            nodes: 0,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes
    }

    // ---- byte source -----------------------------------------------------

    pub(crate) fn read_byte(&mut self) -> Res<u8, S, C> {
        let mut buf = [0u8; 1];
        self.source.read(&mut buf)?;
        Ok(buf[0])
    }

    /// Returns the next byte without consuming it. `Ok(None)` means
    /// end-of-stream; callers that need a byte to proceed turn that into
    /// `Eof` themselves (body-loop termination checks treat it as "no more
    /// input", which is itself malformed for an unterminated container).
    pub(crate) fn peek_byte(&mut self) -> Res<Option<u8>, S, C> {
        self.source.peek().map_err(ParseError::Source)
    }

    pub(crate) fn bump(&mut self, n: usize) -> Res<(), S, C> {
        self.source.bump(n).map_err(ParseError::from)
    }

    pub(crate) fn read_token(&mut self) -> Res<Token, S, C> {
        let byte = self.read_byte()?;
        Token::from_byte(byte).ok_or(ParseError::BadData("unrecognized type tag"))
    }

    // ---- numeric decoder (§4.D) -------------------------------------------

    pub(crate) fn read_u8(&mut self) -> Res<u8, S, C> {
        numeric::read_u8(self.source).map_err(ParseError::from)
    }
    pub(crate) fn read_i8(&mut self) -> Res<i8, S, C> {
        numeric::read_i8(self.source).map_err(ParseError::from)
    }
    pub(crate) fn read_i16(&mut self) -> Res<i16, S, C> {
        numeric::read_i16(self.source).map_err(ParseError::from)
    }
    pub(crate) fn read_i32(&mut self) -> Res<i32, S, C> {
        numeric::read_i32(self.source).map_err(ParseError::from)
    }
    pub(crate) fn read_i64(&mut self) -> Res<i64, S, C> {
        numeric::read_i64(self.source).map_err(ParseError::from)
    }
    pub(crate) fn read_f32(&mut self) -> Res<f32, S, C> {
        numeric::read_f32(self.source).map_err(ParseError::from)
    }
    pub(crate) fn read_f64(&mut self) -> Res<f64, S, C> {
        numeric::read_f64(self.source).map_err(ParseError::from)
    }

    /// Reads a length: a nested integer scalar (§4.E step 1) that is never
    /// itself emitted as a value or counted as a node — it is pure
    /// bookkeeping the wire format happens to express the same way it
    /// expresses any other integer.
    pub(crate) fn read_length(&mut self) -> Res<i64, S, C> {
        let token = self.read_token()?;
        let length = match crate::token::dispatch_token(token) {
            Some(crate::token::Dispatched::Scalar(kind)) => match kind {
                crate::token::ScalarKind::Uint8 => self.read_u8()? as i64,
                crate::token::ScalarKind::Int8 => self.read_i8()? as i64,
                crate::token::ScalarKind::Int16 => self.read_i16()? as i64,
                crate::token::ScalarKind::Int32 => self.read_i32()? as i64,
                crate::token::ScalarKind::Int64 => self.read_i64()?,
                _ => return Err(ParseError::BadData("length must be an integer type")),
            },
            _ => return Err(ParseError::BadData("length must be an integer type")),
        };
        if length < 0 {
            return Err(ParseError::BadData("length must not be negative"));
        }
        Ok(length)
    }

    /// Reads a length-prefixed byte string (§4.E steps 2-4) and validates
    /// it as UTF-8. Used for both `STRING` values and object/array keys
    /// (which carry no leading `S` tag).
    pub(crate) fn read_string(&mut self) -> Res<String, S, C> {
        let length = self.read_length()? as usize;
        let mut buf = match self.consumer.on_string_alloc(length) {
            StringAlloc::Default => Vec::with_capacity(length),
            StringAlloc::Owned(buf) => buf,
            StringAlloc::Failed => return Err(ParseError::Alloc),
        };
        buf.resize(length, 0);
        self.source.read(&mut buf)?;
        String::from_utf8(buf).map_err(|_| ParseError::BadData("string is not valid utf-8"))
    }

    // ---- consumer adapter (§4.C) + node counting (§3.[ADDED]) -------------

    /// Emits a scalar and counts it — a scalar's count only advances once
    /// the consumer has accepted it; see `SPEC_FULL.md` §3.[ADDED].
    pub(crate) fn emit_value(&mut self, value: Value) -> Res<(), S, C> {
        self.consumer
            .on_value(value)
            .map_err(ParseError::Consumer)?;
        self.nodes += 1;
        Ok(())
    }

    /// Emits a container's opening and counts the container itself — a
    /// container's count advances as soon as it starts, independent of
    /// whether its body later fails; see `SPEC_FULL.md` §3.[ADDED].
    pub(crate) fn begin_container(
        &mut self,
        kind: ContainerKind,
        length: Option<usize>,
        element_type: Option<TypeTag>,
    ) -> Res<(), S, C> {
        self.consumer
            .on_container_begin(kind, length, element_type)
            .map_err(ParseError::Consumer)?;
        self.nodes += 1;
        Ok(())
    }

    pub(crate) fn end_container(&mut self) -> Res<(), S, C> {
        self.consumer
            .on_container_end()
            .map_err(ParseError::Consumer)
    }

    /// Counts a node that has no consumer event to gate on (a skipped
    /// high-precision number under `HighPMode::Skip`): the skip itself is
    /// the atomic completion point.
    pub(crate) fn count_started(&mut self) {
        self.nodes += 1;
    }
}
