//! The scalar parser (§4.E): decodes one value given its already-classified
//! [`ScalarKind`] and emits it through the [`Context`]. Every arm here either
//! reads its wire payload through [`Context`]'s numeric/string helpers or, for
//! `Bool`, has no payload left to read at all — the token byte already was
//! the value.

use crate::consumer::Consumer;
use crate::context::{Context, Res};
use crate::source::ByteSource;
use crate::token::ScalarKind;
use crate::value::Value;
use crate::HighPMode;

pub(crate) fn parse_scalar<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
    kind: ScalarKind,
) -> Res<(), S, C> {
    match kind {
        ScalarKind::Null => ctx.emit_value(Value::Null),
        ScalarKind::Noop => ctx.emit_value(Value::Noop),
        // The token byte itself was `T` or `F` — nothing left to read.
        ScalarKind::Bool(b) => ctx.emit_value(Value::Bool(b)),
        ScalarKind::Char => {
            let b = ctx.read_byte()?;
            ctx.emit_value(Value::Char(b))
        }
        ScalarKind::Int8 => {
            let v = ctx.read_i8()?;
            ctx.emit_value(Value::Int8(v))
        }
        ScalarKind::Uint8 => {
            let v = ctx.read_u8()?;
            ctx.emit_value(Value::Uint8(v))
        }
        ScalarKind::Int16 => {
            let v = ctx.read_i16()?;
            ctx.emit_value(Value::Int16(v))
        }
        ScalarKind::Int32 => {
            let v = ctx.read_i32()?;
            ctx.emit_value(Value::Int32(v))
        }
        ScalarKind::Int64 => {
            let v = ctx.read_i64()?;
            ctx.emit_value(Value::Int64(v))
        }
        ScalarKind::Float32 => {
            let v = ctx.read_f32()?;
            ctx.emit_value(Value::Float32(v))
        }
        ScalarKind::Float64 => {
            let v = ctx.read_f64()?;
            ctx.emit_value(Value::Float64(v))
        }
        ScalarKind::String => {
            let s = ctx.read_string()?;
            ctx.emit_value(Value::String(s))
        }
        ScalarKind::HighP => parse_highp(ctx),
    }
}

fn parse_highp<S: ByteSource, C: Consumer>(ctx: &mut Context<S, C>) -> Res<(), S, C> {
    match ctx.highp_mode {
        HighPMode::Throw => Err(crate::error::ParseError::HighPrecision),
        HighPMode::Skip => {
            let length = ctx.read_length()? as usize;
            ctx.bump(length)?;
            // No `on_value` call to gate on — the skip itself is the node.
            ctx.count_started();
            Ok(())
        }
        HighPMode::AsString => {
            let s = ctx.read_string()?;
            ctx.emit_value(Value::HighPrecision(s))
        }
    }
}
