//! The container parser (§4.F): arrays and objects, their preface
//! (`$type`/`#length`), and the two body regimes (sized, unbounded).

use crate::consumer::Consumer;
use crate::context::{Context, Res};
use crate::dispatch;
use crate::error::ParseError;
use crate::source::ByteSource;
use crate::token::{container_kind_of, dispatch_token, Dispatched, Token};
use crate::value::{ContainerKind, Value};

const CONTAINER_TYPE_BYTE: u8 = b'$';
const CONTAINER_LENGTH_BYTE: u8 = b'#';
const OBJECT_END_BYTE: u8 = b'}';

pub(crate) fn parse<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
    kind: ContainerKind,
) -> Res<(), S, C> {
    let (length, element) = parse_preface(ctx)?;
    let element_type = element.map(Dispatched::tag);

    ctx.begin_container(kind, length, element_type)?;
    match length {
        Some(n) => parse_sized_body(ctx, kind, n, element)?,
        None => parse_unbounded_body(ctx, kind)?,
    }
    ctx.end_container()
}

/// Reads `$type`/`#length`, enforcing that `$` is always followed by `#`
/// (the "fallthrough" the source expresses with an unbroken `switch`).
/// Returns `(None, None)` when neither is present — the container is
/// unbounded and weakly typed.
fn parse_preface<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
) -> Res<(Option<usize>, Option<Dispatched>), S, C> {
    let mut element = None;
    let mut had_type_marker = false;

    if ctx.peek_byte()? == Some(CONTAINER_TYPE_BYTE) {
        ctx.read_byte()?;
        let token = ctx.read_token()?;
        element = Some(
            dispatch_token(token).ok_or(ParseError::BadData("invalid element type in preface"))?,
        );
        had_type_marker = true;
    }

    if had_type_marker {
        if ctx.peek_byte()? != Some(CONTAINER_LENGTH_BYTE) {
            return Err(ParseError::BadData(
                "container type marker must be followed by a length",
            ));
        }
    } else if ctx.peek_byte()? != Some(CONTAINER_LENGTH_BYTE) {
        return Ok((None, None));
    }

    ctx.read_byte()?; // consume '#'
    let length = ctx.read_length()? as usize;
    Ok((Some(length), element))
}

fn parse_sized_body<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
    kind: ContainerKind,
    length: usize,
    element: Option<Dispatched>,
) -> Res<(), S, C> {
    for _ in 0..length {
        if kind == ContainerKind::Object {
            let key = ctx.read_string()?;
            ctx.emit_value(Value::String(key))?;
        }
        parse_element(ctx, element)?;
    }
    Ok(())
}

fn parse_unbounded_body<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
    kind: ContainerKind,
) -> Res<(), S, C> {
    match kind {
        ContainerKind::Array => loop {
            let token = ctx.read_token()?;
            if token == Token::ArrayEnd {
                break;
            }
            dispatch::parse_dispatched(ctx, token)?;
        },
        ContainerKind::Object => loop {
            match ctx.peek_byte()? {
                Some(OBJECT_END_BYTE) => {
                    ctx.read_byte()?;
                    break;
                }
                Some(_) => {
                    let key = ctx.read_string()?;
                    ctx.emit_value(Value::String(key))?;
                    dispatch::parse_node(ctx)?;
                }
                None => return Err(ParseError::Eof),
            }
        },
    }
    Ok(())
}

/// Decodes one element under a container's preface rule: a strongly-typed
/// element carries no tag byte on the wire (`element` is fixed by the
/// preface and reused for every iteration — this is how a strongly-typed
/// `bool` array reads zero bytes per element, the tag having already fixed
/// the value); a weakly-typed element reads and dispatches its own tag.
fn parse_element<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
    element: Option<Dispatched>,
) -> Res<(), S, C> {
    match element {
        Some(Dispatched::Scalar(kind)) => crate::scalar::parse_scalar(ctx, kind),
        Some(Dispatched::Container(tag)) => parse(ctx, container_kind_of(tag)),
        None => dispatch::parse_node(ctx),
    }
}
