//! The node dispatcher (§4.G): reads one type-tag byte and routes it to the
//! scalar parser or the container parser. Node counting is not done here as
//! a separate step — it happens at the point each component actually
//! completes its unit of work (`Context::emit_value` for a scalar,
//! `Context::begin_container` for a container), which is what lets the two
//! count at different points without this module having to know which
//! rule applies; see `SPEC_FULL.md` §3.[ADDED] for why they differ.

use crate::consumer::Consumer;
use crate::container;
use crate::context::{Context, Res};
use crate::error::ParseError;
use crate::scalar;
use crate::source::ByteSource;
use crate::token::{container_kind_of, dispatch_token, Dispatched, Token};

/// Reads one tag byte and parses the node it introduces, recursively.
pub(crate) fn parse_node<S: ByteSource, C: Consumer>(ctx: &mut Context<S, C>) -> Res<(), S, C> {
    let token = ctx.read_token()?;
    parse_dispatched(ctx, token)
}

/// Parses the node a token (already read off the wire by the caller, e.g.
/// an unbounded array body checking for its terminator first) introduces.
pub(crate) fn parse_dispatched<S: ByteSource, C: Consumer>(
    ctx: &mut Context<S, C>,
    token: Token,
) -> Res<(), S, C> {
    match dispatch_token(token) {
        Some(Dispatched::Scalar(kind)) => scalar::parse_scalar(ctx, kind),
        Some(Dispatched::Container(tag)) => container::parse(ctx, container_kind_of(tag)),
        None => Err(ParseError::BadData("unexpected token in this position")),
    }
}
