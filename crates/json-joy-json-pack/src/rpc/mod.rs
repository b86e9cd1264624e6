//! ONC RPC protocol message encoder/decoder.
//!
//! Upstream reference: `json-pack/src/rpc/`
//! References: RFC 1057, RFC 1831, RFC 5531

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod messages;

pub use constants::{
    RpcAcceptStat, RpcAuthFlavor, RpcAuthStat, RpcMsgType, RpcRejectStat, RpcReplyStat, RPC_VERSION,
};
pub use decoder::{RpcDecodeError, RpcMessageDecoder};
pub use encoder::{RpcEncodeError, RpcMessageEncoder};
pub use messages::{
    RpcAcceptedReplyMessage, RpcCallMessage, RpcMessage, RpcMismatchInfo, RpcOpaqueAuth,
    RpcRejectedReplyMessage,
};
