//! Redis RESP3 protocol encoding and decoding.
//!
//! Upstream reference: `json-pack/src/resp/`

pub mod constants;
pub mod decoder;
pub mod encoder;

pub use constants::{
    Resp, RESP_EXTENSION_ATTRIBUTES, RESP_EXTENSION_PUSH, RESP_EXTENSION_VERBATIM_STRING,
};
pub use decoder::{RespDecodeError, RespDecoder};
pub use encoder::RespEncoder;
