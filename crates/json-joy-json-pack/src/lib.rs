//! Binary serialization formats for json-joy (CBOR, MessagePack, JSON, and more).
//!
//! Upstream reference:
//! - `/Users/nchapman/Code/json-joy/packages/json-pack/src/`

mod constants;
mod json_pack_extension;
mod json_pack_mpint;
mod json_pack_value;
mod pack_value;

pub mod avro;
pub mod bencode;
pub mod bson;
pub mod cbor;
pub mod ejson;
pub mod ion;
pub mod json;
pub mod json_binary;
pub mod msgpack;
pub mod resp;
pub mod rm;
pub mod rpc;
pub mod ssh;
pub mod ubjson;
pub mod util;
pub mod ws;
pub mod xdr;

pub use constants::EncodingFormat;
pub use json_pack_extension::JsonPackExtension;
pub use json_pack_mpint::JsonPackMpint;
pub use json_pack_value::JsonPackValue;
pub use pack_value::PackValue;

pub use cbor::{
    cbor_to_json, cbor_to_json_owned, decode_cbor_value, decode_cbor_value_with_consumed,
    decode_json_from_cbor_bytes, encode_cbor_value, encode_json_to_cbor_bytes, json_to_cbor,
    validate_cbor_exact_size, write_cbor_signed, write_cbor_text_like_json_pack,
    write_cbor_uint_major, write_json_like_json_pack, CborEncoder, CborError, CborJsonValueCodec,
};
