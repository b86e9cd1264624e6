// DAG decoder alias for JSON-focused Rust port.

#[allow(unused_imports)]
pub use super::decoder::{
    decode_cbor_value, decode_cbor_value_with_consumed, decode_json_from_cbor_bytes,
};
