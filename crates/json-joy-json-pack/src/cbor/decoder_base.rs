// Decoder-base style helpers aligned to upstream cbor family.

#[allow(unused_imports)]
pub use super::decoder::{
    decode_cbor_value, decode_cbor_value_with_consumed, validate_cbor_exact_size,
};
