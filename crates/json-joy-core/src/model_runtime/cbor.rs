//! CBOR conversion helpers for runtime model encode/decode paths.
//!
//! Runtime modules now use shared helpers from `json-joy-json-pack` for most
//! encode/decode conversion and json-pack-style writer behavior. This module
//! remains as a local anchor for runtime-specific CBOR notes where needed.
