//! `json-cli` — command-line tools for JSON encoding/decoding and patching.
//!
//! Mirrors `packages/json-joy/src/json-cli/`.
//!
//! Provides the core logic used by the binary entry points:
//! - `json-pack`   — encode JSON → MessagePack or CBOR
//! - `json-unpack` — decode MessagePack or CBOR → JSON
//! - `json-patch`  — apply a JSON Patch to a document
//! - `json-pointer`— look up a JSON Pointer in a document

use json_joy_json_pack::cbor::{decode_cbor_value, CborEncoder};
use json_joy_json_pack::msgpack::{MsgPackDecoder, MsgPackEncoder};
use json_joy_json_pack::PackValue;
use json_joy_json_pointer::find_by_pointer;
use serde_json::Value;

use crate::json_patch::codec::json::from_json_patch;
use crate::json_patch::{apply_patch, ApplyPatchOptions};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    MsgPack(String),
    Cbor(String),
    Patch(String),
    Pointer(String),
    UnknownFormat(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "{e}"),
            CliError::MsgPack(e) => write!(f, "{e}"),
            CliError::Cbor(e) => write!(f, "{e}"),
            CliError::Patch(e) => write!(f, "{e}"),
            CliError::Pointer(e) => write!(f, "{e}"),
            CliError::UnknownFormat(e) => write!(f, "Unknown format: {e}"),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

// ── json-pack ─────────────────────────────────────────────────────────────

/// Encode a JSON string to MessagePack bytes.
pub fn pack_msgpack(json: &str) -> Result<Vec<u8>, CliError> {
    let value: Value = serde_json::from_str(json)?;
    let pack = PackValue::from(value);
    let mut encoder = MsgPackEncoder::new();
    Ok(encoder.encode(&pack))
}

/// Encode a JSON string to CBOR bytes.
pub fn pack_cbor(json: &str) -> Result<Vec<u8>, CliError> {
    let value: Value = serde_json::from_str(json)?;
    let pack = PackValue::from(value);
    let mut encoder = CborEncoder::new();
    Ok(encoder.encode(&pack))
}

/// Encode a JSON string to the requested format (`"msgpack"` or `"cbor"`).
pub fn pack(json: &str, format: &str) -> Result<Vec<u8>, CliError> {
    match format.to_lowercase().as_str() {
        "msgpack" | "messagepack" => pack_msgpack(json),
        "cbor" => pack_cbor(json),
        other => Err(CliError::UnknownFormat(other.to_string())),
    }
}

// ── json-unpack ───────────────────────────────────────────────────────────

/// Decode MessagePack bytes to a JSON string.
pub fn unpack_msgpack(bytes: &[u8]) -> Result<String, CliError> {
    let mut decoder = MsgPackDecoder::new();
    let pack = decoder
        .decode(bytes)
        .map_err(|e| CliError::MsgPack(format!("{e:?}")))?;
    let value = Value::from(pack);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Decode CBOR bytes to a JSON string.
pub fn unpack_cbor(bytes: &[u8]) -> Result<String, CliError> {
    let pack = decode_cbor_value(bytes).map_err(|e| CliError::Cbor(format!("{e:?}")))?;
    let value = Value::from(pack);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Decode bytes in the requested format to a JSON string.
pub fn unpack(bytes: &[u8], format: &str) -> Result<String, CliError> {
    match format.to_lowercase().as_str() {
        "msgpack" | "messagepack" => unpack_msgpack(bytes),
        "cbor" => unpack_cbor(bytes),
        other => Err(CliError::UnknownFormat(other.to_string())),
    }
}

// ── json-patch ────────────────────────────────────────────────────────────

/// Apply a JSON Patch (RFC 6902) to a document.
///
/// `doc_json`: the document as a JSON string.
/// `patch_json`: the patch operations as a JSON array string.
///
/// Returns the patched document as a pretty-printed JSON string.
pub fn apply_json_patch(doc_json: &str, patch_json: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let ops_raw: Value = serde_json::from_str(patch_json)?;
    let ops = from_json_patch(&ops_raw).map_err(|e| CliError::Patch(format!("{e:?}")))?;
    let options = ApplyPatchOptions { mutate: true };
    let result = apply_patch(doc, &ops, &options).map_err(|e| CliError::Patch(format!("{e:?}")))?;
    Ok(serde_json::to_string_pretty(&result.doc)?)
}

// ── json-pointer ──────────────────────────────────────────────────────────

/// Look up a JSON Pointer (RFC 6901) in a document.
///
/// `doc_json`: the document as a JSON string.
/// `pointer`: the JSON Pointer string (e.g., `/foo/bar`).
///
/// Returns the found value as a pretty-printed JSON string, or an error
/// string matching upstream behaviour (`"NOT_FOUND"`, `"INVALID_INDEX"`).
pub fn lookup_pointer(doc_json: &str, pointer: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;

    // Empty pointer means root.
    if pointer.is_empty() {
        return Ok(serde_json::to_string_pretty(&doc)?);
    }

    // find_by_pointer returns (parent_container, last_key).
    // We extract the value by indexing into the parent.
    match find_by_pointer(pointer, &doc) {
        Ok((Some(parent), key)) => {
            let val = match &parent {
                Value::Object(m) => m.get(&key).cloned(),
                Value::Array(a) => key.parse::<usize>().ok().and_then(|i| a.get(i)).cloned(),
                _ => None,
            };
            match val {
                Some(v) => Ok(serde_json::to_string_pretty(&v)?),
                None if matches!(parent, Value::Array(_)) => {
                    Err(CliError::Pointer("INVALID_INDEX".to_string()))
                }
                None => Err(CliError::Pointer("NOT_FOUND".to_string())),
            }
        }
        Ok((None, _)) => Err(CliError::Pointer("NOT_FOUND".to_string())),
        Err(e) => Err(CliError::Pointer(e.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
