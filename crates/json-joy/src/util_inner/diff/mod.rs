//! Diff utilities for strings, bytes, and lines.
//!
//! Mirrors `packages/json-joy/src/util/diff/`.

pub mod bin;
pub mod line;
pub mod str;
pub mod str_utils;
