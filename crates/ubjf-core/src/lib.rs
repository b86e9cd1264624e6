//! Pull-style streaming decoder core for the Universal Binary JSON (UBJSON)
//! wire format.
//!
//! [`read_next`] decodes one top-level [`Value`]/container node per call
//! from an abstract [`ByteSource`], emitting events to a [`Consumer`] in
//! wire order. The crate owns the grammar, the numeric/string decoding, and
//! failure propagation; it does not write UBJSON, does not convert to or
//! from textual JSON, and does not supply a concrete byte-source backend
//! beyond the in-memory [`SliceSource`] reference adapter — see
//! `DESIGN.md` for the full boundary.
//!
//! ```
//! use ubjf_core::{read_next, Consumer, HighPMode, SliceSource, Value};
//!
//! #[derive(Default)]
//! struct Print;
//!
//! impl Consumer for Print {
//!     type Error = std::convert::Infallible;
//!
//!     fn on_value(&mut self, value: Value) -> Result<(), Self::Error> {
//!         println!("{value:?}");
//!         Ok(())
//!     }
//! }
//!
//! let data = [0x6C, 0x00, 0x00, 0x00, 0x2A]; // `l` + big-endian 42
//! let mut source = SliceSource::new(&data);
//! let mut consumer = Print::default();
//! let (result, node_count) = read_next(&mut source, &mut consumer, HighPMode::Throw);
//! assert!(result.is_ok());
//! assert_eq!(node_count, 1);
//! ```

#![forbid(unsafe_code)]

mod consumer;
mod container;
mod context;
mod dispatch;
mod driver;
mod error;
mod numeric;
mod scalar;
mod source;
mod token;
mod value;

pub use consumer::{Consumer, NullConsumer, StringAlloc};
pub use driver::{read_next, HighPMode};
pub use error::ParseError;
pub use source::{ByteSource, SliceSource, SourceError};
pub use token::TypeTag;
pub use value::{ContainerKind, Value};
