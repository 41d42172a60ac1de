//! # Logic Codec Core
//!
//! Pure primitives for the logic codec: dynamic values, schema nodes, the
//! packed wire encoding, and hex identifiers.
//!
//! This crate contains no I/O. It is pure computation over byte buffers.
//!
//! ## Key Types
//!
//! - [`Value`] - In-memory form of calldata, outputs and payloads
//! - [`Schema`] - Wire shape of a value
//! - [`Writer`] / [`Reader`] - Sequential pack encoding
//! - [`Document`] - Label-addressed sub-document of encoded fields
//! - [`Address`], [`AssetId`], [`LogicId`] - Fixed-width identifiers
//!
//! ## Encoding
//!
//! Values are encoded as deterministic CBOR. See the [`wire`] module.

pub mod error;
pub mod schema;
pub mod types;
pub mod value;
pub mod wire;

pub use error::{CodecError, Result};
pub use primitive_types::U256;
pub use schema::{Schema, SchemaKind};
pub use types::{
    decode_hex, encode_hex, is_prefixed_hex, trim_hex_prefix, Address, AssetId, LogicId,
    ADDRESS_LEN, HEX_PREFIX,
};
pub use value::Value;
pub use wire::{decode_document, decode_value, encode_document, encode_value, Document, Reader, Writer};
