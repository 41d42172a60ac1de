//! # Logic Codec
//!
//! The unified API for encoding logic manifests, routine calldata and
//! interaction requests into their compact binary wire form.
//!
//! ## Overview
//!
//! - **Manifests**: program definitions made of ptr-addressed elements,
//!   loadable from JSON or from their packed form
//! - **Calldata**: routine arguments encoded as self-describing documents;
//!   outputs, event logs and exceptions decoded back into [`Value`]s
//! - **Interactions**: transaction bundles canonicalized (funds consolidated,
//!   participants derived, payloads serialized) into the bytes a signer signs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use logic_codec::{Codec, CodecConfig, Value};
//!
//! # fn main() -> logic_codec::Result<()> {
//! let codec = Codec::from_json("{ ... }", CodecConfig::default())?;
//!
//! let calldata = codec.encode_arguments("Transfer", &[Value::from(100u64)])?;
//! let output = codec.decode_output("Transfer", "0xa0")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `logic_codec::core` - Values, schemas, wire layer, identifiers
//! - `logic_codec::manifest` - Manifests and the routine codec
//! - `logic_codec::interaction` - Interaction canonicalization

pub mod codec;
pub mod config;

// Re-export component crates
pub use logic_codec_core as core;
pub use logic_codec_interaction as interaction;
pub use logic_codec_manifest as manifest;

pub use codec::Codec;
pub use config::CodecConfig;

// Re-export commonly used types
pub use logic_codec_core::{
    Address, AssetId, CodecError, LogicId, Result, Schema, SchemaKind, Value, U256,
};
pub use logic_codec_interaction::{
    Amount, Canonicalizer, Fund, IdLayout, InteractionHash, LockType, Participant,
    ProcessedInteraction, RawInteraction, RawTransaction, TransactionPayload, TxType,
};
pub use logic_codec_manifest::{
    CoderConfig, Element, ElementData, ElementKind, Exception, Manifest, ManifestCoder, Routine,
    RoutineRef, TypeField, BUILTIN_LOG_EVENT,
};
