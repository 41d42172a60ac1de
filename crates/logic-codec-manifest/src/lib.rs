//! # Logic Codec Manifest
//!
//! Logic manifests and the routine codec built on them.
//!
//! ## Overview
//!
//! A [`Manifest`] describes a program as ptr-addressed elements: constants,
//! typedefs, classes, routines, methods, events and state. Field types are
//! written as descriptors (`map[string]u64`, `[]Point`, ...) that the
//! [`SchemaResolver`] turns into wire schemas.
//!
//! A [`ManifestCoder`] binds one manifest and provides:
//!
//! - calldata encoding and decoding for routines
//! - output, event log and exception decoding
//! - packed manifest serialization
//!
//! ## Usage
//!
//! ```rust,no_run
//! use logic_codec_core::Value;
//! use logic_codec_manifest::{Manifest, ManifestCoder};
//!
//! # fn main() -> logic_codec_core::Result<()> {
//! let manifest = Manifest::from_json("{ ... }")?;
//! let coder = ManifestCoder::new(manifest);
//!
//! let calldata = coder.encode_arguments("Transfer", &[Value::from(42u64)])?;
//! let args = coder.decode_arguments("Transfer", &calldata)?;
//! # Ok(())
//! # }
//! ```

mod calldata;
pub mod coder;
pub mod fixed;
pub mod manifest;
pub mod resolver;

pub use coder::{
    CoderConfig, Exception, ManifestCoder, RoutineRef, BUILTIN_LOG_EVENT, DEFAULT_MAX_DEPTH,
};
pub use manifest::{
    Class, Constant, Element, ElementData, ElementKind, EngineDescriptor, Event, Executes,
    Manifest, MethodField, Routine, State, TypeField,
};
pub use resolver::{ElementTable, SchemaResolver, TypeDescriptor};
