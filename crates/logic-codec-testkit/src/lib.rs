//! # Logic Codec Testkit
//!
//! Testing utilities for the logic codec.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known inputs with their expected wire bytes
//! - **Generators**: Proptest strategies for values, identifiers and interactions
//! - **Fixtures**: A sample manifest and helpers for building interactions
//!
//! ## Golden Vectors
//!
//! ```rust
//! use logic_codec_testkit::vectors::{all_vectors, compute_vector};
//!
//! for vector in all_vectors() {
//!     let hex = compute_vector(&vector).unwrap();
//!     assert_eq!(hex, vector.expected);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use logic_codec_testkit::generators::value_for;
//! use logic_codec_core::Schema;
//!
//! proptest! {
//!     #[test]
//!     fn encodes(value in value_for(&Schema::array(Schema::String))) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use logic_codec_testkit::fixtures::{sample_codec, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let raw = fixture.mixed_interaction();
//! let processed = sample_codec().canonicalize(&raw).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_codec, sample_manifest, TestFixture, SAMPLE_MANIFEST};
pub use generators::{arguments_for, value_for};
pub use vectors::{all_vectors, compute_vector, verify_all_vectors, GoldenVector, VectorCase};
