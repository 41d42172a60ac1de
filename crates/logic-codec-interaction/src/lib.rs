//! # Logic Codec Interaction
//!
//! Interaction requests and their canonical wire form.
//!
//! ## Overview
//!
//! A [`RawInteraction`] bundles transactions with the funds and participants
//! the caller expects. The [`Canonicalizer`] turns it into a
//! [`ProcessedInteraction`]:
//!
//! 1. **Funds**: transfer and burn amounts are summed per asset; supplied
//!    funds fill in assets no transaction mentions
//! 2. **Participants**: sender, payer and every touched address get a mutate
//!    lock; supplied participants follow; first writer wins
//! 3. **Payloads**: each transaction payload is serialized under its fixed
//!    schema
//!
//! The processed interaction encodes to the bytes an external signer signs.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use logic_codec_interaction::{Canonicalizer, RawInteraction};
//!
//! # fn main() -> logic_codec_core::Result<()> {
//! let raw = RawInteraction::from_json("{ ... }")?;
//! let processed = Canonicalizer::new().canonicalize(&raw)?;
//! let digest = processed.hash()?;
//! # Ok(())
//! # }
//! ```

pub mod canonicalize;
pub mod funds;
pub mod participants;
pub mod payload;
pub mod processed;
pub mod request;
pub mod types;

pub use canonicalize::Canonicalizer;
pub use funds::consolidate_funds;
pub use participants::{
    derive_participants, implied_participant, IdLayout, ParticipantSet, ASSET_PREFIX_LEN,
    LOGIC_PREFIX_LEN,
};
pub use payload::{
    AssetActionPayload, AssetCreatePayload, AssetSupplyPayload, LogicPayload,
    ParticipantCreatePayload, TransactionPayload,
};
pub use processed::{interaction_schema, InteractionHash, ProcessedInteraction, ProcessedTransaction};
pub use request::{Fund, Participant, RawInteraction, RawTransaction};
pub use types::{Amount, LockType, TxType};
