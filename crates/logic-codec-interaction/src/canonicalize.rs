//! Interaction canonicalization.

use bytes::Bytes;

use logic_codec_core::{Address, CodecError, Result};

use crate::funds::consolidate_funds;
use crate::participants::{derive_participants, IdLayout};
use crate::processed::{ProcessedInteraction, ProcessedTransaction};
use crate::request::{RawInteraction, RawTransaction};

/// Turns raw interaction requests into their canonical form.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    layout: IdLayout,
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(layout: IdLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &IdLayout {
        &self.layout
    }

    /// Canonicalize a raw interaction.
    ///
    /// Funds are consolidated, participants derived and payloads serialized,
    /// in that order. Any failure is reported as `SerializationFailed`
    /// carrying the cause.
    pub fn canonicalize(&self, raw: &RawInteraction) -> Result<ProcessedInteraction> {
        self.process(raw).map_err(|cause| {
            tracing::warn!(
                sender = %raw.sender,
                transactions = raw.transactions.len(),
                "rejected interaction: {}",
                cause
            );
            CodecError::serialization_failed(cause)
        })
    }

    /// Canonicalize and encode, producing the bytes to sign.
    pub fn interaction_bytes(&self, raw: &RawInteraction) -> Result<Vec<u8>> {
        self.canonicalize(raw)?
            .to_bytes()
            .map_err(CodecError::serialization_failed)
    }

    fn process(&self, raw: &RawInteraction) -> Result<ProcessedInteraction> {
        let funds = consolidate_funds(raw)?;
        let participants = derive_participants(raw, &self.layout)?;
        let transactions = raw
            .transactions
            .iter()
            .map(serialize_transaction)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            funds = funds.len(),
            participants = participants.len(),
            transactions = transactions.len(),
            "canonicalized interaction"
        );

        Ok(ProcessedInteraction {
            sender: raw.sender,
            payer: raw.payer.unwrap_or(Address::ZERO),
            nonce: raw.nonce,
            fuel_price: raw.fuel_price,
            fuel_limit: raw.fuel_limit,
            funds,
            participants,
            transactions,
        })
    }
}

fn serialize_transaction(tx: &RawTransaction) -> Result<ProcessedTransaction> {
    let payload = tx.require_payload()?;
    if !payload.matches(tx.tx_type) {
        return Err(CodecError::InvalidArgument(format!(
            "payload does not match {} transaction",
            tx.tx_type
        )));
    }

    Ok(ProcessedTransaction {
        tx_type: tx.tx_type,
        payload: Bytes::from(payload.to_bytes()?),
    })
}
