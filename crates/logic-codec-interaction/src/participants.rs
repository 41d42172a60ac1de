//! Participant derivation.
//!
//! The sender, the payer and every address a transaction touches take part
//! in an interaction with a mutate lock. Caller-supplied participants are
//! added after them. The set is keyed by address and the first writer wins.

use std::collections::HashMap;

use logic_codec_core::{Address, CodecError, Result};

use crate::payload::TransactionPayload;
use crate::request::{Participant, RawInteraction, RawTransaction};
use crate::types::{LockType, TxType};

/// Default discriminant prefix length of an asset id.
pub const ASSET_PREFIX_LEN: usize = 4;

/// Default discriminant prefix length of a logic id.
pub const LOGIC_PREFIX_LEN: usize = 3;

/// Byte layout of prefixed identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdLayout {
    pub asset_prefix_len: usize,
    pub logic_prefix_len: usize,
}

impl Default for IdLayout {
    fn default() -> Self {
        Self {
            asset_prefix_len: ASSET_PREFIX_LEN,
            logic_prefix_len: LOGIC_PREFIX_LEN,
        }
    }
}

/// An insertion-ordered participant set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSet {
    entries: Vec<Participant>,
    index: HashMap<Address, usize>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant unless its address is already present.
    ///
    /// Returns whether it was added.
    pub fn insert(&mut self, address: Address, lock_type: LockType) -> bool {
        if self.index.contains_key(&address) {
            return false;
        }
        self.index.insert(address, self.entries.len());
        self.entries.push(Participant::new(address, lock_type));
        true
    }

    /// Add the participants implied by `transactions`.
    ///
    /// Either every transaction yields its participant or the set is left
    /// untouched.
    pub fn absorb(&mut self, transactions: &[RawTransaction], layout: &IdLayout) -> Result<()> {
        let mut staged = Vec::with_capacity(transactions.len());
        for tx in transactions {
            if let Some(address) = implied_participant(tx, layout)? {
                staged.push(address);
            }
        }

        for address in staged {
            self.insert(address, LockType::MutateLock);
        }
        Ok(())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn lock_type(&self, address: &Address) -> Option<LockType> {
        self.index.get(address).map(|&i| self.entries[i].lock_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Participant> {
        self.entries
    }
}

/// Derive the full participant list of an interaction.
pub fn derive_participants(raw: &RawInteraction, layout: &IdLayout) -> Result<Vec<Participant>> {
    let mut set = ParticipantSet::new();
    set.insert(raw.sender, LockType::MutateLock);
    if let Some(payer) = raw.payer {
        set.insert(payer, LockType::MutateLock);
    }

    set.absorb(&raw.transactions, layout)?;

    for participant in &raw.participants {
        set.insert(participant.address, participant.lock_type);
    }
    Ok(set.into_vec())
}

/// The address a single transaction touches, if any.
pub fn implied_participant(tx: &RawTransaction, layout: &IdLayout) -> Result<Option<Address>> {
    let payload = tx.require_payload()?;
    match (tx.tx_type, payload) {
        (TxType::AssetCreate | TxType::LogicDeploy, _) => Ok(None),
        (TxType::AssetMint | TxType::AssetBurn, TransactionPayload::AssetSupply(p)) => {
            p.asset_id.owner(layout.asset_prefix_len).map(Some)
        }
        (TxType::AssetTransfer, TransactionPayload::AssetAction(p)) => Ok(Some(p.beneficiary)),
        (TxType::LogicEnlist | TxType::LogicInvoke, TransactionPayload::Logic(p)) => {
            let logic_id = p.logic_id.as_ref().ok_or_else(|| {
                CodecError::MissingArgument(format!("{} payload has no logic_id", tx.tx_type))
            })?;
            logic_id.owner(layout.logic_prefix_len).map(Some)
        }
        (
            TxType::AssetMint
            | TxType::AssetBurn
            | TxType::AssetTransfer
            | TxType::LogicEnlist
            | TxType::LogicInvoke,
            _,
        ) => Err(CodecError::InvalidArgument(format!(
            "payload does not match {} transaction",
            tx.tx_type
        ))),
        (other, _) => Err(CodecError::InvalidArgument(format!(
            "cannot derive participants for {} transaction",
            other
        ))),
    }
}
