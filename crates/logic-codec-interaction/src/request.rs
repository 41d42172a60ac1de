//! Raw interaction requests as supplied by callers.

use serde::{Deserialize, Serialize};

use logic_codec_core::{Address, AssetId, CodecError, Result};

use crate::payload::TransactionPayload;
use crate::types::{Amount, LockType, TxType};

/// An amount of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub asset_id: AssetId,
    pub amount: Amount,
}

impl Fund {
    pub fn new(asset_id: AssetId, amount: impl Into<Amount>) -> Self {
        Self {
            asset_id,
            amount: amount.into(),
        }
    }
}

/// An address involved in an interaction, with its access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub address: Address,
    pub lock_type: LockType,
}

impl Participant {
    pub fn new(address: Address, lock_type: LockType) -> Self {
        Self { address, lock_type }
    }
}

/// One operation of an interaction.
///
/// The payload is parsed according to the transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRepr")]
pub struct RawTransaction {
    #[serde(rename = "type")]
    pub tx_type: TxType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<TransactionPayload>,
}

impl RawTransaction {
    pub fn new(tx_type: TxType, payload: TransactionPayload) -> Self {
        Self {
            tx_type,
            payload: Some(payload),
        }
    }

    /// A transaction with no payload.
    pub fn bare(tx_type: TxType) -> Self {
        Self {
            tx_type,
            payload: None,
        }
    }

    /// The payload, or `MissingArgument` when absent.
    pub fn require_payload(&self) -> Result<&TransactionPayload> {
        self.payload.as_ref().ok_or_else(|| {
            CodecError::MissingArgument(format!("{} transaction has no payload", self.tx_type))
        })
    }
}

#[derive(Deserialize)]
struct TransactionRepr {
    #[serde(rename = "type")]
    tx_type: TxType,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl TryFrom<TransactionRepr> for RawTransaction {
    type Error = CodecError;

    fn try_from(repr: TransactionRepr) -> Result<Self> {
        let payload = match repr.payload {
            None | Some(serde_json::Value::Null) => None,
            Some(json) => Some(
                TransactionPayload::from_json_value(repr.tx_type, json).map_err(|e| {
                    CodecError::InvalidArgument(format!("{} payload: {}", repr.tx_type, e))
                })?,
            ),
        };
        Ok(Self {
            tx_type: repr.tx_type,
            payload,
        })
    }
}

/// An interaction request before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInteraction {
    pub sender: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Address>,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub fuel_price: u64,
    #[serde(default)]
    pub fuel_limit: u64,
    #[serde(default)]
    pub funds: Vec<Fund>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

impl RawInteraction {
    /// An empty request from `sender`.
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            payer: None,
            nonce: 0,
            fuel_price: 0,
            fuel_limit: 0,
            funds: Vec::new(),
            participants: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CodecError::DecodingError(e.to_string()))
    }

    pub fn with_transaction(mut self, tx: RawTransaction) -> Self {
        self.transactions.push(tx);
        self
    }
}
