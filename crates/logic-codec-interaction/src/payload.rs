//! Transaction payloads and their fixed schemas.
//!
//! Each transaction type carries one payload shape. Several types share a
//! shape: mint and burn both use [`AssetSupplyPayload`]; transfer, approve
//! and revoke use [`AssetActionPayload`]; the logic operations use
//! [`LogicPayload`].

use serde::{Deserialize, Serialize};

use logic_codec_core::{Address, AssetId, LogicId, Result, Schema, Value};
use logic_codec_manifest::ManifestCoder;

use crate::types::{Amount, TxType};

/// Registers a new participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCreatePayload {
    pub address: Address,
    #[serde(default)]
    pub amount: Amount,
}

/// Creates a new asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCreatePayload {
    pub symbol: String,
    pub supply: Amount,
    #[serde(default)]
    pub standard: u64,
    #[serde(default)]
    pub dimension: u64,
    #[serde(default)]
    pub is_stateful: bool,
    #[serde(default)]
    pub is_logical: bool,
    /// Logic deployed alongside a logical asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_payload: Option<LogicPayload>,
}

/// Mints or burns supply of an existing asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSupplyPayload {
    pub asset_id: AssetId,
    pub amount: Amount,
}

/// Transfers, approves or revokes an amount of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetActionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefactor: Option<Address>,
    pub beneficiary: Address,
    pub asset_id: AssetId,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub timestamp: u64,
}

/// Deploys, invokes or enlists logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicPayload {
    /// Packed manifest, for deployment.
    #[serde(default, with = "hex_bytes", skip_serializing_if = "Vec::is_empty")]
    pub manifest: Vec<u8>,
    /// Target logic, for invocation and enlistment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_id: Option<LogicId>,
    #[serde(default)]
    pub callsite: String,
    #[serde(default, with = "hex_bytes")]
    pub calldata: Vec<u8>,
}

/// A transaction payload, one variant per payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransactionPayload {
    ParticipantCreate(ParticipantCreatePayload),
    AssetCreate(AssetCreatePayload),
    AssetSupply(AssetSupplyPayload),
    AssetAction(AssetActionPayload),
    Logic(LogicPayload),
}

impl TransactionPayload {
    /// Parse the JSON payload of a transaction of type `tx_type`.
    pub fn from_json_value(tx_type: TxType, json: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match tx_type {
            TxType::ParticipantCreate => {
                TransactionPayload::ParticipantCreate(serde_json::from_value(json)?)
            }
            TxType::AssetCreate => TransactionPayload::AssetCreate(serde_json::from_value(json)?),
            TxType::AssetMint | TxType::AssetBurn => {
                TransactionPayload::AssetSupply(serde_json::from_value(json)?)
            }
            TxType::AssetTransfer | TxType::AssetApprove | TxType::AssetRevoke => {
                TransactionPayload::AssetAction(serde_json::from_value(json)?)
            }
            TxType::LogicDeploy | TxType::LogicInvoke | TxType::LogicEnlist => {
                TransactionPayload::Logic(serde_json::from_value(json)?)
            }
        })
    }

    /// Whether this payload shape belongs to `tx_type`.
    pub fn matches(&self, tx_type: TxType) -> bool {
        match self {
            TransactionPayload::ParticipantCreate(_) => tx_type == TxType::ParticipantCreate,
            TransactionPayload::AssetCreate(_) => tx_type == TxType::AssetCreate,
            TransactionPayload::AssetSupply(_) => {
                matches!(tx_type, TxType::AssetMint | TxType::AssetBurn)
            }
            TransactionPayload::AssetAction(_) => matches!(
                tx_type,
                TxType::AssetTransfer | TxType::AssetApprove | TxType::AssetRevoke
            ),
            TransactionPayload::Logic(_) => matches!(
                tx_type,
                TxType::LogicDeploy | TxType::LogicInvoke | TxType::LogicEnlist
            ),
        }
    }

    /// The fixed schema this payload is written under.
    pub fn schema(&self) -> Schema {
        match self {
            TransactionPayload::ParticipantCreate(_) => participant_create_schema(),
            TransactionPayload::AssetCreate(_) => asset_create_schema(),
            TransactionPayload::AssetSupply(_) => asset_supply_schema(),
            TransactionPayload::AssetAction(_) => asset_action_schema(),
            TransactionPayload::Logic(_) => logic_schema(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            TransactionPayload::ParticipantCreate(p) => Value::structure([
                ("address", Value::from(p.address.as_bytes().as_slice())),
                ("amount", p.amount.to_value()),
            ]),
            TransactionPayload::AssetCreate(p) => {
                let mut fields = vec![
                    ("symbol", Value::from(p.symbol.as_str())),
                    ("supply", p.supply.to_value()),
                    ("standard", Value::from(p.standard)),
                    ("dimension", Value::from(p.dimension)),
                    ("is_stateful", Value::from(p.is_stateful)),
                    ("is_logical", Value::from(p.is_logical)),
                ];
                if let Some(logic) = &p.logic_payload {
                    fields.push(("logic_payload", logic_value(logic)));
                }
                Value::structure(fields)
            }
            TransactionPayload::AssetSupply(p) => Value::structure([
                ("asset_id", Value::from(p.asset_id.as_bytes())),
                ("amount", p.amount.to_value()),
            ]),
            TransactionPayload::AssetAction(p) => {
                let mut fields = vec![
                    ("beneficiary", Value::from(p.beneficiary.as_bytes().as_slice())),
                    ("asset_id", Value::from(p.asset_id.as_bytes())),
                    ("amount", p.amount.to_value()),
                    ("timestamp", Value::from(p.timestamp)),
                ];
                if let Some(benefactor) = &p.benefactor {
                    fields.push(("benefactor", Value::from(benefactor.as_bytes().as_slice())));
                }
                Value::structure(fields)
            }
            TransactionPayload::Logic(p) => logic_value(p),
        }
    }

    /// Serialize under the payload's fixed schema.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        ManifestCoder::encode_payload(&self.schema(), self.to_value())
    }
}

fn logic_value(p: &LogicPayload) -> Value {
    let mut fields = vec![
        ("callsite", Value::from(p.callsite.as_str())),
        ("calldata", Value::from(p.calldata.as_slice())),
    ];
    if !p.manifest.is_empty() {
        fields.push(("manifest", Value::from(p.manifest.as_slice())));
    }
    if let Some(id) = &p.logic_id {
        fields.push(("logic_id", Value::from(id.as_bytes())));
    }
    Value::structure(fields)
}

pub fn participant_create_schema() -> Schema {
    Schema::structure([("address", Schema::Bytes), ("amount", Schema::BigInt)])
}

pub fn asset_create_schema() -> Schema {
    Schema::structure([
        ("symbol", Schema::String),
        ("supply", Schema::BigInt),
        ("standard", Schema::Integer),
        ("dimension", Schema::Integer),
        ("is_stateful", Schema::Bool),
        ("is_logical", Schema::Bool),
        ("logic_payload", logic_schema()),
    ])
}

pub fn asset_supply_schema() -> Schema {
    Schema::structure([("asset_id", Schema::Bytes), ("amount", Schema::BigInt)])
}

pub fn asset_action_schema() -> Schema {
    Schema::structure([
        ("benefactor", Schema::Bytes),
        ("beneficiary", Schema::Bytes),
        ("asset_id", Schema::Bytes),
        ("amount", Schema::BigInt),
        ("timestamp", Schema::Integer),
    ])
}

pub fn logic_schema() -> Schema {
    Schema::structure([
        ("manifest", Schema::Bytes),
        ("logic_id", Schema::Bytes),
        ("callsite", Schema::String),
        ("calldata", Schema::Bytes),
    ])
}

/// Serde adapter for byte fields carried as `0x` hex in JSON.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    use logic_codec_core::{decode_hex, encode_hex};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_hex(&s).map_err(serde::de::Error::custom)
    }
}
