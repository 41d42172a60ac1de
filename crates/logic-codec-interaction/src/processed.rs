//! The canonical, byte-ready form of an interaction.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use logic_codec_core::{encode_hex, Address, Result, Schema, Value};
use logic_codec_manifest::ManifestCoder;

use crate::request::{Fund, Participant};
use crate::types::TxType;

/// A transaction with its payload serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedTransaction {
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub payload: Bytes,
}

/// An interaction after fund consolidation, participant derivation and
/// payload serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedInteraction {
    pub sender: Address,
    /// The payer, or [`Address::ZERO`] when the sender pays.
    pub payer: Address,
    pub nonce: u64,
    pub fuel_price: u64,
    pub fuel_limit: u64,
    pub funds: Vec<Fund>,
    pub participants: Vec<Participant>,
    pub transactions: Vec<ProcessedTransaction>,
}

impl ProcessedInteraction {
    pub fn to_value(&self) -> Value {
        Value::structure([
            ("sender", Value::from(self.sender.as_bytes().as_slice())),
            ("payer", Value::from(self.payer.as_bytes().as_slice())),
            ("nonce", Value::from(self.nonce)),
            ("fuel_price", Value::from(self.fuel_price)),
            ("fuel_limit", Value::from(self.fuel_limit)),
            (
                "funds",
                Value::Array(
                    self.funds
                        .iter()
                        .map(|f| {
                            Value::structure([
                                ("asset_id", Value::from(f.asset_id.as_bytes())),
                                ("amount", f.amount.to_value()),
                            ])
                        })
                        .collect(),
                ),
            ),
            (
                "participants",
                Value::Array(
                    self.participants
                        .iter()
                        .map(|p| {
                            Value::structure([
                                ("address", Value::from(p.address.as_bytes().as_slice())),
                                ("lock_type", Value::from(p.lock_type.code())),
                            ])
                        })
                        .collect(),
                ),
            ),
            (
                "transactions",
                Value::Array(
                    self.transactions
                        .iter()
                        .map(|t| {
                            Value::structure([
                                ("type", Value::from(t.tx_type.code())),
                                ("payload", Value::from(&t.payload[..])),
                            ])
                        })
                        .collect(),
                ),
            ),
        ])
    }

    /// Encode under the interaction schema.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        ManifestCoder::encode_payload(&interaction_schema(), self.to_value())
    }

    /// The digest an external signer signs.
    pub fn hash(&self) -> Result<InteractionHash> {
        Ok(InteractionHash::of(&self.to_bytes()?))
    }
}

/// Fixed top-level interaction schema.
pub fn interaction_schema() -> Schema {
    Schema::structure([
        ("sender", Schema::Bytes),
        ("payer", Schema::Bytes),
        ("nonce", Schema::Integer),
        ("fuel_price", Schema::Integer),
        ("fuel_limit", Schema::Integer),
        (
            "funds",
            Schema::array(Schema::structure([
                ("asset_id", Schema::Bytes),
                ("amount", Schema::BigInt),
            ])),
        ),
        (
            "participants",
            Schema::array(Schema::structure([
                ("address", Schema::Bytes),
                ("lock_type", Schema::Integer),
            ])),
        ),
        (
            "transactions",
            Schema::array(Schema::structure([
                ("type", Schema::Integer),
                ("payload", Schema::Bytes),
            ])),
        ),
    ])
}

/// A 32-byte Blake3 digest of interaction bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionHash(pub [u8; 32]);

impl InteractionHash {
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_hex(self.0)
    }
}

impl fmt::Debug for InteractionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InteractionHash({})", &self.to_hex()[..18])
    }
}

impl fmt::Display for InteractionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for InteractionHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Amount, LockType};
    use logic_codec_core::{decode_value, AssetId};

    fn sample() -> ProcessedInteraction {
        let sender = Address::from_bytes([1; 32]);
        ProcessedInteraction {
            sender,
            payer: Address::ZERO,
            nonce: 7,
            fuel_price: 1,
            fuel_limit: 100,
            funds: vec![Fund::new(
                AssetId::from_parts(&[0, 0, 0, 1], &sender),
                Amount::Small(5),
            )],
            participants: vec![Participant::new(sender, LockType::MutateLock)],
            transactions: vec![ProcessedTransaction {
                tx_type: TxType::AssetBurn,
                payload: Bytes::from_static(&[0xa0]),
            }],
        }
    }

    #[test]
    fn test_bytes_decode_under_schema() {
        let interaction = sample();
        let bytes = interaction.to_bytes().unwrap();
        let decoded = decode_value(&bytes, &interaction_schema()).unwrap();

        assert_eq!(decoded.field("nonce"), Some(&Value::Integer(7)));
        assert_eq!(
            decoded.field("payer").and_then(Value::as_bytes),
            Some(&[0u8; 32][..])
        );

        let txs = decoded.field("transactions").and_then(Value::as_array).unwrap();
        assert_eq!(txs[0].field("type"), Some(&Value::Integer(7)));
        assert_eq!(txs[0].field("payload"), Some(&Value::Bytes(vec![0xa0])));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = sample().to_bytes().unwrap();
        let b = sample().to_bytes().unwrap();
        assert_eq!(a, b);
        assert_eq!(sample().hash().unwrap(), sample().hash().unwrap());
    }

    #[test]
    fn test_hash_changes_with_content() {
        let mut other = sample();
        other.nonce += 1;
        assert_ne!(sample().hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn test_hash_is_blake3_of_bytes() {
        let interaction = sample();
        let bytes = interaction.to_bytes().unwrap();
        assert_eq!(
            interaction.hash().unwrap().as_bytes(),
            blake3::hash(&bytes).as_bytes()
        );
        assert!(interaction.hash().unwrap().to_hex().starts_with("0x"));
    }
}
