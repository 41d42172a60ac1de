//! Test fixtures and helpers.
//!
//! A sample manifest covering every element kind, and deterministic
//! identifiers and interactions for integration tests.

use logic_codec::{Codec, CodecConfig};
use logic_codec_core::{Address, AssetId, LogicId};
use logic_codec_interaction::{
    Amount, AssetActionPayload, AssetSupplyPayload, Fund, LogicPayload, RawInteraction,
    RawTransaction, TransactionPayload, TxType,
};
use logic_codec_manifest::Manifest;

/// A manifest with one element of every kind.
pub const SAMPLE_MANIFEST: &str = r#"{
    "syntax": 1,
    "engine": { "kind": "PISA", "flags": ["strict"] },
    "elements": [
        { "ptr": 0, "kind": "constant", "data": { "type": "u64", "value": "0x0a" } },
        { "ptr": 1, "kind": "typedef", "data": "map[string]u64" },
        {
            "ptr": 2, "kind": "class",
            "data": {
                "name": "Point",
                "fields": [
                    { "slot": 0, "label": "x", "type": "i64" },
                    { "slot": 1, "label": "y", "type": "i64" }
                ],
                "methods": [{ "ptr": 3, "code": 0 }]
            }
        },
        {
            "ptr": 3, "deps": [2], "kind": "method",
            "data": {
                "name": "Point.Norm", "kind": "invoke", "mode": "static",
                "accepts": [{ "slot": 0, "label": "self", "type": "Point" }],
                "returns": [{ "slot": 0, "label": "norm", "type": "u64" }],
                "executes": { "asm": ["LDA 0x0", "RET"] }
            }
        },
        {
            "ptr": 4, "deps": [1], "kind": "state",
            "data": {
                "mode": "persistent",
                "fields": [
                    { "slot": 0, "label": "balances", "type": "map[address]u256" },
                    { "slot": 1, "label": "supply", "type": "u256" }
                ]
            }
        },
        {
            "ptr": 5, "deps": [4], "kind": "routine",
            "data": {
                "name": "Seed", "kind": "deploy", "mode": "persistent",
                "accepts": [
                    { "slot": 0, "label": "symbol", "type": "string" },
                    { "slot": 1, "label": "supply", "type": "u256" }
                ],
                "returns": [],
                "executes": { "bin": [1, 2, 3], "hex": "0x010203" }
            }
        },
        {
            "ptr": 6, "deps": [4, 8], "kind": "routine",
            "data": {
                "name": "Transfer", "kind": "invoke", "mode": "persistent",
                "accepts": [
                    { "slot": 0, "label": "to", "type": "address" },
                    { "slot": 1, "label": "amount", "type": "u64" },
                    { "slot": 2, "label": "memo", "type": "bytes" }
                ],
                "returns": [{ "slot": 0, "label": "ok", "type": "bool" }],
                "catches": ["builtin.Error"]
            }
        },
        {
            "ptr": 7, "deps": [2], "kind": "routine",
            "data": {
                "name": "Route", "kind": "invoke",
                "accepts": [
                    { "slot": 0, "label": "path", "type": "[]Point" },
                    { "slot": 1, "label": "weights", "type": "map[string]u64" },
                    { "slot": 2, "label": "tags", "type": "[]string" },
                    { "slot": 3, "label": "origin", "type": "Point" },
                    { "slot": 4, "label": "stops", "type": "map[string]Point" }
                ],
                "returns": [{ "slot": 0, "label": "distance", "type": "u256" }]
            }
        },
        {
            "ptr": 8, "kind": "event",
            "data": {
                "name": "Transferred", "topics": 2,
                "fields": [
                    { "slot": 0, "label": "from", "type": "address" },
                    { "slot": 1, "label": "to", "type": "address" },
                    { "slot": 2, "label": "amount", "type": "u64" }
                ]
            }
        },
        {
            "ptr": 9, "deps": [4], "kind": "routine",
            "data": {
                "name": "Balances", "kind": "invoke", "mode": "static",
                "accepts": [],
                "returns": [{ "slot": 0, "label": "balances", "type": "map[address]u256" }]
            }
        }
    ]
}"#;

/// Routine names in [`SAMPLE_MANIFEST`] that accept arguments.
pub const SAMPLE_ROUTINES: &[&str] = &["Point.Norm", "Seed", "Transfer", "Route"];

/// The parsed sample manifest.
pub fn sample_manifest() -> Manifest {
    // The constant is valid JSON for a manifest
    Manifest::from_json(SAMPLE_MANIFEST).unwrap_or_else(|e| panic!("sample manifest: {}", e))
}

/// A codec bound to the sample manifest.
pub fn sample_codec() -> Codec {
    Codec::with_config(sample_manifest(), CodecConfig::default())
}

/// Deterministic identifiers for building interactions.
pub struct TestFixture {
    pub sender: Address,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_seed(0x11)
    }

    pub fn with_seed(seed: u8) -> Self {
        Self {
            sender: address(seed),
        }
    }

    /// An asset owned by `owner`.
    pub fn asset(&self, owner: u8) -> AssetId {
        AssetId::from_parts(&[0, 0, 0, 1], &address(owner))
    }

    /// A logic owned by `owner`.
    pub fn logic(&self, owner: u8) -> LogicId {
        LogicId::from_parts(&[1, 0, 0], &address(owner))
    }

    pub fn transfer(&self, asset_owner: u8, to: u8, amount: impl Into<Amount>) -> RawTransaction {
        RawTransaction::new(
            TxType::AssetTransfer,
            TransactionPayload::AssetAction(AssetActionPayload {
                benefactor: None,
                beneficiary: address(to),
                asset_id: self.asset(asset_owner),
                amount: amount.into(),
                timestamp: 0,
            }),
        )
    }

    pub fn burn(&self, asset_owner: u8, amount: impl Into<Amount>) -> RawTransaction {
        RawTransaction::new(
            TxType::AssetBurn,
            TransactionPayload::AssetSupply(AssetSupplyPayload {
                asset_id: self.asset(asset_owner),
                amount: amount.into(),
            }),
        )
    }

    pub fn invoke(&self, logic_owner: u8, callsite: &str, calldata: Vec<u8>) -> RawTransaction {
        RawTransaction::new(
            TxType::LogicInvoke,
            TransactionPayload::Logic(LogicPayload {
                logic_id: Some(self.logic(logic_owner)),
                callsite: callsite.to_string(),
                calldata,
                ..LogicPayload::default()
            }),
        )
    }

    /// An empty interaction from the fixture's sender.
    pub fn interaction(&self) -> RawInteraction {
        let mut raw = RawInteraction::new(self.sender);
        raw.nonce = 1;
        raw.fuel_price = 1;
        raw.fuel_limit = 100;
        raw
    }

    /// An interaction with a transfer, a burn and supplied funds.
    pub fn mixed_interaction(&self) -> RawInteraction {
        let mut raw = self
            .interaction()
            .with_transaction(self.transfer(0x22, 0x33, 5u64))
            .with_transaction(self.burn(0x22, 2u64))
            .with_transaction(self.invoke(0x44, "Transfer", vec![0xa0]));
        raw.funds = vec![
            Fund::new(self.asset(0x22), 1u64),
            Fund::new(self.asset(0x55), 9u64),
        ];
        raw
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An address filled with one byte.
pub fn address(byte: u8) -> Address {
    Address::from_bytes([byte; 32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use logic_codec_manifest::ElementKind;
    use std::collections::HashSet;

    #[test]
    fn test_sample_covers_every_kind() {
        let kinds: HashSet<ElementKind> = sample_manifest().elements.iter().map(|e| e.kind()).collect();
        for kind in [
            ElementKind::Constant,
            ElementKind::Typedef,
            ElementKind::Class,
            ElementKind::Method,
            ElementKind::Routine,
            ElementKind::Event,
            ElementKind::State,
        ] {
            assert!(kinds.contains(&kind), "missing {}", kind);
        }
    }

    #[test]
    fn test_sample_routines_resolve() {
        let codec = sample_codec();
        for name in SAMPLE_ROUTINES {
            let routine = codec.coder().elements().routine(name).unwrap();
            assert!(!routine.accepts.is_empty());
            codec.coder().resolver().resolve_fields(&routine.accepts).unwrap();
        }
    }

    #[test]
    fn test_mixed_interaction_canonicalizes() {
        let fixture = TestFixture::new();
        let processed = sample_codec().canonicalize(&fixture.mixed_interaction()).unwrap();

        assert_eq!(
            processed.funds,
            vec![
                Fund::new(fixture.asset(0x22), 7u64),
                Fund::new(fixture.asset(0x55), 9u64),
            ]
        );
        let addresses: Vec<_> = processed.participants.iter().map(|p| p.address).collect();
        assert_eq!(
            addresses,
            vec![fixture.sender, address(0x33), address(0x22), address(0x44)]
        );
    }
}
