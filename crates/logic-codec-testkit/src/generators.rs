//! Proptest generators for property-based testing.

use primitive_types::U256;
use proptest::prelude::*;

use logic_codec_core::{Address, AssetId, LogicId, Schema, Value};
use logic_codec_interaction::{
    Amount, AssetActionPayload, AssetSupplyPayload, Fund, LockType, Participant, RawInteraction,
    RawTransaction, TransactionPayload, TxType,
};

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(Address::from_bytes)
}

/// Generate an asset id with a random owner.
pub fn asset_id() -> impl Strategy<Value = AssetId> {
    (any::<[u8; 4]>(), address()).prop_map(|(prefix, owner)| AssetId::from_parts(&prefix, &owner))
}

/// Generate a logic id with a random owner.
pub fn logic_id() -> impl Strategy<Value = LogicId> {
    (any::<[u8; 3]>(), address()).prop_map(|(prefix, owner)| LogicId::from_parts(&prefix, &owner))
}

/// Generate an amount, narrow or wide.
pub fn amount() -> impl Strategy<Value = Amount> {
    prop_oneof![
        any::<u64>().prop_map(Amount::Small),
        any::<[u8; 32]>().prop_map(|be| Amount::Wide(U256::from_big_endian(&be))),
    ]
}

/// Generate an amount small enough that a handful of them never overflow.
pub fn small_amount() -> impl Strategy<Value = Amount> {
    (0u64..=u64::MAX / 16).prop_map(Amount::Small)
}

/// Generate a TxType.
pub fn tx_type() -> impl Strategy<Value = TxType> {
    prop_oneof![
        Just(TxType::ParticipantCreate),
        Just(TxType::AssetTransfer),
        Just(TxType::AssetCreate),
        Just(TxType::AssetApprove),
        Just(TxType::AssetRevoke),
        Just(TxType::AssetMint),
        Just(TxType::AssetBurn),
        Just(TxType::LogicDeploy),
        Just(TxType::LogicInvoke),
        Just(TxType::LogicEnlist),
    ]
}

/// Generate a LockType.
pub fn lock_type() -> impl Strategy<Value = LockType> {
    prop_oneof![
        Just(LockType::MutateLock),
        Just(LockType::ReadLock),
        Just(LockType::NoLock),
    ]
}

/// Generate a transfer or burn drawing on one of `assets`.
pub fn spending_transaction(assets: Vec<AssetId>) -> impl Strategy<Value = RawTransaction> {
    (
        any::<bool>(),
        proptest::sample::select(assets),
        address(),
        small_amount(),
    )
        .prop_map(|(is_transfer, asset_id, to, amount)| {
            if is_transfer {
                RawTransaction::new(
                    TxType::AssetTransfer,
                    TransactionPayload::AssetAction(AssetActionPayload {
                        benefactor: None,
                        beneficiary: to,
                        asset_id,
                        amount,
                        timestamp: 0,
                    }),
                )
            } else {
                RawTransaction::new(
                    TxType::AssetBurn,
                    TransactionPayload::AssetSupply(AssetSupplyPayload { asset_id, amount }),
                )
            }
        })
}

/// Generate an interaction spending from a small pool of assets, with
/// supplied funds and participants that may overlap the derived ones.
pub fn interaction() -> impl Strategy<Value = RawInteraction> {
    (
        prop::collection::vec(asset_id(), 1..=3),
        address(),
        any::<Option<[u8; 32]>>(),
    )
        .prop_flat_map(|(assets, sender, payer)| {
            (
                Just(sender),
                Just(payer.map(Address::from_bytes)),
                prop::collection::vec(spending_transaction(assets.clone()), 0..6),
                prop::collection::vec(
                    (proptest::sample::select(assets), small_amount()),
                    0..3,
                ),
                prop::collection::vec(
                    (prop_oneof![Just(sender), address()], lock_type()),
                    0..3,
                ),
            )
        })
        .prop_map(|(sender, payer, transactions, funds, participants)| {
            let mut raw = RawInteraction::new(sender);
            raw.payer = payer;
            raw.transactions = transactions;
            raw.funds = funds
                .into_iter()
                .map(|(asset_id, amount)| Fund::new(asset_id, amount))
                .collect();
            raw.participants = participants
                .into_iter()
                .map(|(address, lock_type)| Participant::new(address, lock_type))
                .collect();
            raw
        })
}

/// Generate a value that fits `schema` and survives a calldata round trip.
///
/// Strings never start with `0x`, map keys are unique, and struct values
/// carry every field.
pub fn value_for(schema: &Schema) -> BoxedStrategy<Value> {
    match schema {
        Schema::Null => Just(Value::Null).boxed(),
        Schema::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        Schema::Integer => any::<i64>().prop_map(Value::from).boxed(),
        Schema::BigInt => any::<[u8; 32]>()
            .prop_map(|be| Value::BigInt(U256::from_big_endian(&be)))
            .boxed(),
        Schema::String => "[g-z][a-z0-9 ]{0,15}".prop_map(Value::String).boxed(),
        Schema::Bytes => prop::collection::vec(any::<u8>(), 0..=40)
            .prop_map(Value::Bytes)
            .boxed(),
        Schema::Array { values } => prop::collection::vec(value_for(values), 0..4)
            .prop_map(Value::Array)
            .boxed(),
        Schema::Map { keys, values } => {
            prop::collection::vec((value_for(keys), value_for(values)), 0..4)
                .prop_map(|entries| {
                    // Keys must be unique to encode
                    let mut unique: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
                    for (key, value) in entries {
                        if unique.iter().all(|(k, _)| *k != key) {
                            unique.push((key, value));
                        }
                    }
                    Value::Map(unique)
                })
                .boxed()
        }
        Schema::Struct { fields } => {
            let labels: Vec<String> = fields.iter().map(|(label, _)| label.clone()).collect();
            let strategies: Vec<BoxedStrategy<Value>> =
                fields.iter().map(|(_, field)| value_for(field)).collect();
            strategies
                .prop_map(move |values| Value::structure(labels.clone().into_iter().zip(values)))
                .boxed()
        }
        Schema::Document => Just(Value::Document(Default::default())).boxed(),
    }
}

/// Generate positional arguments for a routine's resolved `accepts` schema.
pub fn arguments_for(schema: &Schema) -> BoxedStrategy<Vec<Value>> {
    let strategies: Vec<BoxedStrategy<Value>> =
        schema.fields().iter().map(|(_, field)| value_for(field)).collect();
    strategies.boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_codec, SAMPLE_ROUTINES};
    use logic_codec_interaction::{consolidate_funds, derive_participants, IdLayout};
    use std::collections::HashSet;

    /// Resolved argument schemas of the sample routines, in `accepts` order.
    fn sample_schemas() -> Vec<(&'static str, Schema)> {
        let codec = sample_codec();
        SAMPLE_ROUTINES
            .iter()
            .map(|name| {
                let routine = codec.coder().elements().routine(name).unwrap();
                let mut accepts = routine.accepts.clone();
                accepts.sort_by_key(|f| f.slot);
                let fields = accepts
                    .iter()
                    .map(|f| {
                        let schema = codec.coder().resolver().resolve_type(&f.ty).unwrap();
                        (f.label.clone(), schema)
                    })
                    .collect::<Vec<_>>();
                (*name, Schema::Struct { fields })
            })
            .collect()
    }

    fn routine_with_args() -> impl Strategy<Value = (&'static str, Vec<Value>)> {
        proptest::sample::select(sample_schemas()).prop_flat_map(|(name, schema)| {
            (Just(name), arguments_for(&schema))
        })
    }

    proptest! {
        #[test]
        fn test_arguments_roundtrip((routine, args) in routine_with_args()) {
            let codec = sample_codec();
            let calldata = codec.encode_arguments(routine, &args).unwrap();
            let decoded = codec.decode_arguments(routine, &calldata).unwrap();

            prop_assert_eq!(decoded, Some(args));
        }

        #[test]
        fn test_calldata_deterministic((routine, args) in routine_with_args()) {
            let codec = sample_codec();
            let c1 = codec.encode_arguments(routine, &args).unwrap();
            let c2 = codec.encode_arguments(routine, &args).unwrap();

            prop_assert_eq!(c1, c2);
        }

        #[test]
        fn test_amount_sum_matches_u256(a in small_amount(), b in small_amount()) {
            let sum = a.checked_add(b).unwrap();
            prop_assert_eq!(sum.to_u256(), a.to_u256() + b.to_u256());
            prop_assert!(!sum.is_wide());
        }

        #[test]
        fn test_wide_amount_equals_narrow(n in any::<u64>()) {
            prop_assert_eq!(Amount::Wide(U256::from(n)), Amount::Small(n));
            prop_assert_eq!(Amount::Wide(U256::from(n)).to_value(), Amount::Small(n).to_value());
        }

        #[test]
        fn test_funds_first_appearance_order(raw in interaction()) {
            let funds = consolidate_funds(&raw).unwrap();

            let mut expected = Vec::new();
            let spent = raw.transactions.iter().map(|tx| match tx.payload.as_ref().unwrap() {
                TransactionPayload::AssetAction(p) => p.asset_id.clone(),
                TransactionPayload::AssetSupply(p) => p.asset_id.clone(),
                other => panic!("unexpected payload {:?}", other),
            });
            let supplied = raw.funds.iter().map(|f| f.asset_id.clone());
            for asset in spent.chain(supplied) {
                if !expected.contains(&asset) {
                    expected.push(asset);
                }
            }

            let actual: Vec<AssetId> = funds.iter().map(|f| f.asset_id.clone()).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn test_participants_deduplicated(raw in interaction()) {
            let participants = derive_participants(&raw, &IdLayout::default()).unwrap();

            let unique: HashSet<Address> = participants.iter().map(|p| p.address).collect();
            prop_assert_eq!(unique.len(), participants.len());
            prop_assert_eq!(participants[0], Participant::new(raw.sender, LockType::MutateLock));
        }

        #[test]
        fn test_interaction_bytes_deterministic(raw in interaction()) {
            let codec = sample_codec();
            let b1 = codec.interaction_bytes(&raw).unwrap();
            let b2 = codec.interaction_bytes(&raw.clone()).unwrap();

            prop_assert_eq!(b1, b2);
        }

        #[test]
        fn test_tx_type_code_roundtrip(tx_type in tx_type()) {
            prop_assert_eq!(TxType::try_from(tx_type.code()).unwrap(), tx_type);
        }
    }
}
