//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the wire bytes of manifests, calldata and interactions
//! so that every implementation encodes identically.

use logic_codec_core::{encode_hex, Result, Value, U256};
use logic_codec_interaction::{
    Amount, AssetActionPayload, RawInteraction, RawTransaction, TransactionPayload, TxType,
};
use logic_codec_manifest::{EngineDescriptor, Manifest, ManifestCoder, Routine, TypeField};

use crate::fixtures::{address, sample_codec, TestFixture};

/// What a vector encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorCase {
    /// A manifest with no elements.
    EmptyManifest,
    /// One `u64` argument of 300.
    SingleU64Argument,
    /// A `Point` struct argument.
    StructArgument,
    /// An asset transfer payload.
    TransferPayload,
    /// An interaction holding one transfer.
    TransferInteraction,
    /// The same interaction with the amount held as a 256-bit integer.
    WideTransferInteraction,
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub description: &'static str,
    pub case: VectorCase,
    /// Expected encoding (0x-prefixed hex).
    pub expected: &'static str,
}

const TRANSFER_PAYLOAD: &str = "0xa466616d6f756e744342012c6861737365745f6964582658240000000122222222222222222222222222222222222222222222222222222222222222226974696d657374616d7041006b62656e6566696369617279582258203333333333333333333333333333333333333333333333333333333333333333";

const TRANSFER_INTERACTION: &str = "0xa86566756e6473583e81a266616d6f756e744342012c6861737365745f696458265824000000012222222222222222222222222222222222222222222222222222222222222222656e6f6e636541016570617965725822582000000000000000000000000000000000000000000000000000000000000000006673656e6465725822582011111111111111111111111111111111111111111111111111111111111111116a6675656c5f6c696d69744218646a6675656c5f707269636541016c7061727469636970616e7473587382a26761646472657373582258201111111111111111111111111111111111111111111111111111111111111111696c6f636b5f747970654100a26761646472657373582258203333333333333333333333333333333333333333333333333333333333333333696c6f636b5f7479706541006c7472616e73616374696f6e73588e81a264747970654102677061796c6f6164587b5879a466616d6f756e744342012c6861737365745f6964582658240000000122222222222222222222222222222222222222222222222222222222222222226974696d657374616d7041006b62656e6566696369617279582258203333333333333333333333333333333333333333333333333333333333333333";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty_manifest",
            description: "PISA manifest with no elements",
            case: VectorCase::EmptyManifest,
            expected: "0x8201a2646b696e6445645049534165666c6167734180",
        },
        GoldenVector {
            name: "single_u64_argument",
            description: "Store(amount: 300)",
            case: VectorCase::SingleU64Argument,
            expected: "0xa166616d6f756e744319012c",
        },
        GoldenVector {
            name: "struct_argument",
            description: "Place(origin: Point { x: 1, y: -2 })",
            case: VectorCase::StructArgument,
            expected: "0xa1666f726967696e49a26178410161794121",
        },
        GoldenVector {
            name: "transfer_payload",
            description: "300 units of asset 0x00000001/0x22.. to 0x33..",
            case: VectorCase::TransferPayload,
            expected: TRANSFER_PAYLOAD,
        },
        GoldenVector {
            name: "transfer_interaction",
            description: "0x11.. sends the transfer with nonce 1, fuel 1 x 100",
            case: VectorCase::TransferInteraction,
            expected: TRANSFER_INTERACTION,
        },
        GoldenVector {
            name: "wide_transfer_interaction",
            description: "transfer_interaction with a U256 amount",
            case: VectorCase::WideTransferInteraction,
            expected: TRANSFER_INTERACTION,
        },
    ]
}

fn transfer(amount: Amount) -> RawTransaction {
    RawTransaction::new(
        TxType::AssetTransfer,
        TransactionPayload::AssetAction(AssetActionPayload {
            benefactor: None,
            beneficiary: address(0x33),
            asset_id: TestFixture::new().asset(0x22),
            amount,
            timestamp: 0,
        }),
    )
}

fn transfer_interaction(amount: Amount) -> RawInteraction {
    TestFixture::new()
        .interaction()
        .with_transaction(transfer(amount))
}

/// Compute the encoding a vector describes, as 0x-prefixed hex.
pub fn compute_vector(vector: &GoldenVector) -> Result<String> {
    let codec = sample_codec();
    match vector.case {
        VectorCase::EmptyManifest => ManifestCoder::encode_manifest(&Manifest {
            syntax: 1,
            engine: EngineDescriptor {
                kind: "PISA".into(),
                flags: vec![],
            },
            elements: vec![],
        }),
        VectorCase::SingleU64Argument => {
            let routine = Routine::new("Store", vec![TypeField::new(0, "amount", "u64")], vec![]);
            codec.encode_arguments(&routine, &[Value::from(300u64)])
        }
        VectorCase::StructArgument => {
            let routine = Routine::new("Place", vec![TypeField::new(0, "origin", "Point")], vec![]);
            let origin = Value::structure([("x", Value::from(1i64)), ("y", Value::from(-2i64))]);
            codec.encode_arguments(&routine, &[origin])
        }
        VectorCase::TransferPayload => {
            let tx = transfer(Amount::Small(300));
            let payload = tx.require_payload()?;
            Ok(encode_hex(payload.to_bytes()?))
        }
        VectorCase::TransferInteraction => codec
            .interaction_bytes(&transfer_interaction(Amount::Small(300)))
            .map(encode_hex),
        VectorCase::WideTransferInteraction => codec
            .interaction_bytes(&transfer_interaction(Amount::Wide(U256::from(300))))
            .map(encode_hex),
    }
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, computed)` for each vector; a failed
/// computation reports its error in place of the hex.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match compute_vector(v) {
            Ok(hex) => (v.name.to_string(), hex == v.expected, hex),
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, computed) in verify_all_vectors() {
            assert!(matches, "Vector '{}' computed {}", name, computed);
        }
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            let first = compute_vector(&vector).unwrap();
            let second = compute_vector(&vector).unwrap();
            assert_eq!(
                first, second,
                "Vector '{}' produced different bytes on regeneration",
                vector.name
            );
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        for (i, a) in vectors.iter().enumerate() {
            assert!(vectors[i + 1..].iter().all(|b| b.name != a.name), "duplicate {}", a.name);
        }
    }

    #[test]
    fn test_different_amounts_different_bytes() {
        let codec = sample_codec();
        let a = codec
            .interaction_bytes(&transfer_interaction(Amount::Small(300)))
            .unwrap();
        let b = codec
            .interaction_bytes(&transfer_interaction(Amount::Small(301)))
            .unwrap();
        assert_ne!(a, b);
    }
}
