//! Fund consolidation.

use std::collections::HashMap;

use logic_codec_core::{AssetId, CodecError, Result};

use crate::payload::TransactionPayload;
use crate::request::{Fund, RawInteraction};
use crate::types::{Amount, TxType};

/// Consolidate the funds an interaction spends.
///
/// Transfer and burn amounts are summed per asset in order of first
/// appearance. Supplied funds are appended only for assets no transaction
/// already implies.
pub fn consolidate_funds(raw: &RawInteraction) -> Result<Vec<Fund>> {
    let mut funds: Vec<Fund> = Vec::new();
    let mut index: HashMap<AssetId, usize> = HashMap::new();

    for tx in &raw.transactions {
        let payload = tx.require_payload()?;
        if !tx.tx_type.spends_funds() {
            continue;
        }

        let (asset_id, amount) = spent(tx.tx_type, payload)?;
        match index.get(asset_id) {
            Some(&i) => funds[i].amount = funds[i].amount.checked_add(amount)?,
            None => {
                index.insert(asset_id.clone(), funds.len());
                funds.push(Fund::new(asset_id.clone(), amount));
            }
        }
    }

    for fund in &raw.funds {
        if !index.contains_key(&fund.asset_id) {
            index.insert(fund.asset_id.clone(), funds.len());
            funds.push(fund.clone());
        }
    }

    Ok(funds)
}

fn spent(tx_type: TxType, payload: &TransactionPayload) -> Result<(&AssetId, Amount)> {
    match (tx_type, payload) {
        (TxType::AssetTransfer, TransactionPayload::AssetAction(p)) => Ok((&p.asset_id, p.amount)),
        (TxType::AssetBurn, TransactionPayload::AssetSupply(p)) => Ok((&p.asset_id, p.amount)),
        (tx_type, _) => Err(CodecError::InvalidArgument(format!(
            "payload does not match {} transaction",
            tx_type
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{AssetActionPayload, AssetSupplyPayload, LogicPayload};
    use crate::request::RawTransaction;
    use logic_codec_core::Address;
    use primitive_types::U256;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    fn asset(byte: u8) -> AssetId {
        AssetId::from_parts(&[0, 0, 0, 1], &addr(byte))
    }

    fn transfer(asset_id: AssetId, amount: impl Into<Amount>) -> RawTransaction {
        RawTransaction::new(
            TxType::AssetTransfer,
            TransactionPayload::AssetAction(AssetActionPayload {
                benefactor: None,
                beneficiary: addr(9),
                asset_id,
                amount: amount.into(),
                timestamp: 0,
            }),
        )
    }

    fn burn(asset_id: AssetId, amount: impl Into<Amount>) -> RawTransaction {
        RawTransaction::new(
            TxType::AssetBurn,
            TransactionPayload::AssetSupply(AssetSupplyPayload {
                asset_id,
                amount: amount.into(),
            }),
        )
    }

    #[test]
    fn test_transaction_amount_wins_over_supplied() {
        let mut raw = RawInteraction::new(addr(1)).with_transaction(transfer(asset(0xa), 5u64));
        raw.funds = vec![Fund::new(asset(0xa), 3u64), Fund::new(asset(0xb), 7u64)];

        let funds = consolidate_funds(&raw).unwrap();
        assert_eq!(
            funds,
            vec![Fund::new(asset(0xa), 5u64), Fund::new(asset(0xb), 7u64)]
        );
    }

    #[test]
    fn test_amounts_summed_in_first_appearance_order() {
        let raw = RawInteraction::new(addr(1))
            .with_transaction(transfer(asset(2), 1u64))
            .with_transaction(burn(asset(1), 10u64))
            .with_transaction(transfer(asset(2), 4u64));

        let funds = consolidate_funds(&raw).unwrap();
        assert_eq!(
            funds,
            vec![Fund::new(asset(2), 5u64), Fund::new(asset(1), 10u64)]
        );
    }

    #[test]
    fn test_mixed_width_merge() {
        let raw = RawInteraction::new(addr(1))
            .with_transaction(transfer(asset(1), u64::MAX))
            .with_transaction(burn(asset(1), U256::from(1)));

        let funds = consolidate_funds(&raw).unwrap();
        assert!(funds[0].amount.is_wide());
        assert_eq!(funds[0].amount.to_u256(), U256::from(u64::MAX) + U256::one());
    }

    #[test]
    fn test_other_types_imply_no_funds() {
        let raw = RawInteraction::new(addr(1)).with_transaction(RawTransaction::new(
            TxType::LogicInvoke,
            TransactionPayload::Logic(LogicPayload::default()),
        ));
        assert!(consolidate_funds(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_missing_payload() {
        let raw = RawInteraction::new(addr(1)).with_transaction(RawTransaction::bare(TxType::LogicDeploy));
        assert!(matches!(
            consolidate_funds(&raw),
            Err(CodecError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_mismatched_payload() {
        let raw = RawInteraction::new(addr(1)).with_transaction(RawTransaction::new(
            TxType::AssetBurn,
            TransactionPayload::Logic(LogicPayload::default()),
        ));
        assert!(matches!(
            consolidate_funds(&raw),
            Err(CodecError::InvalidArgument(_))
        ));
    }
}
