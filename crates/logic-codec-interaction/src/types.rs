//! Interaction enumerations and asset amounts.

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use logic_codec_core::{trim_hex_prefix, CodecError, Result, Value};

/// Access classification of an interaction participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum LockType {
    MutateLock = 0,
    ReadLock = 1,
    NoLock = 2,
}

impl LockType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LockType {
    type Error = CodecError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(LockType::MutateLock),
            1 => Ok(LockType::ReadLock),
            2 => Ok(LockType::NoLock),
            other => Err(CodecError::InvalidArgument(format!(
                "unknown lock type {}",
                other
            ))),
        }
    }
}

/// The kind of operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TxType {
    ParticipantCreate = 1,
    AssetTransfer = 2,
    AssetCreate = 3,
    AssetApprove = 4,
    AssetRevoke = 5,
    AssetMint = 6,
    AssetBurn = 7,
    LogicDeploy = 8,
    LogicInvoke = 9,
    LogicEnlist = 10,
}

impl TxType {
    /// Convert to the wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TxType::ParticipantCreate => "PARTICIPANT_CREATE",
            TxType::AssetTransfer => "ASSET_TRANSFER",
            TxType::AssetCreate => "ASSET_CREATE",
            TxType::AssetApprove => "ASSET_APPROVE",
            TxType::AssetRevoke => "ASSET_REVOKE",
            TxType::AssetMint => "ASSET_MINT",
            TxType::AssetBurn => "ASSET_BURN",
            TxType::LogicDeploy => "LOGIC_DEPLOY",
            TxType::LogicInvoke => "LOGIC_INVOKE",
            TxType::LogicEnlist => "LOGIC_ENLIST",
        }
    }

    /// Whether the transaction moves funds out of the sender.
    pub fn spends_funds(self) -> bool {
        matches!(self, TxType::AssetTransfer | TxType::AssetBurn)
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for TxType {
    type Error = CodecError;

    fn try_from(code: u8) -> Result<Self> {
        Ok(match code {
            1 => TxType::ParticipantCreate,
            2 => TxType::AssetTransfer,
            3 => TxType::AssetCreate,
            4 => TxType::AssetApprove,
            5 => TxType::AssetRevoke,
            6 => TxType::AssetMint,
            7 => TxType::AssetBurn,
            8 => TxType::LogicDeploy,
            9 => TxType::LogicInvoke,
            10 => TxType::LogicEnlist,
            other => {
                return Err(CodecError::InvalidArgument(format!(
                    "unsupported transaction type {}",
                    other
                )))
            }
        })
    }
}

/// An asset amount.
///
/// Amounts stay narrow until a merge overflows `u64` or meets a wide
/// operand. Equality and the wire form depend only on the magnitude.
#[derive(Debug, Clone, Copy)]
pub enum Amount {
    Small(u64),
    Wide(U256),
}

impl Amount {
    pub const ZERO: Amount = Amount::Small(0);

    pub fn is_wide(&self) -> bool {
        matches!(self, Amount::Wide(_))
    }

    pub fn to_u256(&self) -> U256 {
        match self {
            Amount::Small(n) => U256::from(*n),
            Amount::Wide(n) => *n,
        }
    }

    /// Add two amounts, promoting to wide arithmetic when either side is
    /// wide or the narrow sum overflows.
    pub fn checked_add(self, other: Amount) -> Result<Amount> {
        match (self, other) {
            (Amount::Small(a), Amount::Small(b)) => Ok(match a.checked_add(b) {
                Some(sum) => Amount::Small(sum),
                None => Amount::Wide(U256::from(a) + U256::from(b)),
            }),
            (a, b) => a
                .to_u256()
                .checked_add(b.to_u256())
                .map(Amount::Wide)
                .ok_or_else(|| CodecError::InvalidArgument("amount overflows 256 bits".into())),
        }
    }

    /// The wire value: always a bigint.
    pub fn to_value(&self) -> Value {
        Value::BigInt(self.to_u256())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Amount::Small(a), Amount::Small(b)) => a == b,
            (a, b) => a.to_u256() == b.to_u256(),
        }
    }
}

impl Eq for Amount {}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Amount::Small(n)
    }
}

impl From<U256> for Amount {
    fn from(n: U256) -> Self {
        Amount::Wide(n)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Small(n) => write!(f, "{}", n),
            Amount::Wide(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Amount {
    type Err = CodecError;

    /// Parse a decimal or `0x`-prefixed hex amount.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CodecError::InvalidArgument(format!("invalid amount '{}'", s));

        let digits = trim_hex_prefix(s);
        let wide = if digits.len() != s.len() {
            U256::from_str_radix(digits, 16).map_err(|_| invalid())?
        } else {
            if let Ok(n) = s.parse::<u64>() {
                return Ok(Amount::Small(n));
            }
            U256::from_dec_str(s).map_err(|_| invalid())?
        };

        if wide.bits() <= 64 {
            Ok(Amount::Small(wide.low_u64()))
        } else {
            Ok(Amount::Wide(wide))
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Amount::Small(n) => serializer.serialize_u64(*n),
            Amount::Wide(n) => serializer.serialize_str(&n.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum AmountRepr {
            Number(u64),
            Text(String),
        }

        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Number(n) => Ok(Amount::Small(n)),
            AmountRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_type_codes() {
        for code in 1..=10u8 {
            let ty = TxType::try_from(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert!(matches!(
            TxType::try_from(0),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(
            TxType::try_from(11),
            Err(CodecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tx_type_serde_names() {
        let json = serde_json::to_string(&TxType::AssetTransfer).unwrap();
        assert_eq!(json, "\"ASSET_TRANSFER\"");

        let ty: TxType = serde_json::from_str("\"LOGIC_INVOKE\"").unwrap();
        assert_eq!(ty, TxType::LogicInvoke);
        assert_eq!(ty.to_string(), "LOGIC_INVOKE");
    }

    #[test]
    fn test_lock_type() {
        assert_eq!(LockType::MutateLock.code(), 0);
        assert_eq!(LockType::ReadLock.code(), 1);
        assert_eq!(LockType::NoLock.code(), 2);
        assert_eq!(LockType::try_from(1).unwrap(), LockType::ReadLock);
        assert!(LockType::try_from(3).is_err());

        let lock: LockType = serde_json::from_str("\"READ_LOCK\"").unwrap();
        assert_eq!(lock, LockType::ReadLock);
    }

    #[test]
    fn test_small_addition() {
        let sum = Amount::from(2u64).checked_add(Amount::from(3u64)).unwrap();
        assert_eq!(sum, Amount::Small(5));
        assert!(!sum.is_wide());
    }

    #[test]
    fn test_overflow_promotes() {
        let sum = Amount::from(u64::MAX).checked_add(Amount::from(1u64)).unwrap();
        assert!(sum.is_wide());
        assert_eq!(sum.to_u256(), U256::from(u64::MAX) + U256::one());
    }

    #[test]
    fn test_wide_operand_promotes() {
        let sum = Amount::Wide(U256::from(2)).checked_add(Amount::Small(3)).unwrap();
        assert!(sum.is_wide());
        assert_eq!(sum, Amount::Small(5));
    }

    #[test]
    fn test_wide_overflow_rejected() {
        let result = Amount::Wide(U256::MAX).checked_add(Amount::Small(1));
        assert!(matches!(result, Err(CodecError::InvalidArgument(_))));
    }

    #[test]
    fn test_equal_magnitude_same_value() {
        assert_eq!(Amount::Small(7).to_value(), Amount::Wide(U256::from(7)).to_value());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!("42".parse::<Amount>().unwrap(), Amount::Small(42));
        assert_eq!("0x2a".parse::<Amount>().unwrap(), Amount::Small(42));

        let big: Amount = "340282366920938463463374607431768211456".parse().unwrap();
        assert!(big.is_wide());
        assert_eq!(big.to_u256(), U256::one() << 128);

        assert!("forty".parse::<Amount>().is_err());
    }

    #[test]
    fn test_amount_serde() {
        let small: Amount = serde_json::from_str("300").unwrap();
        assert_eq!(small, Amount::Small(300));

        let text: Amount = serde_json::from_str("\"0x012c\"").unwrap();
        assert_eq!(text, Amount::Small(300));

        let wide = Amount::Wide(U256::one() << 100);
        let json = serde_json::to_string(&wide).unwrap();
        assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), wide);
    }
}
