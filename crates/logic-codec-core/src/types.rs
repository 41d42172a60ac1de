//! Identifier types and prefixed-hex helpers.
//!
//! Addresses, asset ids and logic ids cross the API boundary as `0x`-prefixed
//! hex and are held internally as raw bytes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CodecError, Result};

/// The textual prefix carried by hex values at the boundary.
pub const HEX_PREFIX: &str = "0x";

/// Byte length of an address.
pub const ADDRESS_LEN: usize = 32;

/// Strip a leading `0x` (or `0X`) marker, if any.
pub fn trim_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Whether `s` is a `0x`-prefixed, even-length hex string.
pub fn is_prefixed_hex(s: &str) -> bool {
    if trim_hex_prefix(s).len() == s.len() {
        return false;
    }
    let digits = trim_hex_prefix(s);
    digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode hex with or without the `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(trim_hex_prefix(s))?)
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("{}{}", HEX_PREFIX, hex::encode(bytes))
}

macro_rules! impl_hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                <$ty>::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 32-byte participant address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero address, substituted when an interaction has no payer.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        encode_hex(self.0)
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = CodecError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        let arr: [u8; ADDRESS_LEN] = slice.try_into().map_err(|_| {
            CodecError::InvalidArgument(format!(
                "address must be {} bytes, got {}",
                ADDRESS_LEN,
                slice.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl_hex_serde!(Address);

/// An asset identifier: a discriminant prefix followed by the owning address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Vec<u8>);

/// A logic identifier: a discriminant prefix followed by the owning address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicId(Vec<u8>);

macro_rules! prefixed_id {
    ($ty:ident, $label:literal) => {
        impl $ty {
            /// Create from raw bytes.
            pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
                Self(bytes.into())
            }

            /// Build an id from a discriminant prefix and the owning address.
            pub fn from_parts(prefix: &[u8], owner: &Address) -> Self {
                let mut bytes = Vec::with_capacity(prefix.len() + ADDRESS_LEN);
                bytes.extend_from_slice(prefix);
                bytes.extend_from_slice(owner.as_bytes());
                Self(bytes)
            }

            /// Get the raw bytes.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Convert to `0x`-prefixed hex.
            pub fn to_hex(&self) -> String {
                encode_hex(&self.0)
            }

            /// Parse from hex, with or without the `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self> {
                Ok(Self(decode_hex(s)?))
            }

            /// Recover the embedded address by dropping `prefix_len` discriminant bytes.
            pub fn owner(&self, prefix_len: usize) -> Result<Address> {
                if self.0.len() != prefix_len + ADDRESS_LEN {
                    return Err(CodecError::InvalidArgument(format!(
                        "{} {} must be {} bytes, got {}",
                        $label,
                        self.to_hex(),
                        prefix_len + ADDRESS_LEN,
                        self.0.len()
                    )));
                }
                Address::try_from(&self.0[prefix_len..])
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.to_hex())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl AsRef<[u8]> for $ty {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl_hex_serde!($ty);
    };
}

prefixed_id!(AssetId, "asset id");
prefixed_id!(LogicId, "logic id");
