//! Runtime values carried through the codec

use alloy_primitives::{Address, B256, I256, U256};
use std::fmt;

/// A decoded (or to-be-encoded) ABI value
///
/// Each variant pairs with one [`AbiType`](crate::AbiType) variant. Decoding
/// always yields the natural variant for the type; encoding additionally
/// accepts `Int` for unsigned types and `Uint` for signed ones when the value
/// fits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiValue {
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Address(Address),
    Hash(B256),
    FixedBytes(Vec<u8>),
    Uint(U256),
    Int(I256),
    Array(Vec<AbiValue>),
    FixedArray(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Short name of the variant, used in type mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Address(_) => "address",
            Self::Hash(_) => "hash",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Uint(_) => "unsigned integer",
            Self::Int(_) => "signed integer",
            Self::Array(_) => "array",
            Self::FixedArray(_) => "fixed array",
            Self::Tuple(_) => "tuple",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) | Self::FixedBytes(b) => Some(b),
            Self::Hash(h) => Some(h.as_slice()),
            _ => None,
        }
    }

    /// Elements of an array, fixed array or tuple
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            Self::Array(items) | Self::FixedArray(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Bytes(b) | Self::FixedBytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Address(a) => write!(f, "{}", a),
            Self::Hash(h) => write!(f, "{}", h),
            Self::Uint(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Array(items) | Self::FixedArray(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Self::Tuple(items) => {
                write!(f, "(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[AbiValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
