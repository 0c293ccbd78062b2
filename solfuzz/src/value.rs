//! Runtime values produced by the type handlers.

use alloy_primitives::Address;
use num_bigint::{BigInt, BigUint};
use std::fmt;

/// A generated or mutated argument value. Every value owns its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Bool(bool),
    Integer(IntValue),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Homogeneous sequence, used for both `T[]` and `T[N]`.
    Array(Vec<TypedValue>),
}

/// An integer of any Solidity width.
///
/// Widths 8, 16, 32 and 64 are stored natively, every other width goes
/// through `num-bigint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Uint(BigUint),
    Int(BigInt),
}

impl IntValue {
    pub fn to_bigint(&self) -> BigInt {
        match self {
            Self::U8(v) => BigInt::from(*v),
            Self::U16(v) => BigInt::from(*v),
            Self::U32(v) => BigInt::from(*v),
            Self::U64(v) => BigInt::from(*v),
            Self::I8(v) => BigInt::from(*v),
            Self::I16(v) => BigInt::from(*v),
            Self::I32(v) => BigInt::from(*v),
            Self::I64(v) => BigInt::from(*v),
            Self::Uint(v) => BigInt::from(v.clone()),
            Self::Int(v) => v.clone(),
        }
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}

impl TypedValue {
    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Address(_) => "address",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
        }
    }

    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Self::Integer(v) => Some(v.to_bigint()),
            _ => None,
        }
    }
}

impl From<IntValue> for TypedValue {
    fn from(value: IntValue) -> Self {
        Self::Integer(value)
    }
}
