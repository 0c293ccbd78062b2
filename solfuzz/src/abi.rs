//! Solidity parameter type descriptors.
//!
//! An [`AbiType`] is handed to the fuzzer already parsed; the [`FromStr`] and
//! [`fmt::Display`] implementations only deal with canonical type names such as
//! `uint256`, `bytes32` or `address[3][]`, which double as seed pool keys.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{FuzzError, Result};

/// The type of a single contract function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AbiType {
    Bool,
    /// Signed integer of the given bit width (8..=256, multiple of 8).
    Int(u16),
    /// Unsigned integer of the given bit width (8..=256, multiple of 8).
    Uint(u16),
    Address,
    /// `bytesN` with `1 <= N <= 32`.
    FixedBytes(usize),
    Bytes,
    String,
    /// Dynamic-length array, `T[]`.
    Array(Box<AbiType>),
    /// Fixed-length array, `T[N]`.
    FixedArray(Box<AbiType>, usize),
    /// Parsed but not fuzzable.
    Tuple(Vec<AbiType>),
    /// Parsed but not fuzzable.
    Function,
}

/// Solidity integer widths: 8 to 256 bits in steps of 8.
pub(crate) fn is_int_width(bits: u16) -> bool {
    (8..=256).contains(&bits) && bits % 8 == 0
}

/// Widths of `bytesN`.
pub(crate) fn is_fixed_bytes_width(n: usize) -> bool {
    (1..=32).contains(&n)
}

fn invalid(input: &str) -> FuzzError {
    FuzzError::InvalidFormat {
        ty: "abi type".to_string(),
        input: input.to_string(),
    }
}

fn parse_bits(bits: &str, input: &str) -> Result<u16> {
    if bits.is_empty() {
        return Ok(256);
    }
    match bits.parse::<u16>() {
        Ok(b) if is_int_width(b) => Ok(b),
        _ => Err(invalid(input)),
    }
}

/// Splits a tuple body at its top-level commas.
fn split_components(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

impl FromStr for AbiType {
    type Err = FuzzError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(stripped) = s.strip_suffix(']') {
            let open = stripped.rfind('[').ok_or_else(|| invalid(s))?;
            let elem = Box::new(stripped[..open].parse::<Self>()?);
            let size = &stripped[open + 1..];
            if size.is_empty() {
                return Ok(Self::Array(elem));
            }
            let size = size.parse::<usize>().map_err(|_| invalid(s))?;
            return Ok(Self::FixedArray(elem, size));
        }

        if let Some(body) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            if body.trim().is_empty() {
                return Ok(Self::Tuple(vec![]));
            }
            let components = split_components(body)
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::Tuple(components));
        }

        match s {
            "bool" => Ok(Self::Bool),
            "address" => Ok(Self::Address),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            "function" => Ok(Self::Function),
            _ => {
                if let Some(bits) = s.strip_prefix("uint") {
                    Ok(Self::Uint(parse_bits(bits, s)?))
                } else if let Some(bits) = s.strip_prefix("int") {
                    Ok(Self::Int(parse_bits(bits, s)?))
                } else if let Some(size) = s.strip_prefix("bytes") {
                    match size.parse::<usize>() {
                        Ok(n) if is_fixed_bytes_width(n) => Ok(Self::FixedBytes(n)),
                        _ => Err(invalid(s)),
                    }
                } else {
                    Err(invalid(s))
                }
            }
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Address => f.write_str("address"),
            Self::FixedBytes(n) => write!(f, "bytes{n}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Array(elem) => write!(f, "{elem}[]"),
            Self::FixedArray(elem, n) => write!(f, "{elem}[{n}]"),
            Self::Tuple(components) => {
                f.write_str("(")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str(")")
            }
            Self::Function => f.write_str("function"),
        }
    }
}

impl TryFrom<String> for AbiType {
    type Error = FuzzError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AbiType> for String {
    fn from(value: AbiType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_scalar_types() {
        assert_eq!("bool".parse::<AbiType>().unwrap(), AbiType::Bool);
        assert_eq!("uint".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("int24".parse::<AbiType>().unwrap(), AbiType::Int(24));
        assert_eq!("uint8".parse::<AbiType>().unwrap(), AbiType::Uint(8));
        assert_eq!("bytes32".parse::<AbiType>().unwrap(), AbiType::FixedBytes(32));
        assert_eq!("bytes".parse::<AbiType>().unwrap(), AbiType::Bytes);
    }

    #[test]
    fn parses_nested_arrays_right_to_left() {
        let ty: AbiType = "address[3][]".parse().unwrap();
        assert_eq!(
            ty,
            AbiType::Array(Box::new(AbiType::FixedArray(Box::new(AbiType::Address), 3)))
        );
        assert_eq!(ty.to_string(), "address[3][]");
    }

    #[test]
    fn parses_tuples() {
        let ty: AbiType = "(uint8,(bool,string)[])".parse().unwrap();
        assert_eq!(
            ty,
            AbiType::Tuple(vec![
                AbiType::Uint(8),
                AbiType::Array(Box::new(AbiType::Tuple(vec![AbiType::Bool, AbiType::String]))),
            ])
        );
        assert_eq!(ty.to_string(), "(uint8,(bool,string)[])");
    }

    #[test]
    fn rejects_invalid_widths() {
        assert_matches!("uint7".parse::<AbiType>(), Err(FuzzError::InvalidFormat { .. }));
        assert_matches!("int264".parse::<AbiType>(), Err(FuzzError::InvalidFormat { .. }));
        assert_matches!("bytes33".parse::<AbiType>(), Err(FuzzError::InvalidFormat { .. }));
        assert_matches!("bytes0".parse::<AbiType>(), Err(FuzzError::InvalidFormat { .. }));
        assert_matches!("uint8[x]".parse::<AbiType>(), Err(FuzzError::InvalidFormat { .. }));
        assert_matches!("float".parse::<AbiType>(), Err(FuzzError::InvalidFormat { .. }));
    }

    #[test]
    fn serde_uses_type_names() {
        let tys: Vec<AbiType> = serde_json::from_str(r#"["uint16","bytes[]"]"#).unwrap();
        assert_eq!(tys, vec![AbiType::Uint(16), AbiType::Array(Box::new(AbiType::Bytes))]);
        assert_eq!(serde_json::to_string(&tys).unwrap(), r#"["uint16","bytes[]"]"#);
    }
}
