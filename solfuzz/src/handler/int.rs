//! Signed and unsigned integers of every width from 8 to 256 bits.
//!
//! All arithmetic mutators wrap: the result of `a op b` is the low `bits` bits
//! of the unbounded result, re-biased into the signed domain for `intN`. This
//! keeps every mutated value inside `[min, max]` without discarding the
//! operand. Division by zero yields zero.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, PrimInt, WrappingAdd, WrappingMul, WrappingSub, Zero};
use rand::Rng;

use super::Mutator;
use crate::{
    abi::AbiType,
    error::{FuzzError, Result},
    value::IntValue,
};

/// Binary operation applied by the `safe_*` mutators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntHandler {
    signed: bool,
    bits: u16,
    value: IntValue,
}

fn wrapping_apply<T>(a: T, b: T, op: Arith) -> T
where
    T: PrimInt + WrappingAdd + WrappingSub + WrappingMul,
{
    match op {
        Arith::Add => a.wrapping_add(&b),
        Arith::Sub => a.wrapping_sub(&b),
        Arith::Mul => a.wrapping_mul(&b),
        Arith::Div => {
            if b.is_zero() {
                T::zero()
            } else {
                // Only `MIN / -1` overflows, and it wraps back to `MIN`.
                a.checked_div(&b).unwrap_or_else(T::min_value)
            }
        }
    }
}

fn modulus(bits: u16) -> BigUint {
    BigUint::one() << bits
}

/// Two's complement encoding of `v` in `bits` bits.
fn to_twos(v: &BigInt, bits: u16) -> BigUint {
    let m = BigInt::from(modulus(bits));
    let mut r = v % &m;
    if r.sign() == Sign::Minus {
        r += &m;
    }
    r.magnitude().clone()
}

fn from_twos(u: BigUint, bits: u16) -> BigInt {
    let half = BigUint::one() << (bits - 1);
    if u >= half {
        BigInt::from(u) - BigInt::from(modulus(bits))
    } else {
        BigInt::from(u)
    }
}

fn unsigned_apply(a: &BigUint, b: &BigUint, op: Arith, bits: u16) -> BigUint {
    let m = modulus(bits);
    match op {
        Arith::Add => (a + b) % &m,
        Arith::Sub => (a + &m - (b % &m)) % &m,
        Arith::Mul => (a * b) % &m,
        Arith::Div => {
            if b.is_zero() {
                BigUint::zero()
            } else {
                a / b
            }
        }
    }
}

fn signed_apply(a: &BigInt, b: &BigInt, op: Arith, bits: u16) -> BigInt {
    match op {
        Arith::Div => {
            if b.is_zero() {
                BigInt::zero()
            } else {
                // Truncating division; `MIN / -1` wraps through the re-bias.
                from_twos(to_twos(&(a / b), bits), bits)
            }
        }
        _ => {
            let r = unsigned_apply(&to_twos(a, bits), &to_twos(b, bits), op, bits);
            from_twos(r, bits)
        }
    }
}

fn random_biguint<R: Rng + ?Sized>(bits: u16, rng: &mut R) -> BigUint {
    let mut bytes = vec![0u8; usize::from(bits).div_ceil(8)];
    rng.fill(bytes.as_mut_slice());
    BigUint::from_bytes_le(&bytes) % modulus(bits)
}

impl IntValue {
    /// Applies `op` against an operand of the same representation, `None`
    /// when the representations differ.
    pub(crate) fn combine(&self, op: Arith, rhs: &Self, bits: u16) -> Option<Self> {
        Some(match (self, rhs) {
            (Self::U8(a), Self::U8(b)) => Self::U8(wrapping_apply(*a, *b, op)),
            (Self::U16(a), Self::U16(b)) => Self::U16(wrapping_apply(*a, *b, op)),
            (Self::U32(a), Self::U32(b)) => Self::U32(wrapping_apply(*a, *b, op)),
            (Self::U64(a), Self::U64(b)) => Self::U64(wrapping_apply(*a, *b, op)),
            (Self::I8(a), Self::I8(b)) => Self::I8(wrapping_apply(*a, *b, op)),
            (Self::I16(a), Self::I16(b)) => Self::I16(wrapping_apply(*a, *b, op)),
            (Self::I32(a), Self::I32(b)) => Self::I32(wrapping_apply(*a, *b, op)),
            (Self::I64(a), Self::I64(b)) => Self::I64(wrapping_apply(*a, *b, op)),
            (Self::Uint(a), Self::Uint(b)) => Self::Uint(unsigned_apply(a, b, op, bits)),
            (Self::Int(a), Self::Int(b)) => Self::Int(signed_apply(a, b, op, bits)),
            _ => return None,
        })
    }
}

impl IntHandler {
    pub fn new(signed: bool, bits: u16) -> Self {
        let value = match (signed, bits) {
            (false, 8) => IntValue::U8(0),
            (false, 16) => IntValue::U16(0),
            (false, 32) => IntValue::U32(0),
            (false, 64) => IntValue::U64(0),
            (true, 8) => IntValue::I8(0),
            (true, 16) => IntValue::I16(0),
            (true, 32) => IntValue::I32(0),
            (true, 64) => IntValue::I64(0),
            (false, _) => IntValue::Uint(BigUint::zero()),
            (true, _) => IntValue::Int(BigInt::zero()),
        };
        Self { signed, bits, value }
    }

    pub fn abi_type(&self) -> AbiType {
        if self.signed {
            AbiType::Int(self.bits)
        } else {
            AbiType::Uint(self.bits)
        }
    }

    /// Smallest value of the domain, inclusive.
    pub fn min(&self) -> BigInt {
        if self.signed {
            -(BigInt::one() << (self.bits - 1))
        } else {
            BigInt::zero()
        }
    }

    /// Largest value of the domain, inclusive.
    pub fn max(&self) -> BigInt {
        let width = if self.signed { self.bits - 1 } else { self.bits };
        (BigInt::one() << width) - 1
    }

    pub fn value(&self) -> &IntValue {
        &self.value
    }

    pub fn into_value(self) -> IntValue {
        self.value
    }

    /// A uniform value of the same type, leaving the handler untouched.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> IntValue {
        match &self.value {
            IntValue::U8(_) => IntValue::U8(rng.random()),
            IntValue::U16(_) => IntValue::U16(rng.random()),
            IntValue::U32(_) => IntValue::U32(rng.random()),
            IntValue::U64(_) => IntValue::U64(rng.random()),
            IntValue::I8(_) => IntValue::I8(rng.random()),
            IntValue::I16(_) => IntValue::I16(rng.random()),
            IntValue::I32(_) => IntValue::I32(rng.random()),
            IntValue::I64(_) => IntValue::I64(rng.random()),
            IntValue::Uint(_) => IntValue::Uint(random_biguint(self.bits, rng)),
            IntValue::Int(_) => {
                IntValue::Int(from_twos(random_biguint(self.bits, rng), self.bits))
            }
        }
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.value = self.draw(rng);
    }

    pub fn mutators(&self) -> Vec<Mutator> {
        vec![
            Mutator::SafeAdd,
            Mutator::SafeSub,
            Mutator::SafeMul,
            Mutator::SafeDiv,
        ]
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, mutator: Mutator, rng: &mut R) {
        let op = match mutator {
            Mutator::SafeAdd => Arith::Add,
            Mutator::SafeSub => Arith::Sub,
            Mutator::SafeMul => Arith::Mul,
            Mutator::SafeDiv => Arith::Div,
            _ => return,
        };
        let operand = self.draw(rng);
        if let Some(next) = self.value.combine(op, &operand, self.bits) {
            self.value = next;
        }
    }

    /// Applies `op` against a caller-chosen operand of the same type.
    #[cfg(test)]
    pub(crate) fn apply(&mut self, op: Arith, operand: &IntValue) -> Result<()> {
        let next = self
            .value
            .combine(op, operand, self.bits)
            .ok_or_else(|| self.mismatch(operand))?;
        self.value = next;
        Ok(())
    }

    pub fn serialize(&self) -> String {
        self.value.to_string()
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        let parsed = text
            .parse::<BigInt>()
            .map_err(|_| FuzzError::InvalidFormat {
                ty: self.abi_type().to_string(),
                input: text.to_string(),
            })?;
        self.value = self.from_bigint(parsed)?;
        Ok(())
    }

    pub fn set_value(&mut self, value: IntValue) -> Result<()> {
        if std::mem::discriminant(&value) != std::mem::discriminant(&self.value) {
            return Err(self.mismatch(&value));
        }
        // Big representations carry no width of their own.
        if matches!(value, IntValue::Uint(_) | IntValue::Int(_)) {
            self.check_range(&value.to_bigint())?;
        }
        self.value = value;
        Ok(())
    }

    fn check_range(&self, v: &BigInt) -> Result<()> {
        if *v < self.min() || *v > self.max() {
            return Err(FuzzError::OutOfRange {
                ty: self.abi_type().to_string(),
                value: v.to_string(),
            });
        }
        Ok(())
    }

    fn from_bigint(&self, v: BigInt) -> Result<IntValue> {
        self.check_range(&v)?;
        let out_of_range = || FuzzError::OutOfRange {
            ty: self.abi_type().to_string(),
            value: v.to_string(),
        };
        Ok(match &self.value {
            IntValue::U8(_) => IntValue::U8(u8::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::U16(_) => IntValue::U16(u16::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::U32(_) => IntValue::U32(u32::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::U64(_) => IntValue::U64(u64::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::I8(_) => IntValue::I8(i8::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::I16(_) => IntValue::I16(i16::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::I32(_) => IntValue::I32(i32::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::I64(_) => IntValue::I64(i64::try_from(&v).map_err(|_| out_of_range())?),
            IntValue::Uint(_) => IntValue::Uint(v.to_biguint().ok_or_else(out_of_range)?),
            IntValue::Int(_) => IntValue::Int(v.clone()),
        })
    }

    fn mismatch(&self, found: &IntValue) -> FuzzError {
        FuzzError::TypeMismatch {
            expected: self.abi_type().to_string(),
            found: format!("integer {found:?}"),
        }
    }
}
