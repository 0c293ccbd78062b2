//! Per-ABI-type value generation, mutation and serialization.
//!
//! A [`TypeHandler`] is a single-use value container for one [`AbiType`]. It is
//! a closed set of variants, one per supported kind, each with its own payload
//! and mutator table:
//!
//! ```
//! use rand::{SeedableRng, rngs::StdRng};
//! use solfuzz::{abi::AbiType, handler::{HandlerContext, TypeHandler}};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let ty: AbiType = "uint8[3]".parse().unwrap();
//! let mut handler = TypeHandler::new(&ty, &HandlerContext::default()).unwrap();
//! handler.generate(&mut rng);
//! handler.mutate_random(&mut rng);
//! let text = handler.serialize();
//! handler.deserialize(&text).unwrap();
//! ```
//!
//! Handlers never touch global state: every random draw comes from the RNG
//! the caller passes in.

pub mod address;
pub mod array;
pub mod boolean;
pub mod bytes;
pub mod int;
pub mod string;

use alloy_primitives::Address;
use rand::{Rng, seq::IndexedRandom};
use std::{fmt, sync::Arc};

use crate::{
    abi::{AbiType, is_fixed_bytes_width, is_int_width},
    error::{FuzzError, Result},
    seeds::SeedPool,
    value::TypedValue,
};
use address::AddressHandler;
use array::ArrayHandler;
use boolean::BoolHandler;
use bytes::BytesHandler;
use int::IntHandler;
use string::StringHandler;

/// Environment shared by the handlers of one call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerContext {
    /// Candidate values for `address` parameters.
    pub addresses: Arc<[Address]>,
}

impl HandlerContext {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
        }
    }
}

/// A zero-argument, in-place mutation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutator {
    Not,
    SafeAdd,
    SafeSub,
    SafeMul,
    SafeDiv,
    NotOp,
    ChooseAgain,
    MutateElement,
    AddElement,
    RemoveElement,
    ChangeCharacter,
    AddCharacter,
    RemoveCharacter,
}

impl Mutator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::SafeAdd => "safe_add",
            Self::SafeSub => "safe_sub",
            Self::SafeMul => "safe_mul",
            Self::SafeDiv => "safe_div",
            Self::NotOp => "not_op",
            Self::ChooseAgain => "choose_again",
            Self::MutateElement => "mutate_element",
            Self::AddElement => "add_element",
            Self::RemoveElement => "remove_element",
            Self::ChangeCharacter => "change_character",
            Self::AddCharacter => "add_character",
            Self::RemoveCharacter => "remove_character",
        }
    }
}

impl fmt::Display for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHandler {
    Bool(BoolHandler),
    Int(IntHandler),
    Address(AddressHandler),
    FixedBytes(BytesHandler),
    Bytes(BytesHandler),
    String(StringHandler),
    FixedArray(ArrayHandler),
    Slice(ArrayHandler),
}

impl TypeHandler {
    /// Builds the handler for `ty`, holding a zero value.
    ///
    /// Widths that Solidity does not define are unsupported, whichever way
    /// the descriptor was built.
    pub fn new(ty: &AbiType, ctx: &HandlerContext) -> Result<Self> {
        Ok(match ty {
            AbiType::Int(bits) | AbiType::Uint(bits) if !is_int_width(*bits) => {
                return Err(FuzzError::UnsupportedType(ty.to_string()));
            }
            AbiType::FixedBytes(n) if !is_fixed_bytes_width(*n) => {
                return Err(FuzzError::UnsupportedType(ty.to_string()));
            }
            AbiType::Bool => Self::Bool(BoolHandler::default()),
            AbiType::Int(bits) => Self::Int(IntHandler::new(true, *bits)),
            AbiType::Uint(bits) => Self::Int(IntHandler::new(false, *bits)),
            AbiType::Address => Self::Address(AddressHandler::new(ctx.addresses.clone())),
            AbiType::FixedBytes(n) => Self::FixedBytes(BytesHandler::fixed(*n)),
            AbiType::Bytes => Self::Bytes(BytesHandler::dynamic()),
            AbiType::String => Self::String(StringHandler::default()),
            AbiType::FixedArray(elem, n) => Self::FixedArray(ArrayHandler::new(elem, Some(*n), ctx)?),
            AbiType::Array(elem) => Self::Slice(ArrayHandler::new(elem, None, ctx)?),
            AbiType::Tuple(_) | AbiType::Function => {
                return Err(FuzzError::UnsupportedType(ty.to_string()));
            }
        })
    }

    pub fn abi_type(&self) -> AbiType {
        match self {
            Self::Bool(_) => AbiType::Bool,
            Self::Int(h) => h.abi_type(),
            Self::Address(_) => AbiType::Address,
            Self::FixedBytes(h) => AbiType::FixedBytes(h.value().len()),
            Self::Bytes(_) => AbiType::Bytes,
            Self::String(_) => AbiType::String,
            Self::FixedArray(h) | Self::Slice(h) => h.abi_type(),
        }
    }

    /// Replaces the held value with a uniform draw from the type's domain.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            Self::Bool(h) => h.generate(rng),
            Self::Int(h) => h.generate(rng),
            Self::Address(h) => h.generate(rng),
            Self::FixedBytes(h) | Self::Bytes(h) => h.generate(rng),
            Self::String(h) => h.generate(rng),
            Self::FixedArray(h) | Self::Slice(h) => h.generate(rng),
        }
    }

    /// Mutators applicable to the current value, in a fixed order.
    ///
    /// Empty dynamic collections only offer the operators that grow them.
    pub fn mutators(&self) -> Vec<Mutator> {
        match self {
            Self::Bool(h) => h.mutators(),
            Self::Int(h) => h.mutators(),
            Self::Address(h) => h.mutators(),
            Self::FixedBytes(h) | Self::Bytes(h) => h.mutators(),
            Self::String(h) => h.mutators(),
            Self::FixedArray(h) | Self::Slice(h) => h.mutators(),
        }
    }

    /// Applies `mutator` in place. Operators that do not apply to this type
    /// leave the value untouched.
    pub fn mutate<R: Rng + ?Sized>(&mut self, mutator: Mutator, rng: &mut R) {
        match self {
            Self::Bool(h) => h.mutate(mutator),
            Self::Int(h) => h.mutate(mutator, rng),
            Self::Address(h) => h.mutate(mutator, rng),
            Self::FixedBytes(h) | Self::Bytes(h) => h.mutate(mutator, rng),
            Self::String(h) => h.mutate(mutator, rng),
            Self::FixedArray(h) | Self::Slice(h) => h.mutate(mutator, rng),
        }
    }

    /// Picks one of [`Self::mutators`] uniformly and applies it.
    pub fn mutate_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Mutator> {
        let mutator = *self.mutators().choose(rng)?;
        self.mutate(mutator, rng);
        Some(mutator)
    }

    pub fn serialize(&self) -> String {
        match self {
            Self::Bool(h) => h.serialize(),
            Self::Int(h) => h.serialize(),
            Self::Address(h) => h.serialize(),
            Self::FixedBytes(h) | Self::Bytes(h) => h.serialize(),
            Self::String(h) => h.serialize(),
            Self::FixedArray(h) | Self::Slice(h) => h.serialize(),
        }
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        match self {
            Self::Bool(h) => h.deserialize(text),
            Self::Int(h) => h.deserialize(text),
            Self::Address(h) => h.deserialize(text),
            Self::FixedBytes(h) | Self::Bytes(h) => h.deserialize(text),
            Self::String(h) => h.deserialize(text),
            Self::FixedArray(h) | Self::Slice(h) => h.deserialize(text),
        }
    }

    /// Loads a seed for this exact type from `pool`.
    ///
    /// Scalars fail with [`FuzzError::NoSeeds`] when the pool has nothing for
    /// their type. Arrays without an exact entry seed each element
    /// independently instead.
    pub fn load_seed_from_pool<R: Rng + ?Sized>(
        &mut self,
        pool: &SeedPool,
        rng: &mut R,
    ) -> Result<()> {
        let ty = self.abi_type();
        if let Some(seed) = pool.pick(&ty, rng) {
            return self.deserialize(seed);
        }
        match self {
            Self::FixedArray(h) | Self::Slice(h) => h.seed_elements(pool, rng),
            _ => Err(FuzzError::NoSeeds(ty.to_string())),
        }
    }

    /// [`Self::load_seed_from_pool`], falling back to [`Self::generate`] when
    /// the pool has no entry for the type.
    pub fn seed_or_generate<R: Rng + ?Sized>(&mut self, pool: &SeedPool, rng: &mut R) -> Result<()> {
        match self.load_seed_from_pool(pool, rng) {
            Err(FuzzError::NoSeeds(_)) => {
                self.generate(rng);
                Ok(())
            }
            other => other,
        }
    }

    pub fn value(&self) -> TypedValue {
        match self {
            Self::Bool(h) => TypedValue::Bool(h.value()),
            Self::Int(h) => TypedValue::Integer(h.value().clone()),
            Self::Address(h) => TypedValue::Address(h.value()),
            Self::FixedBytes(h) => TypedValue::FixedBytes(h.value().to_vec()),
            Self::Bytes(h) => TypedValue::Bytes(h.value().to_vec()),
            Self::String(h) => TypedValue::String(h.value().to_string()),
            Self::FixedArray(h) | Self::Slice(h) => h.value(),
        }
    }

    pub fn into_value(self) -> TypedValue {
        match self {
            Self::Bool(h) => TypedValue::Bool(h.value()),
            Self::Int(h) => TypedValue::Integer(h.into_value()),
            Self::Address(h) => TypedValue::Address(h.value()),
            Self::FixedBytes(h) => TypedValue::FixedBytes(h.into_value()),
            Self::Bytes(h) => TypedValue::Bytes(h.into_value()),
            Self::String(h) => TypedValue::String(h.into_value()),
            Self::FixedArray(h) | Self::Slice(h) => h.into_value(),
        }
    }

    /// Replaces the held value, checking that it fits the handler's type.
    pub fn set_value(&mut self, value: TypedValue) -> Result<()> {
        match (self, value) {
            (Self::Bool(h), TypedValue::Bool(v)) => {
                h.set_value(v);
                Ok(())
            }
            (Self::Int(h), TypedValue::Integer(v)) => h.set_value(v),
            (Self::Address(h), TypedValue::Address(v)) => {
                h.set_value(v);
                Ok(())
            }
            (Self::FixedBytes(h), TypedValue::FixedBytes(v)) => h.set_value(v),
            (Self::Bytes(h), TypedValue::Bytes(v)) => h.set_value(v),
            (Self::String(h), TypedValue::String(v)) => {
                h.set_value(v);
                Ok(())
            }
            (Self::FixedArray(h) | Self::Slice(h), TypedValue::Array(v)) => h.set_value(v),
            (this, value) => Err(FuzzError::TypeMismatch {
                expected: this.abi_type().to_string(),
                found: value.kind().to_string(),
            }),
        }
    }
}
