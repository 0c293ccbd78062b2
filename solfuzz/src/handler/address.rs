use alloy_primitives::Address;
use rand::{Rng, seq::IndexedRandom};
use std::{str::FromStr, sync::Arc};

use super::Mutator;
use crate::error::{FuzzError, Result};

/// Addresses are only ever drawn from a known candidate set (deployer,
/// agents, deployed contracts); an empty set yields the zero address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressHandler {
    candidates: Arc<[Address]>,
    value: Address,
}

impl AddressHandler {
    pub fn new(candidates: Arc<[Address]>) -> Self {
        Self {
            candidates,
            value: Address::ZERO,
        }
    }

    pub fn value(&self) -> Address {
        self.value
    }

    pub fn set_value(&mut self, value: Address) {
        self.value = value;
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.value = self.candidates.choose(rng).copied().unwrap_or(Address::ZERO);
    }

    pub fn mutators(&self) -> Vec<Mutator> {
        vec![Mutator::NotOp, Mutator::ChooseAgain]
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, mutator: Mutator, rng: &mut R) {
        // `NotOp` is the identity.
        if mutator == Mutator::ChooseAgain {
            self.generate(rng);
        }
    }

    pub fn serialize(&self) -> String {
        self.value.to_string()
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        self.value = Address::from_str(text).map_err(|_| FuzzError::InvalidFormat {
            ty: "address".to_string(),
            input: text.to_string(),
        })?;
        Ok(())
    }
}
