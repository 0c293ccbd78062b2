use rand::Rng;

use super::Mutator;
use crate::error::{FuzzError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolHandler {
    value: bool,
}

impl BoolHandler {
    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.value = rng.random();
    }

    pub fn mutators(&self) -> Vec<Mutator> {
        vec![Mutator::Not]
    }

    pub fn mutate(&mut self, mutator: Mutator) {
        if mutator == Mutator::Not {
            self.value = !self.value;
        }
    }

    pub fn serialize(&self) -> String {
        self.value.to_string()
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        self.value = match text {
            "true" => true,
            "false" => false,
            _ => {
                return Err(FuzzError::InvalidFormat {
                    ty: "bool".to_string(),
                    input: text.to_string(),
                });
            }
        };
        Ok(())
    }
}
