//! `bytesN` and dynamic `bytes`.
//!
//! Single bytes are mutated through a `uint8` handler, so a byte gets the
//! same wrapping arithmetic as any other integer.

use rand::{Rng, seq::IndexedRandom};

use super::{Mutator, int::IntHandler};
use crate::{
    constants::DYNAMIC_MAX_LEN,
    error::{FuzzError, Result},
    util::random_index,
    value::IntValue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesHandler {
    /// `Some(n)` for `bytesN`, `None` for dynamic `bytes`.
    size: Option<usize>,
    value: Vec<u8>,
}

impl BytesHandler {
    pub fn fixed(size: usize) -> Self {
        Self {
            size: Some(size),
            value: vec![0; size],
        }
    }

    pub fn dynamic() -> Self {
        Self {
            size: None,
            value: Vec::new(),
        }
    }

    fn type_name(&self) -> String {
        match self.size {
            Some(n) => format!("bytes{n}"),
            None => "bytes".to_string(),
        }
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn set_value(&mut self, value: Vec<u8>) -> Result<()> {
        self.check_size(value.len())?;
        self.value = value;
        Ok(())
    }

    fn check_size(&self, actual: usize) -> Result<()> {
        match self.size {
            Some(expected) if expected != actual => Err(FuzzError::SizeMismatch {
                ty: self.type_name(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = self
            .size
            .unwrap_or_else(|| rng.random_range(0..=DYNAMIC_MAX_LEN));
        self.value = (0..len).map(|_| rng.random()).collect();
    }

    pub fn mutators(&self) -> Vec<Mutator> {
        match (self.size, self.value.is_empty()) {
            (Some(_), true) => vec![],
            (Some(_), false) => vec![Mutator::MutateElement],
            (None, true) => vec![Mutator::AddElement],
            (None, false) => vec![
                Mutator::MutateElement,
                Mutator::AddElement,
                Mutator::RemoveElement,
            ],
        }
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, mutator: Mutator, rng: &mut R) {
        match mutator {
            Mutator::MutateElement => {
                let Some(idx) = random_index(rng, self.value.len()) else {
                    return;
                };
                let mut byte = IntHandler::new(false, 8);
                if byte.set_value(IntValue::U8(self.value[idx])).is_err() {
                    return;
                }
                if let Some(m) = byte.mutators().choose(rng) {
                    byte.mutate(*m, rng);
                }
                if let IntValue::U8(b) = byte.value() {
                    self.value[idx] = *b;
                }
            }
            Mutator::AddElement if self.size.is_none() => {
                let idx = rng.random_range(0..=self.value.len());
                let byte = rng.random();
                self.value.insert(idx, byte);
            }
            Mutator::RemoveElement if self.size.is_none() => {
                if let Some(idx) = random_index(rng, self.value.len()) {
                    self.value.remove(idx);
                }
            }
            _ => {}
        }
    }

    /// JSON byte array, e.g. `[1,2,255]`.
    pub fn serialize(&self) -> String {
        serde_json::Value::from(self.value.clone()).to_string()
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        let bytes: Vec<u8> = serde_json::from_str(text).map_err(|_| FuzzError::InvalidFormat {
            ty: self.type_name(),
            input: text.to_string(),
        })?;
        self.set_value(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn serializes_as_json_byte_array() {
        let mut h = BytesHandler::dynamic();
        h.deserialize("[0, 1, 255]").unwrap();
        assert_eq!(h.value(), &[0, 1, 255]);
        assert_eq!(h.serialize(), "[0,1,255]");
    }

    #[test]
    fn fixed_size_is_enforced() {
        let mut h = BytesHandler::fixed(2);
        assert_matches!(
            h.deserialize("[1,2,3]"),
            Err(FuzzError::SizeMismatch { expected: 2, actual: 3, .. })
        );
        assert_matches!(h.deserialize("[256,0]"), Err(FuzzError::InvalidFormat { .. }));
        assert_matches!(h.deserialize("0x0102"), Err(FuzzError::InvalidFormat { .. }));
        h.deserialize("[7,8]").unwrap();
    }

    #[test]
    fn empty_dynamic_bytes_only_grow() {
        let h = BytesHandler::dynamic();
        assert_eq!(h.mutators(), vec![Mutator::AddElement]);
    }

    #[test]
    fn mutations_respect_length_rules() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut fixed = BytesHandler::fixed(4);
        let mut dynamic = BytesHandler::dynamic();
        for _ in 0..200 {
            fixed.generate(&mut rng);
            dynamic.generate(&mut rng);
            assert!(dynamic.value().len() <= DYNAMIC_MAX_LEN);
            for m in fixed.mutators() {
                fixed.mutate(m, &mut rng);
                assert_eq!(fixed.value().len(), 4);
            }
            for m in dynamic.mutators() {
                let before = dynamic.value().len();
                dynamic.mutate(m, &mut rng);
                let after = dynamic.value().len();
                match m {
                    Mutator::AddElement => assert_eq!(after, before + 1),
                    Mutator::RemoveElement => assert_eq!(after, before - 1),
                    _ => assert_eq!(after, before),
                }
            }
        }
    }
}
