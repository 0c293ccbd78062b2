use rand::Rng;

use super::Mutator;
use crate::{
    constants::{STRING_MAX_LEN, STRING_MIN_LEN},
    error::Result,
    util::{char_offset, random_alpha_char, random_index},
};

/// UTF-8 strings, generated and mutated over [`crate::constants::ALPHABET`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringHandler {
    value: String,
}

impl StringHandler {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = rng.random_range(STRING_MIN_LEN..=STRING_MAX_LEN);
        self.value = (0..len).map(|_| random_alpha_char(&mut *rng)).collect();
    }

    pub fn mutators(&self) -> Vec<Mutator> {
        if self.value.is_empty() {
            vec![Mutator::AddCharacter]
        } else {
            vec![
                Mutator::ChangeCharacter,
                Mutator::AddCharacter,
                Mutator::RemoveCharacter,
            ]
        }
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, mutator: Mutator, rng: &mut R) {
        let len = self.value.chars().count();
        match mutator {
            Mutator::ChangeCharacter => {
                if let Some(n) = random_index(rng, len) {
                    let at = char_offset(&self.value, n);
                    self.value.remove(at);
                    self.value.insert(at, random_alpha_char(rng));
                }
            }
            Mutator::AddCharacter => {
                let at = char_offset(&self.value, rng.random_range(0..=len));
                self.value.insert(at, random_alpha_char(rng));
            }
            Mutator::RemoveCharacter => {
                if let Some(n) = random_index(rng, len) {
                    let at = char_offset(&self.value, n);
                    self.value.remove(at);
                }
            }
            _ => {}
        }
    }

    pub fn serialize(&self) -> String {
        self.value.clone()
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        self.value = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ALPHABET;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn generated_strings_are_alphabetic() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut h = StringHandler::default();
        for _ in 0..100 {
            h.generate(&mut rng);
            let len = h.value().len();
            assert!((STRING_MIN_LEN..=STRING_MAX_LEN).contains(&len));
            assert!(h.value().bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn mutates_multibyte_strings_on_char_boundaries() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut h = StringHandler::default();
        h.deserialize("héllo wörld").unwrap();
        for _ in 0..500 {
            let before = h.value().chars().count();
            let mutators = h.mutators();
            let m = mutators[rng.random_range(0..mutators.len())];
            h.mutate(m, &mut rng);
            let after = h.value().chars().count();
            match m {
                Mutator::AddCharacter => assert_eq!(after, before + 1),
                Mutator::RemoveCharacter => assert_eq!(after, before - 1),
                _ => assert_eq!(after, before),
            }
        }
    }

    #[test]
    fn empty_string_only_grows() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut h = StringHandler::default();
        assert_eq!(h.mutators(), vec![Mutator::AddCharacter]);
        h.mutate(Mutator::AddCharacter, &mut rng);
        assert_eq!(h.value().len(), 1);
    }
}
