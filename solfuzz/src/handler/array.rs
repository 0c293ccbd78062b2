use rand::Rng;

use super::{HandlerContext, Mutator, TypeHandler};
use crate::{
    abi::AbiType,
    constants::DYNAMIC_MAX_LEN,
    error::{FuzzError, Result},
    seeds::SeedPool,
    util::random_index,
    value::TypedValue,
};

/// `T[N]` and `T[]`. Elements are owned handlers built from a template, so
/// nested arrays recurse without sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayHandler {
    elem: AbiType,
    /// `Some(n)` for `T[n]`, `None` for `T[]`.
    size: Option<usize>,
    template: Box<TypeHandler>,
    elements: Vec<TypeHandler>,
}

impl ArrayHandler {
    pub(super) fn new(elem: &AbiType, size: Option<usize>, ctx: &HandlerContext) -> Result<Self> {
        let template = TypeHandler::new(elem, ctx)?;
        let elements = vec![template.clone(); size.unwrap_or(0)];
        Ok(Self {
            elem: elem.clone(),
            size,
            template: Box::new(template),
            elements,
        })
    }

    pub fn abi_type(&self) -> AbiType {
        let elem = Box::new(self.elem.clone());
        match self.size {
            Some(n) => AbiType::FixedArray(elem, n),
            None => AbiType::Array(elem),
        }
    }

    pub fn value(&self) -> TypedValue {
        TypedValue::Array(self.elements.iter().map(TypeHandler::value).collect())
    }

    pub fn into_value(self) -> TypedValue {
        TypedValue::Array(
            self.elements
                .into_iter()
                .map(TypeHandler::into_value)
                .collect(),
        )
    }

    fn check_size(&self, actual: usize) -> Result<()> {
        match self.size {
            Some(expected) if expected != actual => Err(FuzzError::SizeMismatch {
                ty: self.abi_type().to_string(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }

    fn fresh_len<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.size
            .unwrap_or_else(|| rng.random_range(0..=DYNAMIC_MAX_LEN))
    }

    pub fn set_value(&mut self, values: Vec<TypedValue>) -> Result<()> {
        self.check_size(values.len())?;
        self.elements = values
            .into_iter()
            .map(|v| {
                let mut h = (*self.template).clone();
                h.set_value(v)?;
                Ok(h)
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = self.fresh_len(rng);
        self.elements = (0..len)
            .map(|_| {
                let mut h = (*self.template).clone();
                h.generate(&mut *rng);
                h
            })
            .collect();
    }

    /// Seeds every element on its own, generating the ones whose type has no
    /// pool entry.
    pub(super) fn seed_elements<R: Rng + ?Sized>(
        &mut self,
        pool: &SeedPool,
        rng: &mut R,
    ) -> Result<()> {
        let len = self.fresh_len(rng);
        let mut elements = Vec::with_capacity(len);
        for _ in 0..len {
            let mut h = (*self.template).clone();
            h.seed_or_generate(pool, rng)?;
            elements.push(h);
        }
        self.elements = elements;
        Ok(())
    }

    pub fn mutators(&self) -> Vec<Mutator> {
        match (self.size, self.elements.is_empty()) {
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
                if let Some(idx) = random_index(rng, self.elements.len()) {
                    self.elements[idx].mutate_random(rng);
                }
            }
            Mutator::AddElement if self.size.is_none() => {
                let idx = rng.random_range(0..=self.elements.len());
                let mut h = (*self.template).clone();
                h.generate(rng);
                self.elements.insert(idx, h);
            }
            Mutator::RemoveElement if self.size.is_none() => {
                if let Some(idx) = random_index(rng, self.elements.len()) {
                    self.elements.remove(idx);
                }
            }
            _ => {}
        }
    }

    /// JSON array of the elements' own serializations.
    pub fn serialize(&self) -> String {
        let items: Vec<serde_json::Value> = self
            .elements
            .iter()
            .map(|e| serde_json::Value::String(e.serialize()))
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    pub fn deserialize(&mut self, text: &str) -> Result<()> {
        let items: Vec<String> =
            serde_json::from_str(text).map_err(|_| FuzzError::InvalidFormat {
                ty: self.abi_type().to_string(),
                input: text.to_string(),
            })?;
        self.check_size(items.len())?;
        self.elements = items
            .iter()
            .map(|item| {
                let mut h = (*self.template).clone();
                h.deserialize(item)?;
                Ok(h)
            })
            .collect::<Result<_>>()?;
        Ok(())
    }
}
