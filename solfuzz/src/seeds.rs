//! Pre-configured seed values, keyed by canonical ABI type name.

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::abi::AbiType;

/// Maps a type name (`uint8`, `address`, `bytes32[2]`, ...) to an ordered list
/// of serialized seeds. Read-only while fuzzing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedPool(BTreeMap<String, Vec<String>>);

impl SeedPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `seeds` to the entries for `ty`, keeping insertion order.
    pub fn with_seeds<I, S>(mut self, ty: &AbiType, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(ty.to_string())
            .or_default()
            .extend(seeds.into_iter().map(Into::into));
        self
    }

    pub fn get(&self, ty: &AbiType) -> &[String] {
        self.0.get(&ty.to_string()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Picks one seed for `ty` uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, ty: &AbiType, rng: &mut R) -> Option<&str> {
        self.get(ty).choose(rng).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}
