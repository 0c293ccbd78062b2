//! Fuzzer configuration, usually loaded from a JSON file:
//!
//! ```json
//! {
//!   "seeds_size": 10,
//!   "seed_order": "ascending",
//!   "addresses": ["0x1111111111111111111111111111111111111111"],
//!   "seeds": { "uint8": ["0", "255"], "address": ["0x1111111111111111111111111111111111111111"] }
//! }
//! ```

use alloy_primitives::Address;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    constants::{DEFAULT_SEEDS_SIZE, MAX_SEEDS_SIZE},
    seeds::SeedPool,
    util::read_json,
};

/// Order in which scored history is ranked before the power schedule takes
/// the first `seeds_size` records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOrder {
    /// Lowest fitness delta first.
    #[default]
    Ascending,
    /// Highest fitness delta first.
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzerConfig {
    /// Number of seed tuples handed to the greybox fuzzers per request.
    pub seeds_size: usize,
    pub seed_order: SeedOrder,
    /// Deployer and agent accounts offered to `address` parameters.
    pub addresses: Vec<Address>,
    pub seeds: SeedPool,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        Self {
            seeds_size: DEFAULT_SEEDS_SIZE,
            seed_order: SeedOrder::default(),
            addresses: Vec::new(),
            seeds: SeedPool::default(),
        }
    }
}

impl FuzzerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.seeds_size > 0, "seeds_size must be at least 1");
        ensure!(
            self.seeds_size <= MAX_SEEDS_SIZE,
            "seeds_size must be at most {MAX_SEEDS_SIZE}, got {}",
            self.seeds_size
        );
        Ok(())
    }

    pub fn with_seeds_size(mut self, seeds_size: usize) -> Self {
        self.seeds_size = seeds_size.clamp(1, MAX_SEEDS_SIZE);
        self
    }

    pub fn with_seed_order(mut self, seed_order: SeedOrder) -> Self {
        self.seed_order = seed_order;
        self
    }

    pub fn with_addresses(mut self, addresses: impl IntoIterator<Item = Address>) -> Self {
        self.addresses.extend(addresses);
        self
    }

    pub fn with_seeds(mut self, seeds: SeedPool) -> Self {
        self.seeds = seeds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::AbiType;

    #[test]
    fn parses_json_config() {
        let config = FuzzerConfig::from_json(
            r#"{
                "seeds_size": 3,
                "seed_order": "descending",
                "addresses": ["0x1111111111111111111111111111111111111111"],
                "seeds": { "uint8": ["1", "2"] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.seeds_size, 3);
        assert_eq!(config.seed_order, SeedOrder::Descending);
        assert_eq!(config.addresses, vec![Address::repeat_byte(0x11)]);
        assert_eq!(config.seeds.get(&AbiType::Uint(8)), &["1", "2"]);
        assert!(config.seeds.get(&AbiType::Uint(16)).is_empty());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = FuzzerConfig::from_json("{}").unwrap();
        assert_eq!(config, FuzzerConfig::default());
        assert_eq!(config.seeds_size, DEFAULT_SEEDS_SIZE);
        assert!(config.seeds.is_empty());
    }

    #[test]
    fn zero_seeds_size_is_rejected() {
        assert!(FuzzerConfig::from_json(r#"{"seeds_size": 0}"#).is_err());
        assert_eq!(FuzzerConfig::default().with_seeds_size(0).seeds_size, 1);
    }

    #[test]
    fn oversized_seeds_size_is_rejected() {
        let json = format!(r#"{{"seeds_size": {}}}"#, usize::MAX);
        assert!(FuzzerConfig::from_json(&json).is_err());
        let json = format!(r#"{{"seeds_size": {}}}"#, MAX_SEEDS_SIZE + 1);
        assert!(FuzzerConfig::from_json(&json).is_err());
        let json = format!(r#"{{"seeds_size": {MAX_SEEDS_SIZE}}}"#);
        assert_eq!(FuzzerConfig::from_json(&json).unwrap().seeds_size, MAX_SEEDS_SIZE);
        assert_eq!(
            FuzzerConfig::default().with_seeds_size(usize::MAX).seeds_size,
            MAX_SEEDS_SIZE
        );
    }
}
