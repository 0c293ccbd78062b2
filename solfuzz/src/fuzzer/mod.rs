//! Fuzzing strategies. Each call produces one argument tuple for one target
//! function; no fuzzer keeps state between calls or retries on failure.

pub mod blackbox;
pub mod greybox;
pub mod leader;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::{FuzzError, Result},
    value::TypedValue,
};

pub use blackbox::Blackbox;
pub use greybox::{DirectedGreybox, Greybox};
pub use leader::FuzzerLeader;

pub trait Fuzzer: Send + Sync {
    fn fuzzing_type(&self) -> FuzzingType;

    /// One value per parameter of `function_id`. Any failing parameter fails
    /// the whole tuple.
    fn generate_args(&self, function_id: &str, rng: &mut dyn RngCore) -> Result<Vec<TypedValue>>;

    /// `batch_size` independent tuples; the first failure aborts the batch.
    fn generate_batch(
        &self,
        function_id: &str,
        batch_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vec<TypedValue>>> {
        let mut batch = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            batch.push(self.generate_args(function_id, rng)?);
        }
        Ok(batch)
    }
}

/// The fuzzing mode configured on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzingType {
    Blackbox,
    Greybox,
    DirectedGreybox,
}

impl FuzzingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blackbox => "blackbox",
            Self::Greybox => "greybox",
            Self::DirectedGreybox => "directed_greybox",
        }
    }
}

impl fmt::Display for FuzzingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuzzingType {
    type Err = FuzzError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blackbox" => Ok(Self::Blackbox),
            "greybox" => Ok(Self::Greybox),
            "directed_greybox" => Ok(Self::DirectedGreybox),
            _ => Err(FuzzError::FuzzerTypeNotFound(s.to_string())),
        }
    }
}
