//! Interfaces to the collaborators that own contracts, functions and past
//! executions. The core only ever reads through them.

pub mod memory;

use alloy_primitives::Address;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::abi::AbiType;

/// One method of a contract ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiMethod {
    pub name: String,
    pub inputs: Vec<AbiType>,
}

impl AbiMethod {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiType>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// `name(type,...)`, used to tell overloads apart.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, inputs.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub id: String,
    /// Deployed address, if the contract has been deployed.
    #[serde(default)]
    pub address: Option<Address>,
    pub abi: Vec<AbiMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: String,
    pub contract_id: String,
    /// Method name or full signature within the contract ABI.
    pub method: String,
}

/// A finished transaction, scored by the execution analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub function_id: String,
    /// One serialized value per parameter, in parameter order.
    pub args: Vec<String>,
    /// PCs of the executed instructions.
    #[serde(default)]
    pub instructions: Vec<String>,
    pub delta_coverage: u64,
    pub delta_min_distance: u64,
    pub created_at: DateTime<Utc>,
}

pub trait ContractStore: Send + Sync {
    fn function(&self, function_id: &str) -> Result<Option<FunctionRecord>>;

    fn contract(&self, contract_id: &str) -> Result<Option<ContractRecord>>;
}

pub trait ExecutionStore: Send + Sync {
    /// Up to `limit` done executions of `function_id`, oldest first.
    fn find_done_ordered_by_time(
        &self,
        function_id: &str,
        limit: usize,
    ) -> Result<Vec<ExecutionRecord>>;
}
