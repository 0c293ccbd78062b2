//! In-process stores, for tests and local runs.

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{
    ContractRecord, ContractStore, ExecutionRecord, ExecutionStore, FunctionRecord,
};

#[derive(Debug, Default)]
pub struct InMemoryContractStore {
    functions: RwLock<HashMap<String, FunctionRecord>>,
    contracts: RwLock<HashMap<String, ContractRecord>>,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_contract(&self, contract: ContractRecord) {
        self.contracts.write().insert(contract.id.clone(), contract);
    }

    pub fn insert_function(&self, function: FunctionRecord) {
        self.functions.write().insert(function.id.clone(), function);
    }
}

impl ContractStore for InMemoryContractStore {
    fn function(&self, function_id: &str) -> Result<Option<FunctionRecord>> {
        Ok(self.functions.read().get(function_id).cloned())
    }

    fn contract(&self, contract_id: &str) -> Result<Option<ContractRecord>> {
        Ok(self.contracts.read().get(contract_id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
    records: RwLock<Vec<ExecutionRecord>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: ExecutionRecord) {
        self.records.write().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ExecutionStore for InMemoryExecutionStore {
    fn find_done_ordered_by_time(
        &self,
        function_id: &str,
        limit: usize,
    ) -> Result<Vec<ExecutionRecord>> {
        let mut found: Vec<ExecutionRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.function_id == function_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        found.truncate(limit);
        Ok(found)
    }
}
