//! Resolution of a function id into the parameter types and handler context
//! needed to build its arguments.

use alloy_primitives::Address;
use std::sync::Arc;

use crate::{
    abi::AbiType,
    error::{FuzzError, Result},
    handler::{HandlerContext, TypeHandler},
    store::ContractStore,
};

/// A contract function ready to have arguments built for it.
#[derive(Debug, Clone)]
pub struct TargetFunction {
    pub function_id: String,
    pub contract_id: String,
    pub signature: String,
    pub params: Vec<AbiType>,
    pub context: HandlerContext,
}

impl TargetFunction {
    /// A fresh handler for every parameter, in order.
    pub fn handlers(&self) -> Result<Vec<TypeHandler>> {
        self.params
            .iter()
            .map(|ty| TypeHandler::new(ty, &self.context))
            .collect()
    }
}

pub struct TargetResolver {
    contracts: Arc<dyn ContractStore>,
    addresses: Vec<Address>,
}

impl TargetResolver {
    /// `addresses` are the configured deployer/agent accounts; the target
    /// contract's own address is added per function.
    pub fn new(contracts: Arc<dyn ContractStore>, addresses: Vec<Address>) -> Self {
        Self {
            contracts,
            addresses,
        }
    }

    pub fn resolve(&self, function_id: &str) -> Result<TargetFunction> {
        let function = self
            .contracts
            .function(function_id)?
            .ok_or_else(|| FuzzError::FunctionNotFound(function_id.to_string()))?;
        let contract = self
            .contracts
            .contract(&function.contract_id)?
            .ok_or_else(|| FuzzError::ContractNotFound(function.contract_id.clone()))?;
        let method = contract
            .abi
            .iter()
            .find(|m| m.name == function.method || m.signature() == function.method)
            .ok_or_else(|| FuzzError::FunctionNotFound(function_id.to_string()))?;

        let mut addresses = self.addresses.clone();
        if let Some(address) = contract.address {
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }

        Ok(TargetFunction {
            function_id: function.id,
            contract_id: contract.id,
            signature: method.signature(),
            params: method.inputs.clone(),
            context: HandlerContext::new(addresses),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AbiMethod, ContractRecord, FunctionRecord, memory::InMemoryContractStore};
    use assert_matches::assert_matches;

    fn store() -> Arc<InMemoryContractStore> {
        let store = InMemoryContractStore::new();
        store.insert_contract(ContractRecord {
            id: "token".into(),
            address: Some(Address::repeat_byte(0xaa)),
            abi: vec![
                AbiMethod::new("transfer", vec![AbiType::Address, AbiType::Uint(256)]),
                AbiMethod::new("approve", vec![AbiType::Address, AbiType::Uint(256)]),
            ],
        });
        store.insert_function(FunctionRecord {
            id: "f1".into(),
            contract_id: "token".into(),
            method: "transfer(address,uint256)".into(),
        });
        store.insert_function(FunctionRecord {
            id: "f2".into(),
            contract_id: "missing".into(),
            method: "transfer".into(),
        });
        store.insert_function(FunctionRecord {
            id: "f3".into(),
            contract_id: "token".into(),
            method: "burn".into(),
        });
        Arc::new(store)
    }

    #[test]
    fn resolves_parameters_and_addresses() {
        let resolver = TargetResolver::new(store(), vec![Address::repeat_byte(0x01)]);
        let target = resolver.resolve("f1").unwrap();
        assert_eq!(target.signature, "transfer(address,uint256)");
        assert_eq!(target.params, vec![AbiType::Address, AbiType::Uint(256)]);
        assert_eq!(
            &*target.context.addresses,
            &[Address::repeat_byte(0x01), Address::repeat_byte(0xaa)]
        );
        assert_eq!(target.handlers().unwrap().len(), 2);
    }

    #[test]
    fn lookup_misses() {
        let resolver = TargetResolver::new(store(), vec![]);
        assert_matches!(resolver.resolve("nope"), Err(FuzzError::FunctionNotFound(_)));
        assert_matches!(resolver.resolve("f2"), Err(FuzzError::ContractNotFound(id)) if id == "missing");
        assert_matches!(resolver.resolve("f3"), Err(FuzzError::FunctionNotFound(_)));
    }
}
