use slog::{Logger, debug, o};
use std::sync::Arc;

use super::{Blackbox, DirectedGreybox, Fuzzer, FuzzingType, Greybox};
use crate::{
    config::FuzzerConfig,
    error::Result,
    schedule::PowerSchedule,
    store::{ContractStore, ExecutionStore},
    target::TargetResolver,
};

/// Hands out the fuzzer matching a task's configured fuzzing type.
pub struct FuzzerLeader {
    blackbox: Arc<Blackbox>,
    greybox: Arc<Greybox>,
    directed_greybox: Arc<DirectedGreybox>,
    log: Logger,
}

impl FuzzerLeader {
    pub fn new(
        contracts: Arc<dyn ContractStore>,
        executions: Arc<dyn ExecutionStore>,
        config: Arc<FuzzerConfig>,
        log: &Logger,
    ) -> Self {
        let resolver = Arc::new(TargetResolver::new(contracts, config.addresses.clone()));
        let schedule = Arc::new(PowerSchedule::with_resolver(
            resolver.clone(),
            executions,
            config,
            log,
        ));
        Self {
            blackbox: Arc::new(Blackbox::new(resolver, log)),
            greybox: Arc::new(Greybox::new(schedule.clone(), log)),
            directed_greybox: Arc::new(DirectedGreybox::new(schedule, log)),
            log: log.new(o!("component" => "fuzzer_leader")),
        }
    }

    pub fn fuzzer(&self, fuzzing_type: FuzzingType) -> Arc<dyn Fuzzer> {
        match fuzzing_type {
            FuzzingType::Blackbox => self.blackbox.clone(),
            FuzzingType::Greybox => self.greybox.clone(),
            FuzzingType::DirectedGreybox => self.directed_greybox.clone(),
        }
    }

    /// Fails with [`crate::error::FuzzError::FuzzerTypeNotFound`] for anything
    /// but `blackbox`, `greybox` and `directed_greybox`.
    pub fn get_strategy(&self, fuzzing_type: &str) -> Result<Arc<dyn Fuzzer>> {
        let fuzzing_type = fuzzing_type.parse::<FuzzingType>()?;
        debug!(self.log, "dispatching"; "fuzzing_type" => %fuzzing_type);
        Ok(self.fuzzer(fuzzing_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::AbiType,
        error::FuzzError,
        seeds::SeedPool,
        store::{
            AbiMethod, ContractRecord, ExecutionRecord, FunctionRecord,
            memory::{InMemoryContractStore, InMemoryExecutionStore},
        },
        value::{IntValue, TypedValue},
    };
    use alloy_primitives::Address;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use rand::{SeedableRng, rngs::StdRng};

    const DEPLOYER: Address = Address::repeat_byte(0x01);
    const CONTRACT: Address = Address::repeat_byte(0xcc);

    fn contracts() -> Arc<InMemoryContractStore> {
        let store = InMemoryContractStore::new();
        store.insert_contract(ContractRecord {
            id: "vault".into(),
            address: Some(CONTRACT),
            abi: vec![
                AbiMethod::new(
                    "deposit",
                    vec![AbiType::Address, AbiType::Uint(8), "bytes[]".parse().unwrap()],
                ),
                AbiMethod::new("pause", vec![AbiType::Bool]),
                AbiMethod::new("call", vec!["(uint8,bool)".parse().unwrap()]),
            ],
        });
        for (id, method) in [("deposit", "deposit"), ("pause", "pause"), ("call", "call")] {
            store.insert_function(FunctionRecord {
                id: id.into(),
                contract_id: "vault".into(),
                method: method.into(),
            });
        }
        Arc::new(store)
    }

    fn pause_record(arg: &str, coverage: u64, distance: u64) -> ExecutionRecord {
        ExecutionRecord {
            function_id: "pause".into(),
            args: vec![arg.into()],
            instructions: vec![],
            delta_coverage: coverage,
            delta_min_distance: distance,
            created_at: Utc::now(),
        }
    }

    fn leader(executions: Arc<InMemoryExecutionStore>, config: FuzzerConfig) -> FuzzerLeader {
        let log = Logger::root(slog::Discard, o!());
        let config = config.with_addresses([DEPLOYER]);
        FuzzerLeader::new(contracts(), executions, Arc::new(config), &log)
    }

    #[test]
    fn dispatches_by_name() {
        let leader = leader(Arc::new(InMemoryExecutionStore::new()), FuzzerConfig::default());
        for ty in [FuzzingType::Blackbox, FuzzingType::Greybox, FuzzingType::DirectedGreybox] {
            let fuzzer = leader.get_strategy(ty.as_str()).unwrap();
            assert_eq!(fuzzer.fuzzing_type(), ty);
        }
        assert_matches!(
            leader.get_strategy("whitebox").err(),
            Some(FuzzError::FuzzerTypeNotFound(name)) if name == "whitebox"
        );
    }

    #[test]
    fn blackbox_respects_parameter_domains() {
        let mut rng = StdRng::seed_from_u64(1);
        let leader = leader(Arc::new(InMemoryExecutionStore::new()), FuzzerConfig::default());
        let fuzzer = leader.fuzzer(FuzzingType::Blackbox);
        for args in fuzzer.generate_batch("deposit", 20, &mut rng).unwrap() {
            assert_eq!(args.len(), 3);
            assert_matches!(&args[0], TypedValue::Address(a) if *a == DEPLOYER || *a == CONTRACT);
            assert_matches!(&args[1], TypedValue::Integer(IntValue::U8(_)));
            assert_matches!(&args[2], TypedValue::Array(items)
                if items.iter().all(|i| matches!(i, TypedValue::Bytes(_))));
        }
    }

    #[test]
    fn greybox_mutates_a_pool_seed() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = FuzzerConfig::default()
            .with_seeds_size(2)
            .with_seeds(SeedPool::new().with_seeds(&AbiType::Bool, ["true"]));
        let leader = leader(Arc::new(InMemoryExecutionStore::new()), config);
        let args = leader
            .fuzzer(FuzzingType::Greybox)
            .generate_args("pause", &mut rng)
            .unwrap();
        assert_eq!(args, vec![TypedValue::Bool(false)]);
    }

    #[test]
    fn greybox_and_directed_rank_history_differently() {
        let mut rng = StdRng::seed_from_u64(3);
        let executions = Arc::new(InMemoryExecutionStore::new());
        executions.push(pause_record("true", 5, 0));
        executions.push(pause_record("false", 0, 5));
        let leader = leader(executions, FuzzerConfig::default().with_seeds_size(1));

        // Lowest coverage delta is the "false" record, flipped by `not`.
        let grey = leader
            .fuzzer(FuzzingType::Greybox)
            .generate_args("pause", &mut rng)
            .unwrap();
        assert_eq!(grey, vec![TypedValue::Bool(true)]);

        // Lowest distance delta is the "true" record.
        let directed = leader
            .fuzzer(FuzzingType::DirectedGreybox)
            .generate_args("pause", &mut rng)
            .unwrap();
        assert_eq!(directed, vec![TypedValue::Bool(false)]);
    }

    #[test]
    fn greybox_output_stays_in_domain() {
        let mut rng = StdRng::seed_from_u64(4);
        let config = FuzzerConfig::default().with_seeds(
            SeedPool::new()
                .with_seeds(&AbiType::Uint(8), ["0", "255"])
                .with_seeds(&AbiType::Address, [CONTRACT.to_string()]),
        );
        let leader = leader(Arc::new(InMemoryExecutionStore::new()), config);
        let fuzzer = leader.fuzzer(FuzzingType::DirectedGreybox);
        for args in fuzzer.generate_batch("deposit", 50, &mut rng).unwrap() {
            assert_matches!(&args[0], TypedValue::Address(a) if *a == DEPLOYER || *a == CONTRACT);
            assert_matches!(&args[1], TypedValue::Integer(IntValue::U8(_)));
        }
    }

    #[test]
    fn unsupported_parameter_fails_the_tuple() {
        let mut rng = StdRng::seed_from_u64(5);
        let leader = leader(Arc::new(InMemoryExecutionStore::new()), FuzzerConfig::default());
        for ty in [FuzzingType::Blackbox, FuzzingType::Greybox] {
            assert_matches!(
                leader.fuzzer(ty).generate_args("call", &mut rng),
                Err(FuzzError::UnsupportedType(_))
            );
        }
    }
}
