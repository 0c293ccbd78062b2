//! Runs the three fuzzers against a toy `withdraw(address,uint256)` contract
//! whose execution is simulated in-process, and reports how far each one got
//! towards the critical instruction.

use alloy_primitives::Address;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use num_bigint::BigInt;
use rand::{SeedableRng, rngs::StdRng};
use slog::{Drain, Level, Logger, info, o};
use solfuzz::{
    INFINITE_DISTANCE,
    abi::AbiType,
    analysis::FitnessTracker,
    cfg::ControlFlowGraph,
    config::FuzzerConfig,
    fuzzer::{FuzzerLeader, FuzzingType},
    store::{
        AbiMethod, ContractRecord, ExecutionRecord, FunctionRecord,
        memory::{InMemoryContractStore, InMemoryExecutionStore},
    },
    target::TargetResolver,
    value::TypedValue,
};
use std::{collections::HashSet, sync::Arc};

const ROUNDS: usize = 200;
const CONTRACT: Address = Address::repeat_byte(0xcc);
const CRITICAL_PC: &str = "0x37";

/// `0x00` dispatches; zero amounts revert at `0x0a`; only the owner passes
/// `0x1e`, and amounts above 2^128 reach the critical block `0x32`.
fn withdraw_cfg() -> ControlFlowGraph {
    ControlFlowGraph::new()
        .with_block("0x00", ["0x0a", "0x14"], ["0x01", "0x05"])
        .with_block("0x0a", Vec::<String>::new(), ["0x0b"])
        .with_block("0x14", ["0x1e", "0x28"], ["0x15", "0x19"])
        .with_block("0x1e", ["0x32", "0x3c"], ["0x1f"])
        .with_block("0x28", Vec::<String>::new(), ["0x29"])
        .with_block("0x32", Vec::<String>::new(), ["0x33", CRITICAL_PC])
        .with_block("0x3c", Vec::<String>::new(), ["0x3d"])
}

fn simulate(args: &[TypedValue], owner: Address) -> Result<Vec<String>> {
    let [TypedValue::Address(caller), amount] = args else {
        bail!("unexpected arguments {args:?}");
    };
    let amount = amount.as_bigint().context("amount is not an integer")?;
    let mut trace = vec!["0x00"];
    if amount == BigInt::ZERO {
        trace.push("0x0a");
    } else {
        trace.push("0x14");
        if *caller == owner {
            trace.push("0x1e");
            trace.push(if amount > BigInt::from(u128::MAX) { "0x32" } else { "0x3c" });
        } else {
            trace.push("0x28");
        }
    }
    Ok(trace.into_iter().map(String::from).collect())
}

fn contracts() -> Arc<InMemoryContractStore> {
    let store = InMemoryContractStore::new();
    store.insert_contract(ContractRecord {
        id: "vault".to_string(),
        address: Some(CONTRACT),
        abi: vec![AbiMethod::new(
            "withdraw",
            vec![AbiType::Address, AbiType::Uint(256)],
        )],
    });
    store.insert_function(FunctionRecord {
        id: "withdraw".to_string(),
        contract_id: "vault".to_string(),
        method: "withdraw".to_string(),
    });
    Arc::new(store)
}

fn run(fuzzing_type: FuzzingType, config: Arc<FuzzerConfig>, log: &Logger) -> Result<()> {
    let log = log.new(o!("fuzzing_type" => fuzzing_type.as_str()));
    let owner = config
        .addresses
        .first()
        .copied()
        .context("config needs at least one address")?;
    let contracts = contracts();
    let executions = Arc::new(InMemoryExecutionStore::new());
    let resolver = TargetResolver::new(contracts.clone(), config.addresses.clone());
    let target = resolver.resolve("withdraw")?;
    let leader = FuzzerLeader::new(contracts, executions.clone(), config, &log);
    let fuzzer = leader.get_strategy(fuzzing_type.as_str())?;

    let critical = HashSet::from([CRITICAL_PC.to_string()]);
    let mut tracker = FitnessTracker::new(withdraw_cfg(), &critical);
    let mut rng = StdRng::seed_from_u64(7);
    let mut reached_at = None;

    for round in 0..ROUNDS {
        let args = fuzzer.generate_args("withdraw", &mut rng)?;
        let trace = simulate(&args, owner)?;
        let fitness = tracker.record(trace.iter().cloned());

        let mut serialized = Vec::with_capacity(args.len());
        for (mut handler, value) in target.handlers()?.into_iter().zip(args) {
            handler.set_value(value)?;
            serialized.push(handler.serialize());
        }
        executions.push(ExecutionRecord {
            function_id: "withdraw".to_string(),
            args: serialized,
            instructions: trace,
            delta_coverage: fitness.delta_coverage,
            delta_min_distance: fitness.delta_min_distance,
            created_at: Utc::now(),
        });

        if reached_at.is_none() && tracker.min_distance() == 0 {
            reached_at = Some(round);
        }
    }

    let min_distance = match tracker.min_distance() {
        INFINITE_DISTANCE => "inf".to_string(),
        d => d.to_string(),
    };
    info!(log, "round finished";
        "executions" => executions.len(),
        "coverage" => tracker.coverage(),
        "min_distance" => min_distance,
        "reached_at" => ?reached_at);
    Ok(())
}

fn stderr_logger(level: Level) -> Logger {
    let decorator = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(decorator)
        .build()
        .filter_level(level)
        .fuse();
    Logger::root(drain, o!())
}

fn main() -> Result<()> {
    let log = stderr_logger(Level::Info);
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/config.json").to_string());
    let config = Arc::new(FuzzerConfig::from_file(&path)?);
    info!(log, "loaded config"; "path" => &path, "seeds_size" => config.seeds_size);

    for fuzzing_type in [
        FuzzingType::Blackbox,
        FuzzingType::Greybox,
        FuzzingType::DirectedGreybox,
    ] {
        run(fuzzing_type, config.clone(), &log)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use solfuzz::value::IntValue;

    const OWNER: Address = Address::repeat_byte(0x11);

    fn withdraw(caller: Address, amount: BigUint) -> Vec<TypedValue> {
        vec![TypedValue::Address(caller), IntValue::Uint(amount).into()]
    }

    #[test]
    fn simulated_paths() {
        let big = BigUint::from(u128::MAX) + 1u8;
        let cases = [
            (withdraw(OWNER, BigUint::ZERO), vec!["0x00", "0x0a"]),
            (withdraw(CONTRACT, big.clone()), vec!["0x00", "0x14", "0x28"]),
            (withdraw(OWNER, BigUint::from(5u8)), vec!["0x00", "0x14", "0x1e", "0x3c"]),
            (withdraw(OWNER, big), vec!["0x00", "0x14", "0x1e", "0x32"]),
        ];
        for (args, expected) in cases {
            assert_eq!(simulate(&args, OWNER).unwrap(), expected);
        }
        assert!(simulate(&[TypedValue::Bool(true)], OWNER).is_err());
    }

    #[test]
    fn stderr_logger_accepts_records() {
        let log = stderr_logger(Level::Debug);
        info!(log, "logger ready"; "rounds" => ROUNDS);
    }
}
