//! The power schedule: turns a function's execution history into seed
//! argument tuples for the greybox fuzzers.

use rand::RngCore;
use slog::{Logger, debug, o, warn};
use std::{cmp::Reverse, sync::Arc};

use crate::{
    config::{FuzzerConfig, SeedOrder},
    constants::MAX_SEEDS_SIZE,
    error::{FuzzError, Result},
    store::{ContractStore, ExecutionRecord, ExecutionStore},
    target::{TargetFunction, TargetResolver},
    value::TypedValue,
};

/// One value per function parameter.
pub type SeedTuple = Vec<TypedValue>;

/// Fitness used to rank past executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Rank by `delta_coverage`.
    Coverage,
    /// Rank by `delta_min_distance`.
    Distance,
}

impl SeedStrategy {
    pub fn fitness(&self, record: &ExecutionRecord) -> u64 {
        match self {
            Self::Coverage => record.delta_coverage,
            Self::Distance => record.delta_min_distance,
        }
    }

    /// Stable in-place sort of `records` by this strategy's fitness.
    pub fn order(&self, records: &mut [ExecutionRecord], order: SeedOrder) {
        match order {
            SeedOrder::Ascending => records.sort_by_key(|r| self.fitness(r)),
            SeedOrder::Descending => records.sort_by_key(|r| Reverse(self.fitness(r))),
        }
    }
}

pub struct PowerSchedule {
    resolver: Arc<TargetResolver>,
    executions: Arc<dyn ExecutionStore>,
    config: Arc<FuzzerConfig>,
    log: Logger,
}

impl PowerSchedule {
    pub fn new(
        contracts: Arc<dyn ContractStore>,
        executions: Arc<dyn ExecutionStore>,
        config: Arc<FuzzerConfig>,
        log: &Logger,
    ) -> Self {
        let resolver = Arc::new(TargetResolver::new(contracts, config.addresses.clone()));
        Self::with_resolver(resolver, executions, config, log)
    }

    pub fn with_resolver(
        resolver: Arc<TargetResolver>,
        executions: Arc<dyn ExecutionStore>,
        config: Arc<FuzzerConfig>,
        log: &Logger,
    ) -> Self {
        Self {
            resolver,
            executions,
            config,
            log: log.new(o!("component" => "power_schedule")),
        }
    }

    pub fn resolver(&self) -> &Arc<TargetResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &FuzzerConfig {
        &self.config
    }

    /// Exactly `seeds_size` tuples for `function_id`: the best-ranked history
    /// first, then tuples synthesized from the seed pool.
    pub fn request_seeds(
        &self,
        function_id: &str,
        strategy: SeedStrategy,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<SeedTuple>> {
        let target = self.resolver.resolve(function_id)?;
        self.seeds_for(&target, strategy, rng)
    }

    /// [`Self::request_seeds`] for an already resolved function.
    pub fn seeds_for(
        &self,
        target: &TargetFunction,
        strategy: SeedStrategy,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<SeedTuple>> {
        let size = self.config.seeds_size;
        let mut history = self
            .executions
            .find_done_ordered_by_time(&target.function_id, size.saturating_mul(2))?;
        strategy.order(&mut history, self.config.seed_order);

        let mut seeds = Vec::with_capacity(size.min(MAX_SEEDS_SIZE));
        for record in history.iter().take(size) {
            seeds.push(self.tuple_from_record(target, record)?);
        }
        let from_history = seeds.len();

        while seeds.len() < size {
            seeds.push(self.synthesize(target, rng)?);
        }

        debug!(self.log, "seeds ready";
            "function" => &target.function_id,
            "strategy" => ?strategy,
            "history" => history.len(),
            "from_history" => from_history,
            "synthesized" => size - from_history);
        Ok(seeds)
    }

    fn tuple_from_record(
        &self,
        target: &TargetFunction,
        record: &ExecutionRecord,
    ) -> Result<SeedTuple> {
        if record.args.len() < target.params.len() {
            warn!(self.log, "stored arguments are shorter than the signature";
                "function" => &target.function_id,
                "expected" => target.params.len(),
                "actual" => record.args.len());
            return Err(FuzzError::SeedsListInvalid {
                function: target.function_id.clone(),
                expected: target.params.len(),
                actual: record.args.len(),
            });
        }
        target
            .handlers()?
            .into_iter()
            .zip(&record.args)
            .map(|(mut handler, text)| {
                handler.deserialize(text)?;
                Ok(handler.into_value())
            })
            .collect()
    }

    /// A tuple built from the configured seed pool, generating the parameters
    /// whose type has no pool entry.
    fn synthesize(&self, target: &TargetFunction, rng: &mut dyn RngCore) -> Result<SeedTuple> {
        target
            .handlers()?
            .into_iter()
            .map(|mut handler| {
                handler.seed_or_generate(&self.config.seeds, &mut *rng)?;
                Ok(handler.into_value())
            })
            .collect()
    }
}
