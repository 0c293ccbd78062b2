use rand::{RngCore, seq::IndexedRandom};
use slog::{Logger, debug, o};
use std::sync::Arc;

use super::{Fuzzer, FuzzingType};
use crate::{
    error::{FuzzError, Result},
    schedule::{PowerSchedule, SeedStrategy},
    value::TypedValue,
};

/// Mutates one of the power schedule's seeds, ranked by coverage gain.
pub struct Greybox {
    schedule: Arc<PowerSchedule>,
    strategy: SeedStrategy,
    log: Logger,
}

impl Greybox {
    pub fn new(schedule: Arc<PowerSchedule>, log: &Logger) -> Self {
        Self::with_strategy(schedule, SeedStrategy::Coverage, FuzzingType::Greybox, log)
    }

    fn with_strategy(
        schedule: Arc<PowerSchedule>,
        strategy: SeedStrategy,
        fuzzing_type: FuzzingType,
        log: &Logger,
    ) -> Self {
        Self {
            schedule,
            strategy,
            log: log.new(o!("fuzzer" => fuzzing_type.as_str())),
        }
    }

    /// Picks one seed tuple and applies one random mutator to each value.
    fn mutate_seed(&self, function_id: &str, rng: &mut dyn RngCore) -> Result<Vec<TypedValue>> {
        let target = self.schedule.resolver().resolve(function_id)?;
        let seeds = self.schedule.seeds_for(&target, self.strategy, rng)?;
        let seed = seeds
            .choose(rng)
            .ok_or_else(|| FuzzError::NoSeeds(target.signature.clone()))?;

        let mut args = Vec::with_capacity(seed.len());
        for (mut handler, value) in target.handlers()?.into_iter().zip(seed.iter().cloned()) {
            handler.set_value(value)?;
            let mutator = handler.mutate_random(&mut *rng);
            debug!(self.log, "mutated argument";
                "function" => function_id,
                "type" => %handler.abi_type(),
                "mutator" => mutator.map_or("none", |m| m.name()));
            args.push(handler.into_value());
        }
        Ok(args)
    }
}

impl Fuzzer for Greybox {
    fn fuzzing_type(&self) -> FuzzingType {
        FuzzingType::Greybox
    }

    fn generate_args(&self, function_id: &str, rng: &mut dyn RngCore) -> Result<Vec<TypedValue>> {
        self.mutate_seed(function_id, rng)
    }
}

/// [`Greybox`] with seeds ranked by how much closer they came to the
/// critical instructions.
pub struct DirectedGreybox(Greybox);

impl DirectedGreybox {
    pub fn new(schedule: Arc<PowerSchedule>, log: &Logger) -> Self {
        Self(Greybox::with_strategy(
            schedule,
            SeedStrategy::Distance,
            FuzzingType::DirectedGreybox,
            log,
        ))
    }
}

impl Fuzzer for DirectedGreybox {
    fn fuzzing_type(&self) -> FuzzingType {
        FuzzingType::DirectedGreybox
    }

    fn generate_args(&self, function_id: &str, rng: &mut dyn RngCore) -> Result<Vec<TypedValue>> {
        self.0.mutate_seed(function_id, rng)
    }
}
