use rand::RngCore;
use slog::{Logger, debug, o};
use std::sync::Arc;

use super::{Fuzzer, FuzzingType};
use crate::{error::Result, target::TargetResolver, value::TypedValue};

/// Uniformly random arguments, no feedback.
pub struct Blackbox {
    resolver: Arc<TargetResolver>,
    log: Logger,
}

impl Blackbox {
    pub fn new(resolver: Arc<TargetResolver>, log: &Logger) -> Self {
        Self {
            resolver,
            log: log.new(o!("fuzzer" => "blackbox")),
        }
    }
}

impl Fuzzer for Blackbox {
    fn fuzzing_type(&self) -> FuzzingType {
        FuzzingType::Blackbox
    }

    fn generate_args(&self, function_id: &str, rng: &mut dyn RngCore) -> Result<Vec<TypedValue>> {
        let target = self.resolver.resolve(function_id)?;
        let args = target
            .handlers()?
            .into_iter()
            .map(|mut handler| {
                handler.generate(&mut *rng);
                handler.into_value()
            })
            .collect();
        debug!(self.log, "generated arguments"; "function" => function_id, "signature" => &target.signature);
        Ok(args)
    }
}
