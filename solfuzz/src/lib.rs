//! A mutation- and coverage-guided fuzzing core for smart contracts.
//!
//! The crate builds argument tuples for contract functions. It does not deploy
//! or execute anything: callers run the transactions, record which program
//! counters executed, and feed the scored history back through an
//! [`store::ExecutionStore`].
//!
//! ## Getting Started
//!
//! ```no_run
//! use rand::{SeedableRng, rngs::StdRng};
//! use slog::{Logger, o};
//! use solfuzz::config::FuzzerConfig;
//! use solfuzz::fuzzer::FuzzerLeader;
//! use solfuzz::store::memory::{InMemoryContractStore, InMemoryExecutionStore};
//! use std::sync::Arc;
//!
//! let log = Logger::root(slog::Discard, o!());
//! let config = FuzzerConfig::from_file("./config.json").unwrap();
//! let leader = FuzzerLeader::new(
//!     Arc::new(InMemoryContractStore::new()),
//!     Arc::new(InMemoryExecutionStore::new()),
//!     Arc::new(config),
//!     &log,
//! );
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let fuzzer = leader.get_strategy("directed_greybox").unwrap();
//! let args = fuzzer.generate_args("transfer", &mut rng).unwrap();
//! println!("{args:?}");
//! ```
//!
//! Executions are scored with [`analysis::FitnessTracker`], which turns a
//! [`cfg::ControlFlowGraph`] and a set of critical instructions into coverage
//! and distance deltas.
pub mod abi;
pub mod analysis;
pub mod cfg;
pub mod config;
pub mod error;
pub mod fuzzer;
pub mod handler;
pub mod schedule;
pub mod seeds;
pub mod store;
pub mod target;
pub mod util;
pub mod value;

mod constants;

pub use constants::INFINITE_DISTANCE;
pub use error::{FuzzError, Result};
