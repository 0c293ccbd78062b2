//! This module defines constants shared by the type handlers, the
//! coverage/distance analysis and the power schedule.

/// Sentinel distance for nodes that cannot reach a target, and for the
/// minimum distance of an empty execution.
pub const INFINITE_DISTANCE: u64 = u64::MAX;

/// Characters used when generating and mutating `string` values.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generated strings have between `STRING_MIN_LEN` and `STRING_MAX_LEN` characters.
pub const STRING_MIN_LEN: usize = 1;
pub const STRING_MAX_LEN: usize = 255;

/// Upper bound (inclusive) for generated dynamic `bytes` and `T[]` lengths.
pub const DYNAMIC_MAX_LEN: usize = 15;

/// Number of seed tuples the power schedule returns when not configured.
pub const DEFAULT_SEEDS_SIZE: usize = 10;

/// Largest accepted `seeds_size`.
pub const MAX_SEEDS_SIZE: usize = 10_000;
