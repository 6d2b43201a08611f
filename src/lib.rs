pub mod config;
#[cfg(feature = "with_digest")]
pub mod digest;
pub mod driver;
pub mod io;
pub mod options;
pub mod pool;
pub mod runner;
pub mod score;

use std::ops::Range;

/// Identifies one deterministic test case.
pub type Seed = u64;

/// Cost reported by the tester; 0 if it reported none.
pub type Score = u64;

pub const DEFAULT_SEEDS: Range<Seed> = 0..100;
