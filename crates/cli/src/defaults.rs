//! Shared default values for the command line.
//! These mirror `PipelineConfig::default()` and are used by the clap
//! definitions in `args.rs`.

pub const MAX_LAG: usize = 1000;
pub const ALGORITHM: &str = "fft";
pub const REPLICATES: usize = 1;

/// Lags of the per-pair and by-site correlations.
pub const CORR_MAX_LAG: usize = 100;

/// Name or path of the external simulator binary.
pub const SIMULATOR: &str = "simmlst";

/// Results channel slots per worker thread.
pub const CHANNEL_SLOTS_PER_WORKER: usize = 2;
