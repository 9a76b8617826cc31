use clap::Args;
use simmlst_cov::CtAlgorithm;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// JSON array of configurations to simulate
    pub input: PathBuf,

    /// Where to write the JSON array of results
    pub output: PathBuf,

    /// Number of lags of the Ct array
    #[arg(short = 'm', long, default_value_t = defaults::MAX_LAG)]
    pub max_lag: usize,

    /// Ct algorithm (direct, fft)
    #[arg(short, long, default_value = defaults::ALGORITHM)]
    pub algorithm: CtAlgorithm,

    /// Divide covariances by n - 1 instead of n
    #[arg(long)]
    pub bias_corrected: bool,

    /// Let lags wrap around the end of each gene
    #[arg(long)]
    pub circular: bool,

    /// Replicates to simulate for every configuration
    #[arg(short, long, default_value_t = defaults::REPLICATES)]
    pub replicates: usize,

    /// Simulator binary
    #[arg(long, default_value = defaults::SIMULATOR)]
    pub simulator: PathBuf,

    /// Directory for temporary simulator output
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Capacity of the work and result channels
    ///
    /// Defaults to twice the number of threads.
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct CorrArgs {
    /// JSON configuration (or array of configurations) to simulate
    pub input: PathBuf,

    /// Where to write the JSON array of averaged statistics
    pub output: PathBuf,

    /// Number of lags of every correlation
    #[arg(short = 'm', long, default_value_t = defaults::CORR_MAX_LAG)]
    pub max_lag: usize,

    /// Times to simulate every configuration
    #[arg(short, long, default_value_t = defaults::REPLICATES)]
    pub replicates: usize,

    /// Also split the covariance by site (Cs, Cr, P2)
    #[arg(long)]
    pub by_row: bool,

    /// Simulator binary
    #[arg(long, default_value = defaults::SIMULATOR)]
    pub simulator: PathBuf,

    /// Directory for temporary simulator output
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct AverageArgs {
    /// JSON array of results, several per configuration
    pub input: PathBuf,

    /// Where to write one averaged result per configuration
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct GridArgs {
    /// JSON parameter grid (Sizes, NumGenes, LenGenes, Thetas, Rhos, Deltas)
    pub input: PathBuf,

    /// Where to write the expanded configurations
    pub output: PathBuf,

    /// Copies of every configuration
    #[arg(short, long, default_value_t = defaults::REPLICATES)]
    pub replicates: usize,
}
