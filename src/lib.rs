//! simmlst: Ks and lag covariance (Ct) of simulated bacterial populations.
//!
//! This library bundles the accumulation engine (`simmlst-cov`) and the
//! simulation pipeline (`simmlst-sim`).
//!
//! - [`cov`] turns aligned sequences into substitution profiles and
//!   accumulates pooled divergence and the covariance of substitutions at
//!   every distance, with a direct and an FFT algorithm.
//! - [`sim`] runs the external simulator over batches of configurations on a
//!   worker pool and merges the replicates of every configuration.

pub use simmlst_cov as cov;
pub use simmlst_sim as sim;

pub mod prelude;

// Re-export commonly used types for convenient external access.
pub use simmlst_cov::{
    calc_cm, calc_cs, calc_ct, calc_ct_fft, calc_ks, Calculators, CovError, CtAlgorithm,
    CtCalculator, CtShape, LagCovariance,
};
pub use simmlst_sim::{
    average, Config, CorrAnalysis, CorrRecord, CovResult, ParameterGrid, Pipeline, PipelineConfig,
    ResultRecord, SimError, SimMlst,
};
