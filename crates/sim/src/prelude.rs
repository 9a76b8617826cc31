//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use simmlst_sim::prelude::*;
//!
//! let grid = ParameterGrid {
//!     sizes: vec![10],
//!     num_genes: vec![1],
//!     len_genes: vec![100],
//!     thetas: vec![0.5, 1.0],
//!     rhos: vec![0.0],
//!     deltas: vec![10],
//! };
//! assert_eq!(grid.expand(2).len(), 4);
//! ```

pub use crate::errors::SimError;
pub use crate::{
    average, AlignmentSource, Averager, Config, CorrAnalysis, CorrKind, CorrRecord, CovResult,
    GeneGroup, ParameterGrid, Pipeline, PipelineConfig, PipelineState, ReplicateAnalysis,
    ResultRecord, SimMlst,
};
pub use simmlst_cov::{Calculators, CtAlgorithm, CtShape, FftPlans, LagCovariance};
