//! # Simulation Crate
//!
//! The `sim` crate drives batches of population configurations through an
//! external coalescent simulator and reduces the Ks/Ct statistics of all
//! replicates per configuration. It includes modules for configuration and
//! parameter grids, reading simulated alignments, the concurrent
//! scatter/gather pipeline, averaging of result records, and the per-pair
//! and site-by-site correlation statistics.

pub mod average;
pub mod config;
pub mod corr;
pub mod errors;
pub mod pipeline;
pub mod prelude;
pub mod result;
pub mod simulator;
pub mod xmfa;

pub use average::{average, Averager};
pub use config::{Config, ParameterGrid, PipelineConfig};
pub use corr::{CorrAnalysis, CorrKind, CorrRecord, CorrSeries, CorrSummary};
pub use errors::SimError;
pub use pipeline::{CovAnalysis, Pipeline, PipelineState, ReplicateAnalysis};
pub use result::{CovResult, ResultRecord};
pub use simulator::{AlignmentSource, SimMlst};
pub use xmfa::{read_xmfa, read_xmfa_path, GeneGroup};
