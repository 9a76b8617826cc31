//! # Covariance Crate
//!
//! Streaming statistics over substitution profiles of aligned sequence
//! pairs: the pooled divergence (Ks) and the covariance of substitution
//! indicators as a function of site lag (Ct).
//!
//! Every accumulator is a monoid element: a fresh accumulator is the identity
//! and `append` merges two partial results so that replicates can be reduced
//! in any order.

pub mod bundle;
pub mod cm;
pub mod cs;
pub mod ct;
pub mod errors;
pub mod ks;
pub mod moments;
pub mod profile;

pub use bundle::Calculators;
pub use cm::{calc_cm, PairCovariance};
pub use cs::{calc_cs, MeanCov};
pub use ct::{
    calc_ct, calc_ct_fft, CtAlgorithm, CtCalculator, CtShape, DirectCt, FftCt, FftPlans,
    LagCovariance,
};
pub use errors::CovError;
pub use ks::{calc_ks, KsCalculator};
pub use moments::{BivariateCovariance, MeanVar};
pub use profile::{pair_count, sub_profile};
