//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use simmlst::prelude::*;
//!
//! let seqs = [b"ACGTACGT".to_vec(), b"ACGAACGA".to_vec()];
//! let ks = calc_ks(&seqs).unwrap();
//! assert_eq!(ks.mean(), 0.25);
//! ```

pub use simmlst_cov::{
    calc_cm, calc_cs, calc_ct, calc_ct_fft, calc_ks, pair_count, sub_profile, BivariateCovariance,
    Calculators, CovError, CtAlgorithm, CtCalculator, CtShape, DirectCt, FftCt, KsCalculator,
    LagCovariance, MeanCov, MeanVar, PairCovariance,
};
pub use simmlst_sim::prelude::*;
