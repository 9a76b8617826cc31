//! Lag covariance (Ct) of substitution indicators.
//!
//! Two interchangeable accumulators implement [`LagCovariance`]:
//! - [`DirectCt`]: site-pair Welford updates, `O(L * max_lag)` per profile.
//! - [`FftCt`]: FFT autocorrelation, `O(L log L)` per profile.
//!
//! For the same data and settings both report the same covariance at every
//! lag up to rounding. [`CtCalculator`] selects one at construction time.

mod direct;
mod fft;

pub use direct::DirectCt;
pub use fft::{FftCt, FftPlans};

use crate::errors::CovError;
use crate::profile::sub_profile;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Algorithm used to accumulate Ct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtAlgorithm {
    /// Site pair by site pair.
    Direct,
    /// FFT autocorrelation.
    #[default]
    Fft,
}

impl fmt::Display for CtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Fft => write!(f, "fft"),
        }
    }
}

impl std::str::FromStr for CtAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "fft" => Ok(Self::Fft),
            _ => Err(format!("Unknown Ct algorithm: {s}. Available: direct, fft")),
        }
    }
}

/// Layout of a Ct accumulator. Only accumulators of equal shape merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtShape {
    pub algorithm: CtAlgorithm,
    pub max_lag: usize,
    pub bias_corrected: bool,
    pub circular: bool,
}

impl CtShape {
    pub(crate) fn check(&self, other: &CtShape) -> Result<(), CovError> {
        if self == other {
            Ok(())
        } else {
            Err(CovError::ShapeMismatch {
                left: self.to_string(),
                right: other.to_string(),
            })
        }
    }
}

impl fmt::Display for CtShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(max_lag={}, bias_corrected={}, circular={})",
            self.algorithm, self.max_lag, self.bias_corrected, self.circular
        )
    }
}

/// Contract shared by the Ct accumulators.
///
/// Lags run over `0..max_lag`. Reading a lag that received no samples yields
/// a count of zero and a NaN covariance.
pub trait LagCovariance {
    fn shape(&self) -> CtShape;

    /// Feed one substitution profile.
    fn increment(&mut self, subs: &[f64]);

    /// Merge an accumulator of the same shape into this one.
    fn append(&mut self, other: &Self) -> Result<(), CovError>;

    /// Covariance at `lag`.
    fn result(&self, lag: usize) -> f64;

    /// Number of site pairs at `lag`.
    fn n(&self, lag: usize) -> usize;

    /// `mean(x) * mean(y)` at `lag`.
    fn mean_xy(&self, lag: usize) -> f64;

    fn max_lag(&self) -> usize {
        self.shape().max_lag
    }

    /// Covariances of every lag.
    fn results(&self) -> Vec<f64> {
        (0..self.max_lag()).map(|lag| self.result(lag)).collect()
    }

    /// Sample counts of every lag.
    fn counts(&self) -> Vec<usize> {
        (0..self.max_lag()).map(|lag| self.n(lag)).collect()
    }
}

/// A Ct accumulator whose algorithm is chosen at runtime.
#[derive(Debug, Clone)]
pub enum CtCalculator {
    Direct(DirectCt),
    Fft(FftCt),
}

impl CtCalculator {
    pub fn new(
        algorithm: CtAlgorithm,
        max_lag: usize,
        bias_corrected: bool,
        circular: bool,
    ) -> Self {
        Self::with_plans(
            CtShape {
                algorithm,
                max_lag,
                bias_corrected,
                circular,
            },
            &FftPlans::new(),
        )
    }

    /// Like [`CtCalculator::new`], reusing FFT plans from `plans`.
    pub fn with_plans(shape: CtShape, plans: &FftPlans) -> Self {
        let CtShape {
            algorithm,
            max_lag,
            bias_corrected,
            circular,
        } = shape;
        match algorithm {
            CtAlgorithm::Direct => Self::Direct(DirectCt::new(max_lag, bias_corrected, circular)),
            CtAlgorithm::Fft => Self::Fft(FftCt::with_plans(max_lag, bias_corrected, circular, plans)),
        }
    }

    pub fn algorithm(&self) -> CtAlgorithm {
        match self {
            Self::Direct(_) => CtAlgorithm::Direct,
            Self::Fft(_) => CtAlgorithm::Fft,
        }
    }
}

impl LagCovariance for CtCalculator {
    fn shape(&self) -> CtShape {
        match self {
            Self::Direct(ct) => ct.shape(),
            Self::Fft(ct) => ct.shape(),
        }
    }

    fn increment(&mut self, subs: &[f64]) {
        match self {
            Self::Direct(ct) => ct.increment(subs),
            Self::Fft(ct) => ct.increment(subs),
        }
    }

    fn append(&mut self, other: &Self) -> Result<(), CovError> {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => a.append(b),
            (Self::Fft(a), Self::Fft(b)) => a.append(b),
            (a, b) => Err(CovError::ShapeMismatch {
                left: a.shape().to_string(),
                right: b.shape().to_string(),
            }),
        }
    }

    fn result(&self, lag: usize) -> f64 {
        match self {
            Self::Direct(ct) => ct.result(lag),
            Self::Fft(ct) => ct.result(lag),
        }
    }

    fn n(&self, lag: usize) -> usize {
        match self {
            Self::Direct(ct) => ct.n(lag),
            Self::Fft(ct) => ct.n(lag),
        }
    }

    fn mean_xy(&self, lag: usize) -> f64 {
        match self {
            Self::Direct(ct) => ct.mean_xy(lag),
            Self::Fft(ct) => ct.mean_xy(lag),
        }
    }
}

fn calc_pairs<S, C, F>(sequences: &[S], fresh: F) -> Result<C, CovError>
where
    S: AsRef<[u8]> + Sync,
    C: LagCovariance + Send,
    F: Fn() -> C + Sync + Send,
{
    let n = sequences.len();
    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| ((i + 1)..n).map(move |j| (i, j)))
        .try_fold(&fresh, |mut ct, (i, j)| {
            let subs = sub_profile(sequences[i].as_ref(), sequences[j].as_ref())?;
            ct.increment(&subs);
            Ok(ct)
        })
        .try_reduce(&fresh, |mut a, b| {
            a.append(&b)?;
            Ok(a)
        })
}

/// Direct linear Ct over all pairs of one gene group.
pub fn calc_ct<S>(sequences: &[S], max_lag: usize, bias_corrected: bool) -> Result<DirectCt, CovError>
where
    S: AsRef<[u8]> + Sync,
{
    calc_pairs(sequences, || DirectCt::new(max_lag, bias_corrected, false))
}

/// FFT Ct over all pairs of one gene group.
pub fn calc_ct_fft<S>(sequences: &[S], max_lag: usize, circular: bool) -> Result<FftCt, CovError>
where
    S: AsRef<[u8]> + Sync,
{
    calc_pairs(sequences, || FftCt::new(max_lag, false, circular))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn close(a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()) + 1e-12
    }

    fn random_profiles(seed: u64, count: usize, len: usize, p: f64) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                (0..len)
                    .map(|_| if rng.gen_bool(p) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect()
    }

    fn assert_equivalent(bias_corrected: bool, circular: bool) {
        let profiles = random_profiles(7, 12, 97, 0.3);
        let max_lag = 40;
        let mut direct = CtCalculator::new(CtAlgorithm::Direct, max_lag, bias_corrected, circular);
        let mut fft = CtCalculator::new(CtAlgorithm::Fft, max_lag, bias_corrected, circular);
        for subs in &profiles {
            direct.increment(subs);
            fft.increment(subs);
        }
        for lag in 0..max_lag {
            assert_eq!(direct.n(lag), fft.n(lag), "count at lag {lag}");
            assert!(
                close(direct.result(lag), fft.result(lag)),
                "lag {lag}: direct {} vs fft {}",
                direct.result(lag),
                fft.result(lag)
            );
            assert!(close(direct.mean_xy(lag), fft.mean_xy(lag)));
        }
    }

    #[test]
    fn test_direct_fft_equivalence_linear() {
        assert_equivalent(false, false);
    }

    #[test]
    fn test_direct_fft_equivalence_circular() {
        assert_equivalent(false, true);
    }

    #[test]
    fn test_direct_fft_equivalence_bias_corrected() {
        assert_equivalent(true, false);
        assert_equivalent(true, true);
    }

    #[test]
    fn test_lag_zero_is_population_variance() {
        let profiles = random_profiles(11, 6, 50, 0.2);
        let pooled: Vec<f64> = profiles.iter().flatten().copied().collect();
        let mean = pooled.iter().sum::<f64>() / pooled.len() as f64;
        let var = pooled.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / pooled.len() as f64;

        for algorithm in [CtAlgorithm::Direct, CtAlgorithm::Fft] {
            let mut ct = CtCalculator::new(algorithm, 5, false, false);
            profiles.iter().for_each(|p| ct.increment(p));
            assert!(close(ct.result(0), var), "{algorithm}");
        }
    }

    #[test]
    fn test_alternating_profile_sign_pattern() {
        let subs: Vec<f64> = (0..64).map(|i| (i % 2) as f64).collect();
        for algorithm in [CtAlgorithm::Direct, CtAlgorithm::Fft] {
            let mut ct = CtCalculator::new(algorithm, 10, false, false);
            ct.increment(&subs);
            for lag in 0..10 {
                if lag % 2 == 0 {
                    assert!(ct.result(lag) > 0.0, "{algorithm} lag {lag}");
                } else {
                    assert!(ct.result(lag) < 0.0, "{algorithm} lag {lag}");
                }
            }
        }
    }

    #[test]
    fn test_lags_beyond_length_are_nan() {
        for algorithm in [CtAlgorithm::Direct, CtAlgorithm::Fft] {
            for circular in [false, true] {
                let mut ct = CtCalculator::new(algorithm, 8, false, circular);
                ct.increment(&[1.0, 0.0, 1.0]);
                let expected = if circular { 3 } else { 1 };
                assert_eq!(ct.n(2), expected);
                for lag in 3..8 {
                    assert_eq!(ct.n(lag), 0);
                    assert!(ct.result(lag).is_nan());
                }
            }
        }
    }

    #[test]
    fn test_mixed_algorithms_do_not_merge() {
        let mut a = CtCalculator::new(CtAlgorithm::Direct, 4, false, false);
        let b = CtCalculator::new(CtAlgorithm::Fft, 4, false, false);
        assert!(matches!(a.append(&b), Err(CovError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_calc_ct_agrees_with_fft() {
        let group = vec![
            b"ACGTACGTAAGG".to_vec(),
            b"ACGAACGTTAGG".to_vec(),
            b"TCGTACCTAAGC".to_vec(),
            b"ACGTACGTAAGG".to_vec(),
        ];
        let direct = calc_ct(&group, 6, false).unwrap();
        let fft = calc_ct_fft(&group, 6, false).unwrap();
        for lag in 0..6 {
            assert_eq!(direct.n(lag), fft.n(lag));
            assert!(close(direct.result(lag), fft.result(lag)), "lag {lag}");
        }
    }

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("fft".parse::<CtAlgorithm>().unwrap(), CtAlgorithm::Fft);
        assert_eq!("direct".parse::<CtAlgorithm>().unwrap(), CtAlgorithm::Direct);
        assert!("fftw".parse::<CtAlgorithm>().is_err());
        assert_eq!(CtAlgorithm::Direct.to_string(), "direct");
    }
}
