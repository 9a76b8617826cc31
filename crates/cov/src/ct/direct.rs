use super::{CtAlgorithm, CtShape, LagCovariance};
use crate::errors::CovError;
use crate::moments::BivariateCovariance;

/// Lag covariance accumulated site pair by site pair.
///
/// Every lag owns a [`BivariateCovariance`] that is fed `(subs[k], subs[k + l])`
/// for every valid start `k`. The cost is `O(L * max_lag)` per profile, which
/// makes this the reference the FFT accumulator is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectCt {
    corrs: Vec<BivariateCovariance>,
    bias_corrected: bool,
    circular: bool,
}

impl DirectCt {
    pub fn new(max_lag: usize, bias_corrected: bool, circular: bool) -> Self {
        Self {
            corrs: vec![BivariateCovariance::new(bias_corrected); max_lag],
            bias_corrected,
            circular,
        }
    }

    /// Add a single `(x, y)` sample at `lag`.
    ///
    /// # Panics
    ///
    /// Panics if `lag >= max_lag`.
    #[inline]
    pub fn increment_at(&mut self, lag: usize, x: f64, y: f64) {
        self.corrs[lag].increment(x, y);
    }

    /// Per-lag covariance states.
    pub fn lags(&self) -> &[BivariateCovariance] {
        &self.corrs
    }
}

impl LagCovariance for DirectCt {
    fn shape(&self) -> CtShape {
        CtShape {
            algorithm: CtAlgorithm::Direct,
            max_lag: self.corrs.len(),
            bias_corrected: self.bias_corrected,
            circular: self.circular,
        }
    }

    fn increment(&mut self, subs: &[f64]) {
        let len = subs.len();
        for (lag, cov) in self.corrs.iter_mut().enumerate() {
            if self.circular {
                if lag >= len {
                    break;
                }
                for k in 0..len {
                    cov.increment(subs[k], subs[(k + lag) % len]);
                }
            } else {
                for k in 0..len.saturating_sub(lag) {
                    cov.increment(subs[k], subs[k + lag]);
                }
            }
        }
    }

    fn append(&mut self, other: &Self) -> Result<(), CovError> {
        self.shape().check(&other.shape())?;
        for (a, b) in self.corrs.iter_mut().zip(&other.corrs) {
            a.append(b);
        }
        Ok(())
    }

    fn result(&self, lag: usize) -> f64 {
        self.corrs[lag].result()
    }

    fn n(&self, lag: usize) -> usize {
        self.corrs[lag].n()
    }

    fn mean_xy(&self, lag: usize) -> f64 {
        let cov = &self.corrs[lag];
        cov.mean_x() * cov.mean_y()
    }
}
