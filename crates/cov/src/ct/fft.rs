use super::{CtAlgorithm, CtShape, LagCovariance};
use crate::errors::CovError;
use crate::moments::MeanVar;
use rustfft::num_complex::Complex64;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Autocorrelation of real vectors of one fixed length through the FFT.
///
/// Linear mode zero-pads to at least `2 * len - 1` points so lags never wrap;
/// circular mode transforms exactly `len` points. The overlap count of every
/// lag comes from transforming an all-ones mask the same way.
struct AutoCorrelator {
    len: usize,
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    overlaps: Vec<usize>,
}

impl AutoCorrelator {
    fn new(len: usize, circular: bool) -> Self {
        let size = if circular {
            len
        } else {
            (2 * len - 1).next_power_of_two()
        };
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        debug!(len, size, circular, "Planned FFT autocorrelation");

        let mut correlator = Self {
            len,
            size,
            forward,
            inverse,
            overlaps: Vec::new(),
        };
        let mask = vec![1.0; len];
        correlator.overlaps = correlator
            .autocorr(&mask)
            .into_iter()
            .map(|v| v.round().max(0.0) as usize)
            .collect();
        correlator
    }

    /// Raw lag sums `r[l] = sum_k x[k] * x[k + l]` for `l` in `0..len`.
    fn autocorr(&self, xs: &[f64]) -> Vec<f64> {
        let mut buf: Vec<Complex64> = xs.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        buf.resize(self.size, Complex64::zero());

        self.forward.process(&mut buf);
        for c in buf.iter_mut() {
            *c = Complex64::new(c.norm_sqr(), 0.0);
        }
        self.inverse.process(&mut buf);

        // rustfft does not scale the inverse transform
        let scale = 1.0 / self.size as f64;
        buf[..self.len].iter().map(|c| c.re * scale).collect()
    }
}

impl fmt::Debug for AutoCorrelator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoCorrelator")
            .field("len", &self.len)
            .field("size", &self.size)
            .finish()
    }
}

/// Autocorrelation plans keyed by profile length and mode.
///
/// Clones share one cache, so every accumulator built from the same handle
/// plans each length once.
#[derive(Debug, Clone, Default)]
pub struct FftPlans {
    cache: Arc<Mutex<HashMap<(usize, bool), Arc<AutoCorrelator>>>>,
}

impl FftPlans {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, len: usize, circular: bool) -> Arc<AutoCorrelator> {
        // a poisoned cache still holds complete plans
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            cache
                .entry((len, circular))
                .or_insert_with(|| Arc::new(AutoCorrelator::new(len, circular))),
        )
    }

    /// Number of distinct plans built so far.
    pub fn len(&self) -> usize {
        self.cache.lock().map_or_else(|e| e.into_inner().len(), |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lag covariance accumulated from FFT autocorrelations.
///
/// Per lag the accumulator only keeps linear sums: the cross-product sum, the
/// overlap count, and the sums of the left (`x`) and right (`y`) members of
/// every site pair at that lag. Merging therefore adds numbers and is exact.
#[derive(Debug, Clone)]
pub struct FftCt {
    max_lag: usize,
    bias_corrected: bool,
    circular: bool,
    xys: Vec<f64>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    counts: Vec<usize>,
    mean: MeanVar,
    plans: FftPlans,
    plan: Option<Arc<AutoCorrelator>>,
}

impl FftCt {
    pub fn new(max_lag: usize, bias_corrected: bool, circular: bool) -> Self {
        Self::with_plans(max_lag, bias_corrected, circular, &FftPlans::new())
    }

    /// An accumulator drawing its plans from a shared cache.
    pub fn with_plans(max_lag: usize, bias_corrected: bool, circular: bool, plans: &FftPlans) -> Self {
        Self {
            max_lag,
            bias_corrected,
            circular,
            xys: vec![0.0; max_lag],
            xs: vec![0.0; max_lag],
            ys: vec![0.0; max_lag],
            counts: vec![0; max_lag],
            mean: MeanVar::new(),
            plans: plans.clone(),
            plan: None,
        }
    }

    /// Running mean of every raw indicator value.
    pub fn mean(&self) -> f64 {
        self.mean.mean()
    }

    /// Sum of cross-products at `lag`.
    pub fn raw_xy(&self, lag: usize) -> f64 {
        self.xys[lag]
    }
}

impl LagCovariance for FftCt {
    fn shape(&self) -> CtShape {
        CtShape {
            algorithm: CtAlgorithm::Fft,
            max_lag: self.max_lag,
            bias_corrected: self.bias_corrected,
            circular: self.circular,
        }
    }

    fn increment(&mut self, subs: &[f64]) {
        let len = subs.len();
        if len == 0 {
            return;
        }
        for &x in subs {
            self.mean.increment(x);
        }

        if matches!(&self.plan, Some(p) if p.len != len) {
            self.plan = None;
        }
        let circular = self.circular;
        let plans = &self.plans;
        let plan = self.plan.get_or_insert_with(|| plans.get(len, circular));
        let raw = plan.autocorr(subs);

        let mut prefix = Vec::with_capacity(len + 1);
        prefix.push(0.0);
        let mut acc = 0.0;
        for &x in subs {
            acc += x;
            prefix.push(acc);
        }
        let total = acc;

        for lag in 0..self.max_lag.min(len) {
            self.xys[lag] += raw[lag];
            self.counts[lag] += plan.overlaps[lag];
            if circular {
                self.xs[lag] += total;
                self.ys[lag] += total;
            } else {
                self.xs[lag] += prefix[len - lag];
                self.ys[lag] += total - prefix[lag];
            }
        }
    }

    fn append(&mut self, other: &Self) -> Result<(), CovError> {
        self.shape().check(&other.shape())?;
        self.mean.append(&other.mean);
        for lag in 0..self.max_lag {
            self.xys[lag] += other.xys[lag];
            self.xs[lag] += other.xs[lag];
            self.ys[lag] += other.ys[lag];
            self.counts[lag] += other.counts[lag];
        }
        Ok(())
    }

    fn result(&self, lag: usize) -> f64 {
        let n = self.counts[lag];
        if n == 0 || (self.bias_corrected && n < 2) {
            return f64::NAN;
        }
        let nf = n as f64;
        let cov = self.xys[lag] / nf - self.mean_xy(lag);
        if self.bias_corrected {
            cov * nf / (nf - 1.0)
        } else {
            cov
        }
    }

    fn n(&self, lag: usize) -> usize {
        self.counts[lag]
    }

    fn mean_xy(&self, lag: usize) -> f64 {
        let n = self.counts[lag] as f64;
        (self.xs[lag] / n) * (self.ys[lag] / n)
    }
}
