//! Site-by-site decomposition of the lag covariance.
//!
//! For every site `i` and lag `l`, the indicators `x = [a_i != b_i]` and
//! `y = [a_{i+l} != b_{i+l}]` are taken over all sequence pairs `(a, b)` of
//! the group. The covariance of the pooled sample splits into the mean of the
//! per-site covariances (Cs) plus the covariance of the per-site means (Cr).

use crate::errors::CovError;
use crate::moments::{BivariateCovariance, MeanVar};
use crate::profile::pair_count;
use rayon::prelude::*;

/// Law of total covariance over rows of `(x, y)` samples.
///
/// Each row contributes its mean cross product `xy`, its marginal means
/// `xbar` and `ybar`, and its sample size `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanCov {
    xy: f64,
    xbar: f64,
    ybar: f64,
    n: usize,
    within: MeanVar,
    between: BivariateCovariance,
}

impl MeanCov {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, xy: f64, xbar: f64, ybar: f64, n: usize) {
        let w = n as f64;
        self.xy += xy * w;
        self.xbar += xbar * w;
        self.ybar += ybar * w;
        self.n += n;
        self.within.increment(xy - xbar * ybar);
        self.between.increment(xbar, ybar);
    }

    /// Mean of the per-row covariances.
    pub fn within(&self) -> f64 {
        self.within.mean()
    }

    /// Population covariance of the per-row means.
    pub fn between(&self) -> f64 {
        self.between.result()
    }

    /// Covariance of all samples pooled. Equals `within + between` when every
    /// row has the same size.
    pub fn total(&self) -> f64 {
        let n = self.n as f64;
        self.xy / n - (self.xbar / n) * (self.ybar / n)
    }

    /// Pooled mean cross product.
    pub fn mean_xy(&self) -> f64 {
        self.xy / self.n as f64
    }

    /// Number of rows added.
    pub fn rows(&self) -> usize {
        self.within.n()
    }

    /// Number of samples over all rows.
    pub fn n(&self) -> usize {
        self.n
    }
}

/// Number of equal unordered pairs among `values`.
fn same_pairs<T: Ord>(values: &mut [T]) -> usize {
    values.sort_unstable();
    let mut same = 0;
    let mut run = 0;
    for k in 0..values.len() {
        run = if k > 0 && values[k] == values[k - 1] { run + 1 } else { 0 };
        same += run;
    }
    same
}

/// Split the linear lag covariance of one gene group by site.
///
/// Entry `l` of the result holds one row per site `i` with `i + l` inside the
/// alignment, each row pooling all sequence pairs.
///
/// # Examples
///
/// ```
/// use simmlst_cov::cs::calc_cs;
///
/// let rows = calc_cs(&[b"AAAA", b"CACA"], 1).unwrap();
/// assert_eq!(rows[0].rows(), 4);
/// assert_eq!(rows[0].within(), 0.0);
/// assert!((rows[0].between() - 0.25).abs() < 1e-12);
/// ```
pub fn calc_cs<S: AsRef<[u8]> + Sync>(sequences: &[S], max_lag: usize) -> Result<Vec<MeanCov>, CovError> {
    let seqs: Vec<&[u8]> = sequences.iter().map(|s| s.as_ref()).collect();
    let len = seqs.first().map_or(0, |s| s.len());
    if let Some(other) = seqs.iter().find(|s| s.len() != len) {
        return Err(CovError::LengthMismatch {
            len1: len,
            len2: other.len(),
        });
    }

    let pairs = pair_count(seqs.len());
    if pairs == 0 {
        return Ok(vec![MeanCov::new(); max_lag]);
    }

    let mut column = Vec::with_capacity(seqs.len());
    let same: Vec<usize> = (0..len)
        .map(|i| {
            column.clear();
            column.extend(seqs.iter().map(|s| s[i]));
            same_pairs(&mut column)
        })
        .collect();

    let total = pairs as f64;
    let rows = (0..max_lag)
        .into_par_iter()
        .map(|lag| {
            let mut acc = MeanCov::new();
            let mut joint = Vec::with_capacity(seqs.len());
            for i in 0..len.saturating_sub(lag) {
                let j = i + lag;
                joint.clear();
                joint.extend(seqs.iter().map(|s| (s[i], s[j])));
                let same_both = same_pairs(&mut joint);
                let diff_both = pairs + same_both - same[i] - same[j];
                acc.add(
                    diff_both as f64 / total,
                    (pairs - same[i]) as f64 / total,
                    (pairs - same[j]) as f64 / total,
                    pairs,
                );
            }
            acc
        })
        .collect();
    Ok(rows)
}
