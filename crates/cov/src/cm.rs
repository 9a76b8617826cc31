//! Lag covariance averaged over sequence pairs.
//!
//! Unlike [`crate::ct`], which pools every site pair of every sequence pair
//! into one covariance, this computes a circular covariance per sequence pair
//! around that pair's own divergence and then averages over pairs.

use crate::errors::CovError;
use crate::profile::for_each_pair;
use tracing::trace;

/// Per-pair circular covariance of one gene group.
#[derive(Debug, Clone, PartialEq)]
pub struct PairCovariance {
    /// Mean over pairs of `P(x_k = 1, x_{k+l} = 1) - d^2`.
    pub cm: Vec<f64>,
    /// `cm` scaled by `1 / ks`.
    pub cm2: Vec<f64>,
    /// Mean per-pair divergence.
    pub ks: f64,
    /// Variance of the per-pair divergence over pairs.
    pub vd: f64,
    /// Pairs contributing to every lag.
    pub n: Vec<usize>,
}

/// Compute Cm, Cm2, Ks and Vd over all pairs of one aligned gene group.
///
/// For a pair with `L` sites and substitution indicator `x`, lag `l < L`
/// contributes `(1/L) * sum_k x[k] * x[(k + l) % L] - d^2` where `d` is the
/// pair's divergence. Lags with no contributing pair are NaN.
///
/// # Examples
///
/// ```
/// use simmlst_cov::cm::calc_cm;
///
/// let cov = calc_cm(&[b"AAAA", b"CACA"], 2).unwrap();
/// assert_eq!(cov.ks, 0.5);
/// assert_eq!(cov.cm, vec![0.25, -0.25]);
/// ```
pub fn calc_cm<S: AsRef<[u8]>>(sequences: &[S], max_lag: usize) -> Result<PairCovariance, CovError> {
    let mut sums = vec![0.0; max_lag];
    let mut n = vec![0usize; max_lag];
    let mut hits = vec![0usize; max_lag];
    let mut positions = Vec::new();
    let (mut d_sum, mut d2_sum, mut pairs) = (0.0, 0.0, 0usize);

    for_each_pair(sequences, |subs| {
        let len = subs.len();
        if len == 0 {
            return;
        }
        positions.clear();
        positions.extend((0..len).filter(|&k| subs[k] != 0.0));

        hits.iter_mut().for_each(|h| *h = 0);
        for &p in &positions {
            for &q in &positions {
                let lag = (q + len - p) % len;
                if lag < max_lag {
                    hits[lag] += 1;
                }
            }
        }

        let d = positions.len() as f64 / len as f64;
        d_sum += d;
        d2_sum += d * d;
        pairs += 1;
        for lag in 0..max_lag.min(len) {
            sums[lag] += hits[lag] as f64 / len as f64 - d * d;
            n[lag] += 1;
        }
    })?;

    let ks = d_sum / pairs as f64;
    let vd = d2_sum / pairs as f64 - ks * ks;
    let cm: Vec<f64> = sums
        .iter()
        .zip(&n)
        .map(|(&s, &c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect();
    let cm2 = cm.iter().map(|&v| v / ks).collect();
    trace!(pairs, ks, "Per-pair covariance computed");

    Ok(PairCovariance { cm, cm2, ks, vd, n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ct::{calc_ct_fft, LagCovariance};

    #[test]
    fn test_alternating_pair() {
        let cov = calc_cm(&[b"AAAA", b"CACA"], 6).unwrap();
        assert_eq!(cov.ks, 0.5);
        assert_eq!(cov.vd, 0.0);
        assert_eq!(&cov.cm[..4], &[0.25, -0.25, 0.25, -0.25]);
        assert_eq!(&cov.cm2[..4], &[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(cov.n, vec![1, 1, 1, 1, 0, 0]);
        assert!(cov.cm[4].is_nan());
    }

    #[test]
    fn test_single_pair_matches_circular_ct() {
        let seqs: [&[u8]; 2] = [b"ACGTTGCAACGTAGGA", b"ACCTTGAAACGTTGCA"];
        let cov = calc_cm(&seqs, 10).unwrap();
        let ct = calc_ct_fft(&seqs, 10, true).unwrap();
        for lag in 0..10 {
            assert!((cov.cm[lag] - ct.result(lag)).abs() < 1e-9, "lag {lag}");
        }
    }

    #[test]
    fn test_divergence_variance_over_pairs() {
        // pair divergences: 1/4, 2/4, 1/4
        let cov = calc_cm(&[b"AAAA", b"CAAA", b"ACAA"], 2).unwrap();
        let ds = [0.25, 0.5, 0.25];
        let mean = ds.iter().sum::<f64>() / 3.0;
        let var = ds.iter().map(|d| d * d).sum::<f64>() / 3.0 - mean * mean;
        assert!((cov.ks - mean).abs() < 1e-12);
        assert!((cov.vd - var).abs() < 1e-12);
        assert_eq!(cov.n, vec![3, 3]);
    }

    #[test]
    fn test_identical_sequences() {
        let cov = calc_cm(&[b"ACGT", b"ACGT"], 3).unwrap();
        assert_eq!(cov.ks, 0.0);
        assert_eq!(cov.cm, vec![0.0; 3]);
        assert!(cov.cm2.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_fewer_than_two_sequences() {
        let cov = calc_cm(&[b"ACGT"], 3).unwrap();
        assert!(cov.ks.is_nan());
        assert!(cov.cm.iter().all(|v| v.is_nan()));
        assert_eq!(cov.n, vec![0; 3]);
    }

    #[test]
    fn test_unequal_lengths_are_rejected() {
        let err = calc_cm(&[b"ACGT".as_slice(), b"ACG".as_slice()], 3).unwrap_err();
        assert_eq!(err, CovError::LengthMismatch { len1: 4, len2: 3 });
    }
}
