//! Pooled divergence (Ks) between homologous sequences.

use crate::errors::CovError;
use crate::moments::MeanVar;
use crate::profile::sub_profile;
use rayon::prelude::*;

/// Running mean/variance of every substitution indicator seen so far.
///
/// The mean is the pooled divergence estimate: the fraction of differing
/// sites over all pairs and all sites.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KsCalculator {
    mv: MeanVar,
}

impl KsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed every site of one substitution profile.
    pub fn increment(&mut self, subs: &[f64]) {
        for &x in subs {
            self.mv.increment(x);
        }
    }

    pub fn append(&mut self, other: &KsCalculator) {
        self.mv.append(&other.mv);
    }

    pub fn mean(&self) -> f64 {
        self.mv.mean()
    }

    pub fn n(&self) -> usize {
        self.mv.n()
    }

    pub fn variance(&self) -> f64 {
        self.mv.variance()
    }

    pub fn std_error(&self) -> f64 {
        self.mv.std_error()
    }

    pub fn moments(&self) -> &MeanVar {
        &self.mv
    }
}

/// Compute Ks over all pairs of one gene group.
pub fn calc_ks<S>(sequences: &[S]) -> Result<KsCalculator, CovError>
where
    S: AsRef<[u8]> + Sync,
{
    let n = sequences.len();
    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| ((i + 1)..n).map(move |j| (i, j)))
        .try_fold(KsCalculator::new, |mut ks, (i, j)| {
            let subs = sub_profile(sequences[i].as_ref(), sequences[j].as_ref())?;
            ks.increment(&subs);
            Ok(ks)
        })
        .try_reduce(KsCalculator::new, |mut a, b| {
            a.append(&b);
            Ok(a)
        })
}
