//! Ks and Ct accumulated together.

use crate::ct::{CtCalculator, CtShape, FftPlans, LagCovariance};
use crate::errors::CovError;
use crate::ks::KsCalculator;
use crate::profile::for_each_pair;

/// One Ks and one Ct accumulator fed from the same substitution profiles.
///
/// A fresh bundle is the identity of [`Calculators::append`], so bundles of
/// replicates can be reduced in any order.
#[derive(Debug, Clone)]
pub struct Calculators {
    ks: KsCalculator,
    ct: CtCalculator,
}

impl Calculators {
    pub fn new(shape: CtShape) -> Self {
        Self::with_plans(shape, &FftPlans::new())
    }

    /// A fresh bundle whose FFT accumulator shares `plans`.
    pub fn with_plans(shape: CtShape, plans: &FftPlans) -> Self {
        Self {
            ks: KsCalculator::new(),
            ct: CtCalculator::with_plans(shape, plans),
        }
    }

    /// Accumulate every gene group of one replicate into a fresh bundle.
    pub fn from_groups<S: AsRef<[u8]>>(shape: CtShape, groups: &[Vec<S>]) -> Result<Self, CovError> {
        Self::from_groups_with(shape, &FftPlans::new(), groups)
    }

    /// [`Calculators::from_groups`] with shared FFT plans.
    pub fn from_groups_with<S: AsRef<[u8]>>(
        shape: CtShape,
        plans: &FftPlans,
        groups: &[Vec<S>],
    ) -> Result<Self, CovError> {
        let mut calculators = Self::with_plans(shape, plans);
        for group in groups {
            calculators.add_group(group)?;
        }
        Ok(calculators)
    }

    /// Feed one substitution profile to both accumulators.
    pub fn increment(&mut self, subs: &[f64]) {
        self.ks.increment(subs);
        self.ct.increment(subs);
    }

    /// Feed every sequence pair of one aligned gene group.
    pub fn add_group<S: AsRef<[u8]>>(&mut self, sequences: &[S]) -> Result<(), CovError> {
        for_each_pair(sequences, |subs| self.increment(subs))
    }

    /// Merge a bundle of the same shape into this one.
    pub fn append(&mut self, other: &Calculators) -> Result<(), CovError> {
        self.ct.append(&other.ct)?;
        self.ks.append(&other.ks);
        Ok(())
    }

    pub fn shape(&self) -> CtShape {
        self.ct.shape()
    }

    pub fn ks(&self) -> &KsCalculator {
        &self.ks
    }

    pub fn ct(&self) -> &CtCalculator {
        &self.ct
    }

    /// True until the first profile has been fed.
    pub fn is_empty(&self) -> bool {
        self.ks.n() == 0
    }
}
