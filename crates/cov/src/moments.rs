//! Streaming first and second moments.
//!
//! Both accumulators use Welford-style updates so that rounding error does not
//! grow with the number of samples, and both merge with the pooled-moment
//! formulas of Chan et al., which makes them monoid elements: the empty
//! accumulator is the identity and `append` is associative and commutative up
//! to floating-point rounding.
//!
//! # References
//!
//! Chan, T. F., Golub, G. H., & LeVeque, R. J. (1979). Updating formulae and a
//! pairwise algorithm for computing sample variances. Stanford CS report.

/// Running mean and variance of a univariate sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanVar {
    n: usize,
    mean: f64,
    m2: f64,
}

impl MeanVar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    #[inline]
    pub fn increment(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Merge another accumulator into this one.
    pub fn append(&mut self, other: &MeanVar) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = *other;
            return;
        }

        let n = self.n + other.n;
        let (na, nb) = (self.n as f64, other.n as f64);
        let delta = other.mean - self.mean;
        self.mean += delta * nb / n as f64;
        self.m2 += other.m2 + delta * delta * na * nb / n as f64;
        self.n = n;
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Sample mean, NaN when empty.
    pub fn mean(&self) -> f64 {
        if self.n == 0 { f64::NAN } else { self.mean }
    }

    /// Unbiased sample variance (divides by `n - 1`), NaN below two samples.
    pub fn variance(&self) -> f64 {
        if self.n < 2 {
            f64::NAN
        } else {
            self.m2 / (self.n - 1) as f64
        }
    }

    /// Population variance (divides by `n`), NaN when empty.
    pub fn population_variance(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.m2 / self.n as f64
        }
    }

    /// Standard error of the mean.
    pub fn std_error(&self) -> f64 {
        (self.variance() / self.n as f64).sqrt()
    }
}

/// Running covariance of a bivariate sample `(x, y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BivariateCovariance {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    comoment: f64,
    bias_corrected: bool,
}

impl BivariateCovariance {
    /// Create an empty accumulator.
    ///
    /// With `bias_corrected` the result divides the co-moment by `n - 1`,
    /// otherwise by `n`.
    pub fn new(bias_corrected: bool) -> Self {
        Self {
            bias_corrected,
            ..Self::default()
        }
    }

    #[inline]
    pub fn increment(&mut self, x: f64, y: f64) {
        self.n += 1;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        self.mean_y += (y - self.mean_y) / n;
        self.comoment += dx * (y - self.mean_y);
    }

    pub fn append(&mut self, other: &BivariateCovariance) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            let bias_corrected = self.bias_corrected;
            *self = *other;
            self.bias_corrected = bias_corrected;
            return;
        }

        let n = (self.n + other.n) as f64;
        let (na, nb) = (self.n as f64, other.n as f64);
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        self.mean_x += dx * nb / n;
        self.mean_y += dy * nb / n;
        self.comoment += other.comoment + dx * dy * na * nb / n;
        self.n += other.n;
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn mean_x(&self) -> f64 {
        if self.n == 0 { f64::NAN } else { self.mean_x }
    }

    pub fn mean_y(&self) -> f64 {
        if self.n == 0 { f64::NAN } else { self.mean_y }
    }

    pub fn bias_corrected(&self) -> bool {
        self.bias_corrected
    }

    /// Covariance, or NaN when there are too few samples for the divisor.
    pub fn result(&self) -> f64 {
        match (self.n, self.bias_corrected) {
            (0, _) | (1, true) => f64::NAN,
            (n, true) => self.comoment / (n - 1) as f64,
            (n, false) => self.comoment / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_mean_var_basic() {
        let mut mv = MeanVar::new();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            mv.increment(x);
        }
        assert_eq!(mv.n(), 8);
        assert!(approx_eq(mv.mean(), 5.0, 1e-12));
        assert!(approx_eq(mv.population_variance(), 4.0, 1e-12));
        assert!(approx_eq(mv.variance(), 32.0 / 7.0, 1e-12));
    }

    #[test]
    fn test_mean_var_empty_is_nan() {
        let mv = MeanVar::new();
        assert!(mv.mean().is_nan());
        assert!(mv.variance().is_nan());
        assert!(mv.population_variance().is_nan());
    }

    #[test]
    fn test_mean_var_append_matches_single_pass() {
        let data: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 * 0.3).collect();
        let mut whole = MeanVar::new();
        data.iter().for_each(|&x| whole.increment(x));

        let (left, right) = data.split_at(17);
        let mut a = MeanVar::new();
        let mut b = MeanVar::new();
        left.iter().for_each(|&x| a.increment(x));
        right.iter().for_each(|&x| b.increment(x));
        a.append(&b);

        assert_eq!(a.n(), whole.n());
        assert!(approx_eq(a.mean(), whole.mean(), 1e-12));
        assert!(approx_eq(a.variance(), whole.variance(), 1e-12));
    }

    #[test]
    fn test_mean_var_identity() {
        let mut a = MeanVar::new();
        a.increment(1.0);
        a.increment(3.0);
        let before = a;
        a.append(&MeanVar::new());
        assert_eq!(a, before);

        let mut empty = MeanVar::new();
        empty.append(&before);
        assert_eq!(empty, before);
    }

    #[test]
    fn test_covariance_of_linear_relation() {
        let mut cov = BivariateCovariance::new(false);
        for i in 0..10 {
            let x = i as f64;
            cov.increment(x, 2.0 * x + 1.0);
        }
        // Var(x) for 0..9 is 8.25, so Cov(x, 2x + 1) = 16.5.
        assert!(approx_eq(cov.result(), 16.5, 1e-12));
        assert!(approx_eq(cov.mean_x(), 4.5, 1e-12));
        assert!(approx_eq(cov.mean_y(), 10.0, 1e-12));
    }

    #[test]
    fn test_covariance_bias_correction() {
        let mut biased = BivariateCovariance::new(false);
        let mut unbiased = BivariateCovariance::new(true);
        for (x, y) in [(1.0, 2.0), (2.0, 1.0), (3.0, 5.0), (4.0, 3.0)] {
            biased.increment(x, y);
            unbiased.increment(x, y);
        }
        assert!(approx_eq(unbiased.result(), biased.result() * 4.0 / 3.0, 1e-12));
    }

    #[test]
    fn test_covariance_too_few_samples() {
        let mut cov = BivariateCovariance::new(true);
        assert!(cov.result().is_nan());
        cov.increment(1.0, 1.0);
        assert!(cov.result().is_nan());
        assert!(BivariateCovariance::new(false).result().is_nan());
    }

    #[test]
    fn test_covariance_append_matches_single_pass() {
        let xs: Vec<f64> = (0..40).map(|i| (i % 3) as f64).collect();
        let ys: Vec<f64> = (0..40).map(|i| (i % 5) as f64).collect();

        let mut whole = BivariateCovariance::new(false);
        let mut a = BivariateCovariance::new(false);
        let mut b = BivariateCovariance::new(false);
        for i in 0..40 {
            whole.increment(xs[i], ys[i]);
            if i < 13 {
                a.increment(xs[i], ys[i]);
            } else {
                b.increment(xs[i], ys[i]);
            }
        }
        a.append(&b);

        assert_eq!(a.n(), 40);
        assert!(approx_eq(a.result(), whole.result(), 1e-12));
        assert!(approx_eq(a.mean_x() * a.mean_y(), whole.mean_x() * whole.mean_y(), 1e-12));
    }
}
