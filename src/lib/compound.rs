//! Closed-form Beta-Binomial quantities.
//!
//! The mass function is evaluated through the log-gamma identity
//!
//! ```text
//! ln f(k | r, a, b) = lnΓ(r+1) + lnΓ(k+a) + lnΓ(r-k+b) + lnΓ(a+b)
//!                   - lnΓ(k+1) - lnΓ(r-k+1) - lnΓ(r+a+b) - lnΓ(a) - lnΓ(b)
//! ```
//!
//! which stays finite for trial counts where the binomial coefficient and the
//! beta functions would overflow on their own.
use crate::params::HyperParams;
use statrs::function::gamma::ln_gamma;

/// Log mass at a real-valued `k`, for `0 <= k <= r`.
pub fn ln_density(k: f64, r: f64, params: &HyperParams) -> f64 {
    if k < 0.0 || k > r {
        return f64::NEG_INFINITY;
    }
    let (a, b) = (params.a, params.b);
    (ln_gamma(r + 1.0) + ln_gamma(k + a) + ln_gamma(r - k + b) + ln_gamma(a + b))
        - (ln_gamma(k + 1.0)
            + ln_gamma(r - k + 1.0)
            + ln_gamma(r + a + b)
            + ln_gamma(a)
            + ln_gamma(b))
}

pub fn ln_pmf(k: u64, r: u64, params: &HyperParams) -> f64 {
    ln_density(k as f64, r as f64, params)
}

pub fn pmf(k: u64, r: u64, params: &HyperParams) -> f64 {
    ln_pmf(k, r, params).exp()
}

/// E[X] = r · a / (a + b)
pub fn mean(r: u64, params: &HyperParams) -> f64 {
    r as f64 * params.mean()
}

/// Var[X] = r·a·b·(a + b + r) / ((a + b)²·(a + b + 1))
pub fn variance(r: u64, params: &HyperParams) -> f64 {
    let r = r as f64;
    let s = params.a + params.b;
    r * params.a * params.b * (s + r) / (s * s * (s + 1.0))
}

/// Mass at every `k` in `0..=r`.
pub fn pmf_table(r: u64, params: &HyperParams) -> Vec<(u64, f64)> {
    (0..=r).map(|k| (k, pmf(k, r, params))).collect()
}

/// `f(k | r, a, b)` with `r`, `a` and `b` bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompoundDistribution {
    pub n_trials: u64,
    pub params: HyperParams,
}

impl CompoundDistribution {
    pub fn new(n_trials: u64, params: HyperParams) -> Self {
        Self { n_trials, params }
    }

    pub fn pmf(&self, k: u64) -> f64 {
        pmf(k, self.n_trials, &self.params)
    }

    /// The mass function continued to real `x`, as drawn by the posterior plot.
    pub fn density(&self, x: f64) -> f64 {
        ln_density(x, self.n_trials as f64, &self.params).exp()
    }

    pub fn mean(&self) -> f64 {
        mean(self.n_trials, &self.params)
    }

    pub fn variance(&self) -> f64 {
        variance(self.n_trials, &self.params)
    }

    pub fn table(&self) -> Vec<(u64, f64)> {
        pmf_table(self.n_trials, &self.params)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(a: f64, b: f64) -> HyperParams {
        HyperParams::new(a, b).unwrap()
    }

    #[test]
    fn test_uniform_prior_is_discrete_uniform() {
        // Beta(1, 1) mixes into a uniform over 0..=r
        let uniform = params(1.0, 1.0);
        for k in 0..=10 {
            assert!((pmf(k, 10, &uniform) - 1.0 / 11.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_table_sums_to_one() {
        for (a, b, r) in vec![(10.0, 20.0, 30), (0.5, 0.5, 7), (60.0, 30.0, 100)] {
            let total: f64 = pmf_table(r, &params(a, b)).iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-9, "a={}, b={}, r={}: {}", a, b, r, total);
        }
    }

    #[test]
    fn test_single_trial_is_bernoulli() {
        let p = params(10.0, 20.0);
        assert!((pmf(1, 1, &p) - 1.0 / 3.0).abs() < 1e-10);
        assert!((pmf(0, 1, &p) - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_outside_support() {
        assert_eq!(pmf(11, 10, &params(2.0, 3.0)), 0.0);
        assert_eq!(ln_density(-0.5, 10.0, &params(2.0, 3.0)), f64::NEG_INFINITY);
    }

    #[test]
    fn test_large_trial_count_stays_finite() {
        let p = params(200.0, 300.0);
        let value = pmf(2_000, 5_000, &p);
        assert!(value.is_finite());
        assert!(value > 0.0);
    }

    #[test]
    fn test_mean_matches_table() {
        let dist = CompoundDistribution::new(12, params(3.0, 5.0));
        let from_table: f64 = dist.table().iter().map(|&(k, p)| k as f64 * p).sum();
        assert!((from_table - dist.mean()).abs() < 1e-9);
        assert!((dist.mean() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_variance_matches_table() {
        let dist = CompoundDistribution::new(12, params(3.0, 5.0));
        let mean = dist.mean();
        let from_table: f64 = dist
            .table()
            .iter()
            .map(|&(k, p)| (k as f64 - mean).powi(2) * p)
            .sum();
        assert!((from_table - dist.variance()).abs() < 1e-9);
    }

    #[test]
    fn test_density_agrees_with_pmf_at_integers() {
        let dist = CompoundDistribution::new(10, params(2.0, 4.0));
        for k in 0..=10 {
            assert!((dist.density(k as f64) - dist.pmf(k)).abs() < 1e-12);
        }
    }
}
