use crate::compound;
use crate::error::{BetaBinomialError, Result};
use crate::params::HyperParams;
use log::debug;
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Beta;

/// Source of randomness and closed-form distribution queries used by the model.
pub trait ProbabilityEngine {
    /// Draw `p ~ Beta(a, b)`.
    fn sample_beta(&mut self, params: &HyperParams) -> Result<f64>;

    /// Draw one Bernoulli(p) outcome.
    fn sample_bernoulli(&mut self, p: f64) -> Result<bool>;

    /// Draw `r` outcomes that all condition on the same `p`.
    fn sample_bernoulli_row(&mut self, p: f64, r: usize) -> Result<Vec<bool>> {
        (0..r).map(|_| self.sample_bernoulli(p)).collect()
    }

    fn beta_binomial_expectation(&self, n: u64, params: &HyperParams) -> f64 {
        compound::mean(n, params)
    }

    fn beta_binomial_pmf(&self, k: u64, n: u64, params: &HyperParams) -> f64 {
        compound::pmf(k, n, params)
    }
}

/// `ProbabilityEngine` backed by `statrs` distributions.
#[derive(Clone, Debug)]
pub struct StatrsEngine<R: Rng = StdRng> {
    rng: R,
}

impl StatrsEngine<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> StatrsEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

fn bernoulli(p: f64) -> Result<Bernoulli> {
    Bernoulli::new(p).map_err(|_| BetaBinomialError::InvalidProbability(p))
}

impl<R: Rng> ProbabilityEngine for StatrsEngine<R> {
    fn sample_beta(&mut self, params: &HyperParams) -> Result<f64> {
        let beta = Beta::new(params.a, params.b).map_err(|_| {
            let (name, value) = if params.a.is_finite() && params.a > 0.0 {
                ("b", params.b)
            } else {
                ("a", params.a)
            };
            BetaBinomialError::InvalidParameter { name, value }
        })?;
        let p = beta.sample(&mut self.rng);
        if p.is_finite() {
            return Ok(p);
        }
        // Both gamma draws underflow to zero for tiny shapes. In that limit
        // Beta(a, b) collapses onto {0, 1} with P(1) = a / (a + b).
        debug!("Beta({}, {}) draw underflowed, sampling the limiting endpoint", params.a, params.b);
        let one = bernoulli(params.mean())?.sample(&mut self.rng);
        Ok(if one { 1.0 } else { 0.0 })
    }

    fn sample_bernoulli(&mut self, p: f64) -> Result<bool> {
        Ok(bernoulli(p)?.sample(&mut self.rng))
    }

    fn sample_bernoulli_row(&mut self, p: f64, r: usize) -> Result<Vec<bool>> {
        let trial = bernoulli(p)?;
        Ok(trial.sample_iter(&mut self.rng).take(r).collect())
    }
}
