use crate::compound::{self, CompoundDistribution};
use crate::engine::ProbabilityEngine;
use crate::error::{BetaBinomialError, Result};
use crate::params::{self, HyperParams};
use crate::plot::PlotSink;
use crate::samples::SampleMatrix;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Method-of-moments estimate of the Beta prior behind a sample matrix.
///
/// The values are not validated: under-dispersed samples give non-positive
/// estimates, which are returned as they are.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct HyperEstimate {
    pub a_hat: f64,
    pub b_hat: f64,
}

impl HyperEstimate {
    /// The estimate as usable prior parameters, if both are positive.
    pub fn to_params(&self) -> Result<HyperParams> {
        HyperParams::new(self.a_hat, self.b_hat)
    }
}

/// Bayesian Beta-Binomial model
///
/// a, b: hyper-parameters of the Beta prior on the success probability
/// n: number of units (rows of a sample matrix)
/// r: number of trials per unit, constant across units
/// k: number of successful trials per unit
///
/// References:
/// <https://en.wikipedia.org/wiki/Beta-binomial_distribution>
/// Quintana, F.A. and Tam, W.K., 1996. Bayesian estimation of beta-binomial
/// models by simulating posterior densities. Journal of the Chilean
/// Statistical Society, 13(1-2), pp.43-56.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BetaBinomialModel {
    params: HyperParams,
}

impl BetaBinomialModel {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        Ok(Self::with_params(HyperParams::new(a, b)?))
    }

    pub fn with_params(params: HyperParams) -> Self {
        Self { params }
    }

    pub fn a(&self) -> f64 {
        self.params.a
    }

    pub fn b(&self) -> f64 {
        self.params.b
    }

    pub fn params(&self) -> HyperParams {
        self.params
    }

    /// Read model state written by [`BetaBinomialModel::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let params: HyperParams = serde_json::from_reader(BufReader::new(file))?;
        Self::new(params.a, params.b)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.params)?;
        writer.flush()?;
        Ok(())
    }

    /// Draw `n` units of `r` trials each.
    ///
    /// Every unit draws its own `p ~ Beta(a, b)` and all of its trials are
    /// Bernoulli(p) with that same `p`. `a` and `b` fall back to the model's
    /// own values when `None`; explicit overrides must be positive.
    pub fn gen_samples<E>(
        &self,
        n: usize,
        r: usize,
        a: Option<f64>,
        b: Option<f64>,
        engine: &mut E,
    ) -> Result<SampleMatrix>
    where
        E: ProbabilityEngine + ?Sized,
    {
        let params = HyperParams {
            a: a.map(|v| params::validate("a", v)).transpose()?.unwrap_or(self.params.a),
            b: b.map(|v| params::validate("b", v)).transpose()?.unwrap_or(self.params.b),
        };
        debug!("Drawing {} units of {} trials from Beta({}, {})", n, r, params.a, params.b);

        let mut samples = SampleMatrix::with_capacity(n, r);
        for _ in 0..n {
            let p = engine.sample_beta(&params)?;
            samples.push_outcomes(engine.sample_bernoulli_row(p, r)?);
        }
        Ok(samples)
    }

    /// Method-of-moments estimate of `(a, b)` from observed samples.
    ///
    /// With `k` the per-unit successes, `m1 = mean(k)`, `m2 = mean(k²)` and
    /// `d = r·(m2/m1 - m1 - 1) + m1`:
    ///
    /// `â = (r·m1 - m2) / d`, `b̂ = (r - m1)·(r - m2/m1) / d`
    ///
    /// The multiplier in `d` is the trial count `r`, as in the closed-form
    /// estimator, not the unit count `n`; the two only coincide for square
    /// sample matrices.
    ///
    /// Fails with `DegenerateEstimatorInput` when there are no units, when all
    /// observed successes are zero, or when `d` vanishes. The model state is
    /// not touched.
    pub fn estimate_priors(&self, samples: &SampleMatrix) -> Result<HyperEstimate> {
        let (k, r, n) = k_r_n(samples);
        if n == 0 {
            return Err(BetaBinomialError::DegenerateEstimatorInput(
                "sample matrix has no units".to_string(),
            ));
        }
        let n = n as f64;
        let r = r as f64;
        let m1 = k.iter().sum::<f64>() / n;
        if m1 == 0.0 {
            return Err(BetaBinomialError::DegenerateEstimatorInput(
                "all observed successes are zero".to_string(),
            ));
        }
        let m2 = k.iter().map(|x| x * x).sum::<f64>() / n;
        let ratio = m2 / m1;
        let denom = r * (ratio - m1 - 1.0) + m1;
        if denom == 0.0 {
            return Err(BetaBinomialError::DegenerateEstimatorInput(format!(
                "moment denominator vanishes (m1 = {}, m2 = {})",
                m1, m2
            )));
        }
        let estimate = HyperEstimate {
            a_hat: (r * m1 - m2) / denom,
            b_hat: (r - m1) * (r - ratio) / denom,
        };
        if !estimate.a_hat.is_finite() || !estimate.b_hat.is_finite() {
            return Err(BetaBinomialError::DegenerateEstimatorInput(format!(
                "non-finite estimate {:?}",
                estimate
            )));
        }
        if estimate.a_hat <= 0.0 || estimate.b_hat <= 0.0 {
            warn!(
                "Samples are under-dispersed for a Beta-Binomial: a_hat = {:.4}, b_hat = {:.4}",
                estimate.a_hat, estimate.b_hat
            );
        }
        Ok(estimate)
    }

    /// Conjugate update: `a ← a + Σk`, `b ← b + n·r - Σk`.
    ///
    /// Both fields are replaced together; on error the model is unchanged.
    pub fn update_model(&mut self, samples: &SampleMatrix) -> Result<()> {
        let successes = samples.total_successes();
        let trials = samples.total_trials();
        let posterior = self.params.posterior(successes, trials);
        let posterior = HyperParams::new(posterior.a, posterior.b)?;
        debug!(
            "Updating Beta({}, {}) -> Beta({}, {}) with {} successes in {} trials",
            self.params.a, self.params.b, posterior.a, posterior.b, successes, trials
        );
        self.params = posterior;
        Ok(())
    }

    /// E[X] for `X ~ BetaBinomial(n, a, b)`.
    pub fn expectation(&self, n: u64) -> f64 {
        compound::mean(n, &self.params)
    }

    pub fn variance(&self, n: u64) -> f64 {
        compound::variance(n, &self.params)
    }

    /// Mean of the Beta prior on the success probability.
    pub fn prior_mean(&self) -> f64 {
        self.params.mean()
    }

    /// `f(k | r, a, b)` for `r = n_trials` and the current `(a, b)`.
    pub fn calc_compound_distribution(&self, n_trials: u64) -> CompoundDistribution {
        CompoundDistribution::new(n_trials, self.params)
    }

    /// Hand the pmf over `[0, n]` to `sink`, drawn as a continuous curve.
    pub fn plot_posterior_pmf<S>(&self, n: u64, sink: &mut S) -> Result<()>
    where
        S: PlotSink + ?Sized,
    {
        let dist = self.calc_compound_distribution(n);
        let title = format!(
            "BetaBinomial pmf\nn={}, a={}, b={}, mean={:.2}",
            n,
            self.params.a,
            self.params.b,
            self.expectation(n)
        );
        sink.plot(&|x| dist.density(x), (0.0, n as f64), &title)
    }
}

fn k_r_n(samples: &SampleMatrix) -> (Vec<f64>, usize, usize) {
    let k = samples.successes().into_iter().map(|x| x as f64).collect();
    (k, samples.n_trials(), samples.n_units())
}
