use crate::error::{BetaBinomialError, Result};

/// Shape parameters of the Beta prior.
///
/// `a` and `b` act as pseudo-counts of prior successes and failures. The pair
/// is only ever replaced as a whole, so a reader never sees `a` from one
/// update combined with `b` from another.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HyperParams {
    pub a: f64,
    pub b: f64,
}

impl HyperParams {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        validate("a", a)?;
        validate("b", b)?;
        Ok(Self { a, b })
    }

    /// Beta(1, 1)
    pub fn uniform() -> Self {
        Self { a: 1.0, b: 1.0 }
    }

    /// Posterior after observing `successes` out of `trials` Bernoulli outcomes.
    pub fn posterior(&self, successes: u64, trials: u64) -> Self {
        debug_assert!(successes <= trials);
        Self {
            a: self.a + successes as f64,
            b: self.b + (trials - successes) as f64,
        }
    }

    /// Mean of the Beta prior, E[p] = a / (a + b).
    pub fn mean(&self) -> f64 {
        self.a / (self.a + self.b)
    }
}

impl Default for HyperParams {
    fn default() -> Self {
        Self::uniform()
    }
}

pub(crate) fn validate(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BetaBinomialError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let params = HyperParams::new(10.0, 20.0).unwrap();
        assert_eq!(params.a, 10.0);
        assert_eq!(params.b, 20.0);
    }

    #[test]
    fn test_new_rejects_non_positive() {
        for (a, b) in vec![(0.0, 1.0), (1.0, 0.0), (-2.0, 1.0), (1.0, f64::NAN), (f64::INFINITY, 1.0)] {
            assert!(HyperParams::new(a, b).is_err(), "accepted a={}, b={}", a, b);
        }
    }

    #[test]
    fn test_default_is_uniform() {
        assert_eq!(HyperParams::default(), HyperParams { a: 1.0, b: 1.0 });
    }

    #[test]
    fn test_posterior_adds_counts() {
        let prior = HyperParams::new(10.0, 20.0).unwrap();
        let post = prior.posterior(3, 6);
        assert_eq!(post, HyperParams { a: 13.0, b: 23.0 });
        // prior untouched
        assert_eq!(prior.a, 10.0);
    }

    #[test]
    fn test_mean() {
        let params = HyperParams::new(2.0, 6.0).unwrap();
        assert!((params.mean() - 0.25).abs() < 1e-12);
    }
}
