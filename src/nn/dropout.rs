//! Dropout regularization.
//!
//! # Reference
//!
//! - Srivastava, N., et al. (2014). Dropout: A simple way to prevent neural
//!   networks from overfitting. JMLR.

use super::functional;
use super::module::Module;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

/// Dropout regularization layer.
///
/// During training, randomly zeroes elements with probability `p` and scales
/// the survivors by `1/(1-p)` (inverted dropout). During evaluation the input
/// passes through unchanged.
///
/// # Example
///
/// ```
/// use graphnets::nn::{Dropout, Module};
/// use graphnets::tensor::Tensor;
///
/// let mut dropout = Dropout::with_seed(0.5, 7);
/// dropout.eval();
/// let x = Tensor::ones(&[4, 4]);
/// assert_eq!(dropout.forward(&x), x);
/// ```
pub struct Dropout {
    /// Probability of element being zeroed
    p: f32,

    training: bool,

    /// Random number generator (Mutex for thread safety)
    rng: Mutex<StdRng>,
}

impl Dropout {
    /// Create a new Dropout layer.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not in [0, 1).
    #[must_use]
    pub fn new(p: f32) -> Self {
        Self::from_rng(p, StdRng::from_entropy())
    }

    /// Create a Dropout layer with a specific seed for reproducibility.
    #[must_use]
    pub fn with_seed(p: f32, seed: u64) -> Self {
        Self::from_rng(p, StdRng::seed_from_u64(seed))
    }

    /// Create a Dropout layer with an optional seed.
    #[must_use]
    pub fn with_optional_seed(p: f32, seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::with_seed(p, s),
            None => Self::new(p),
        }
    }

    fn from_rng(p: f32, rng: StdRng) -> Self {
        assert!(
            (0.0..1.0).contains(&p),
            "Dropout probability must be in [0, 1), got {p}",
        );

        Self {
            p,
            training: true,
            rng: Mutex::new(rng),
        }
    }

    /// Get the dropout probability.
    #[must_use]
    pub fn probability(&self) -> f32 {
        self.p
    }
}

impl Module for Dropout {
    fn forward(&self, input: &Tensor) -> Tensor {
        if !self.training || self.p == 0.0 {
            return input.clone();
        }

        let mut rng = self.rng.lock().expect("Dropout RNG lock poisoned");
        functional::dropout(input, self.p, true, &mut *rng)
    }

    fn train(&mut self) {
        self.training = true;
    }

    fn eval(&mut self) {
        self.training = false;
    }

    fn training(&self) -> bool {
        self.training
    }
}

impl std::fmt::Debug for Dropout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dropout")
            .field("p", &self.p)
            .field("training", &self.training)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropout_eval_is_identity() {
        let mut d = Dropout::with_seed(0.9, 1);
        d.eval();
        let x = Tensor::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(d.forward(&x), x);
        assert!(!d.training());
    }

    #[test]
    fn test_dropout_training_zeroes_and_scales() {
        let d = Dropout::with_seed(0.5, 3);
        let x = Tensor::ones(&[1000]);
        let y = d.forward(&x);

        let zeros = y.data().iter().filter(|&&v| v == 0.0).count();
        assert!(zeros > 350 && zeros < 650, "zeros = {zeros}");
        assert!(y
            .data()
            .iter()
            .all(|&v| v == 0.0 || (v - 2.0).abs() < 1e-6));
    }

    #[test]
    fn test_dropout_zero_probability() {
        let d = Dropout::with_seed(0.0, 3);
        let x = Tensor::ones(&[10]);
        assert_eq!(d.forward(&x), x);
    }

    #[test]
    fn test_dropout_seeded_is_reproducible() {
        let a = Dropout::with_seed(0.3, 11);
        let b = Dropout::with_seed(0.3, 11);
        let x = Tensor::ones(&[64]);
        assert_eq!(a.forward(&x), b.forward(&x));
    }

    #[test]
    #[should_panic(expected = "Dropout probability must be in [0, 1)")]
    fn test_dropout_invalid_probability() {
        let _ = Dropout::new(1.0);
    }
}
