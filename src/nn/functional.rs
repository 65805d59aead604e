//! Stateless functional forms of activations and regularizers.

use crate::tensor::Tensor;
use rand::Rng;

/// Rectified linear unit.
#[must_use]
pub fn relu(x: &Tensor) -> Tensor {
    x.relu()
}

/// Inverted dropout.
///
/// Returns `x` unchanged when `training` is false or `p == 0`.
///
/// # Panics
///
/// Panics if `p` is not in [0, 1).
pub fn dropout<R: Rng + ?Sized>(x: &Tensor, p: f32, training: bool, rng: &mut R) -> Tensor {
    assert!(
        (0.0..1.0).contains(&p),
        "Dropout probability must be in [0, 1), got {p}",
    );
    if !training || p == 0.0 {
        return x.clone();
    }

    let scale = 1.0 / (1.0 - p);
    let data: Vec<f32> = x
        .data()
        .iter()
        .map(|&v| if rng.gen::<f32>() < p { 0.0 } else { v * scale })
        .collect();
    Tensor::new(&data, x.shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_functional_relu() {
        let out = relu(&Tensor::from_slice(&[-1.0, 1.0]));
        assert_eq!(out.data(), &[0.0, 1.0]);
    }

    #[test]
    fn test_functional_dropout_not_training() {
        let mut rng = StdRng::seed_from_u64(0);
        let x = Tensor::ones(&[8]);
        assert_eq!(dropout(&x, 0.5, false, &mut rng), x);
    }

    #[test]
    fn test_functional_dropout_preserves_expectation() {
        let mut rng = StdRng::seed_from_u64(5);
        let x = Tensor::ones(&[20_000]);
        let y = dropout(&x, 0.1, true, &mut rng);
        assert!((y.mean() - 1.0).abs() < 0.05, "mean = {}", y.mean());
    }
}
