//! Weight initialization functions.
//!
//! Weights use Xavier/Glorot (Glorot & Bengio, 2010). Every initializer
//! takes an optional seed; with `None` the generator is seeded from entropy.

use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Xavier uniform initialization.
///
/// Samples from U(-a, a) where a = sqrt(6 / (`fan_in` + `fan_out`)).
///
/// ```
/// use graphnets::nn::init::xavier_uniform;
///
/// let w = xavier_uniform(&[16, 8], 16, 8, Some(7));
/// let bound = (6.0f32 / 24.0).sqrt();
/// assert!(w.data().iter().all(|v| v.abs() <= bound));
/// ```
#[must_use]
pub fn xavier_uniform(shape: &[usize], fan_in: usize, fan_out: usize, seed: Option<u64>) -> Tensor {
    let a = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    uniform(shape, -a, a, seed)
}

/// Uniform distribution U(low, high).
#[must_use]
pub fn uniform(shape: &[usize], low: f32, high: f32, seed: Option<u64>) -> Tensor {
    let numel: usize = shape.iter().product();
    let mut rng = rng_from(seed);
    let data: Vec<f32> = if low < high {
        (0..numel).map(|_| rng.gen_range(low..high)).collect()
    } else {
        vec![low; numel]
    };
    Tensor::new(&data, shape)
}

/// Constant initialization.
#[must_use]
pub fn constant(shape: &[usize], value: f32) -> Tensor {
    Tensor::full(shape, value)
}

/// Zero initialization.
#[must_use]
pub fn zeros(shape: &[usize]) -> Tensor {
    Tensor::zeros(shape)
}

/// Derive the seed of the `offset`-th sub-layer from a parent seed.
///
/// Keeps sibling layers from sharing identical weights while staying
/// reproducible.
#[must_use]
pub fn derive_seed(seed: Option<u64>, offset: u64) -> Option<u64> {
    seed.map(|s| {
        s.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(offset.wrapping_mul(0xBF58_476D_1CE4_E5B9))
            .rotate_left(17)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xavier_bounds() {
        let t = xavier_uniform(&[32, 16], 16, 32, Some(1));
        let a = (6.0f32 / 48.0).sqrt();
        assert_eq!(t.shape(), &[32, 16]);
        assert!(t.data().iter().all(|&v| v >= -a && v < a));
    }

    #[test]
    fn test_seeded_init_is_reproducible() {
        let a = xavier_uniform(&[5, 5], 5, 5, Some(42));
        let b = xavier_uniform(&[5, 5], 5, 5, Some(42));
        let c = xavier_uniform(&[5, 5], 5, 5, Some(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_constant_and_zeros() {
        assert!(constant(&[3], 1.0).data().iter().all(|&v| v == 1.0));
        assert!(zeros(&[3]).data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(derive_seed(None, 3), None);
        assert_eq!(derive_seed(Some(1), 3), derive_seed(Some(1), 3));
        assert_ne!(derive_seed(Some(1), 3), derive_seed(Some(1), 4));
    }
}
