//! Normalization layers for node feature matrices.
//!
//! # References
//!
//! - Ioffe, S., & Szegedy, C. (2015). Batch normalization: Accelerating
//!   deep network training. ICML.
//! - Ba, J. L., Kiros, J. R., & Hinton, G. E. (2016). Layer normalization.
//!   arXiv:1607.06450.

use super::init::{constant, zeros};
use super::module::Module;
use crate::tensor::Tensor;
use std::sync::Mutex;

/// Layer Normalization (Ba et al., 2016).
///
/// Normalizes every row (node) independently over its last dimension.
///
/// ```text
/// y = (x - E[x]) / sqrt(Var[x] + eps) * gamma + beta
/// ```
#[derive(Debug)]
pub struct LayerNorm {
    features: usize,
    eps: f32,
    /// Learnable scale parameter (gamma)
    weight: Tensor,
    /// Learnable shift parameter (beta)
    bias: Tensor,
    elementwise_affine: bool,
}

impl LayerNorm {
    /// Create a new `LayerNorm` over `features` channels with affine parameters.
    #[must_use]
    pub fn new(features: usize) -> Self {
        Self {
            features,
            eps: 1e-5,
            weight: constant(&[features], 1.0),
            bias: zeros(&[features]),
            elementwise_affine: true,
        }
    }

    /// Create `LayerNorm` without learnable parameters.
    #[must_use]
    pub fn without_affine(features: usize) -> Self {
        Self {
            elementwise_affine: false,
            ..Self::new(features)
        }
    }

    /// Set epsilon for numerical stability.
    #[must_use]
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Number of normalized features.
    #[must_use]
    pub fn features(&self) -> usize {
        self.features
    }
}

impl Module for LayerNorm {
    fn forward(&self, input: &Tensor) -> Tensor {
        let shape = input.shape();
        assert_eq!(
            shape.last().copied(),
            Some(self.features),
            "LayerNorm expected last dimension {}, got shape {shape:?}",
            self.features
        );

        let n = self.features;
        let mut output = vec![0.0f32; input.numel()];
        let gamma = self.weight.data();
        let beta = self.bias.data();

        for (row, out) in input.data().chunks(n.max(1)).zip(output.chunks_mut(n.max(1))) {
            let mean: f32 = row.iter().sum::<f32>() / n as f32;
            let var: f32 = row.iter().map(|&x| (x - mean).powi(2)).sum::<f32>() / n as f32;
            let std_inv = 1.0 / (var + self.eps).sqrt();

            for i in 0..n {
                let normalized = (row[i] - mean) * std_inv;
                out[i] = if self.elementwise_affine {
                    normalized * gamma[i] + beta[i]
                } else {
                    normalized
                };
            }
        }

        Tensor::new(&output, shape)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        if self.elementwise_affine {
            vec![&self.weight, &self.bias]
        } else {
            vec![]
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        if self.elementwise_affine {
            vec![&mut self.weight, &mut self.bias]
        } else {
            vec![]
        }
    }
}

mod graph_batch;
pub use graph_batch::*;
