//! Fully connected (linear) layer.
//!
//! Implements the transformation y = xW^T + b.

use super::init::{xavier_uniform, zeros};
use super::module::Module;
use crate::tensor::Tensor;

/// Fully connected layer: y = xW^T + b
///
/// Weight initialization follows Xavier/Glorot (Glorot & Bengio, 2010).
///
/// # Shape
///
/// - Input: `(*, in_features)`
/// - Output: `(*, out_features)`
///
/// # Example
///
/// ```
/// use graphnets::nn::{Linear, Module};
/// use graphnets::tensor::Tensor;
///
/// let layer = Linear::with_seed(4, 3, Some(0));
/// let out = layer.forward(&Tensor::ones(&[5, 4]));
/// assert_eq!(out.shape(), &[5, 3]);
/// ```
pub struct Linear {
    /// Weight matrix, shape: [out_features, in_features]
    weight: Tensor,

    /// Cached transposed weight [in_features, out_features]
    weight_t: Tensor,

    /// Bias vector, shape: [out_features], or None if bias=false
    bias: Option<Tensor>,

    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Create a new Linear layer with Xavier initialization.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a Linear layer with a specific random seed.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        let weight = xavier_uniform(
            &[out_features, in_features],
            in_features,
            out_features,
            seed,
        );
        let weight_t = weight.transpose();

        Self {
            weight,
            weight_t,
            bias: Some(zeros(&[out_features])),
            in_features,
            out_features,
        }
    }

    /// Create a Linear layer without bias.
    #[must_use]
    pub fn without_bias(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        let mut layer = Self::with_seed(in_features, out_features, seed);
        layer.bias = None;
        layer
    }

    /// Get the input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get the output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Check if this layer has a bias term.
    #[must_use]
    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Reference to the weight tensor `[out_features, in_features]`.
    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Reference to the bias tensor if present.
    #[must_use]
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Replace the weight tensor, refreshing the cached transpose.
    ///
    /// # Panics
    ///
    /// Panics if the shape is not `[out_features, in_features]`.
    pub fn set_weight(&mut self, weight: Tensor) {
        assert_eq!(
            weight.shape(),
            &[self.out_features, self.in_features],
            "Linear weight shape mismatch"
        );
        self.weight_t = weight.transpose();
        self.weight = weight;
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Tensor {
        let input_shape = input.shape();
        let ndim = input_shape.len();
        assert!(ndim >= 1, "Linear expects at least a 1D input");
        assert_eq!(
            input_shape[ndim - 1],
            self.in_features,
            "Linear expected {} input features, got {}",
            self.in_features,
            input_shape[ndim - 1]
        );

        // Flatten batch dimensions into rows
        let rows = input.numel() / self.in_features.max(1);
        let flat = input.view(&[rows, self.in_features]);
        let output = flat.matmul(&self.weight_t);

        let output = match &self.bias {
            Some(b) => output.broadcast_add(b),
            None => output,
        };

        let mut out_shape = input_shape[..ndim - 1].to_vec();
        out_shape.push(self.out_features);
        output.view(&out_shape)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        match &self.bias {
            Some(b) => vec![&self.weight, b],
            None => vec![&self.weight],
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match &mut self.bias {
            Some(b) => vec![&mut self.weight, b],
            None => vec![&mut self.weight],
        }
    }
}

impl std::fmt::Debug for Linear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linear")
            .field("in_features", &self.in_features)
            .field("out_features", &self.out_features)
            .field("bias", &self.bias.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_shape() {
        let layer = Linear::with_seed(10, 5, Some(1));
        let out = layer.forward(&Tensor::ones(&[3, 10]));
        assert_eq!(out.shape(), &[3, 5]);
    }

    #[test]
    fn test_linear_3d_input() {
        let layer = Linear::with_seed(4, 2, Some(1));
        let out = layer.forward(&Tensor::ones(&[2, 3, 4]));
        assert_eq!(out.shape(), &[2, 3, 2]);
    }

    #[test]
    fn test_linear_known_weights() {
        let mut layer = Linear::with_seed(2, 2, Some(0));
        layer.set_weight(Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]));
        // y = x W^T with x = [1, 1] -> [1+2, 3+4]
        let out = layer.forward(&Tensor::new(&[1.0, 1.0], &[1, 2]));
        assert_eq!(out.data(), &[3.0, 7.0]);
    }

    #[test]
    fn test_linear_parameters() {
        let with_bias = Linear::with_seed(3, 4, Some(0));
        assert_eq!(with_bias.parameters().len(), 2);
        assert_eq!(with_bias.num_parameters(), 3 * 4 + 4);

        let no_bias = Linear::without_bias(3, 4, Some(0));
        assert!(!no_bias.has_bias());
        assert_eq!(no_bias.num_parameters(), 12);
    }

    #[test]
    #[should_panic(expected = "input features")]
    fn test_linear_wrong_width_panics() {
        let layer = Linear::with_seed(3, 2, Some(0));
        let _ = layer.forward(&Tensor::ones(&[1, 4]));
    }
}
