//! Activation modules.

use super::module::Module;
use crate::tensor::Tensor;

/// Rectified linear unit: max(0, x).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl ReLU {
    /// Create a new `ReLU` module.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Module for ReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.relu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_module() {
        let relu = ReLU::new();
        let out = relu.forward(&Tensor::from_slice(&[-3.0, 0.5, 0.0]));
        assert_eq!(out.data(), &[0.0, 0.5, 0.0]);
        assert_eq!(relu.num_parameters(), 0);
    }
}
