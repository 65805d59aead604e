//! The [`Module`] trait shared by every dense layer.

use crate::tensor::Tensor;

/// A neural network building block with learnable parameters.
///
/// Modules start in training mode. `train()` and `eval()` switch the mode of
/// a module and all of its children; layers such as [`Dropout`](super::Dropout)
/// and [`BatchNorm1d`](super::BatchNorm1d) behave differently in each mode.
pub trait Module: Send + Sync {
    /// Forward pass.
    fn forward(&self, input: &Tensor) -> Tensor;

    /// All learnable parameters.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Mutable access to all learnable parameters.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// Switch to training mode.
    fn train(&mut self) {}

    /// Switch to evaluation mode.
    fn eval(&mut self) {}

    /// Whether the module is in training mode.
    fn training(&self) -> bool {
        false
    }

    /// Total number of learnable scalars.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}
