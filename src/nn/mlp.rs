//! Multi-layer perceptron applied per node.

use serde::{Deserialize, Serialize};

use super::activation::ReLU;
use super::init::derive_seed;
use super::linear::Linear;
use super::module::Module;
use super::normalization::{BatchNorm1d, GraphLayerNorm};
use crate::tensor::Tensor;

/// Normalization applied inside hidden MLP blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormKind {
    /// Batch normalization over nodes
    #[default]
    Batch,
    /// Graph-mode layer normalization
    Layer,
    /// No normalization
    None,
}

enum Norm {
    Batch(BatchNorm1d),
    Layer(GraphLayerNorm),
}

impl Norm {
    fn build(kind: NormKind, features: usize) -> Option<Self> {
        match kind {
            NormKind::Batch => Some(Norm::Batch(BatchNorm1d::new(features))),
            NormKind::Layer => Some(Norm::Layer(GraphLayerNorm::new(features))),
            NormKind::None => None,
        }
    }

    fn as_module(&self) -> &dyn Module {
        match self {
            Norm::Batch(n) => n,
            Norm::Layer(n) => n,
        }
    }

    fn as_module_mut(&mut self) -> &mut dyn Module {
        match self {
            Norm::Batch(n) => n,
            Norm::Layer(n) => n,
        }
    }
}

struct HiddenBlock {
    linear: Linear,
    norm: Option<Norm>,
}

/// Per-node MLP over a channel list `[c0, c1, .., cn]`.
///
/// Hidden blocks are `Linear -> Norm -> ReLU`; the last `Linear` is plain.
///
/// ```
/// use graphnets::nn::{Mlp, Module, NormKind};
/// use graphnets::tensor::Tensor;
///
/// let mlp = Mlp::new(&[8, 16, 8], NormKind::Layer, false, Some(1));
/// let out = mlp.forward(&Tensor::ones(&[5, 8]));
/// assert_eq!(out.shape(), &[5, 8]);
/// ```
pub struct Mlp {
    channels: Vec<usize>,
    hidden: Vec<HiddenBlock>,
    last: Linear,
    act: ReLU,
    training: bool,
}

impl Mlp {
    /// Build an MLP.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two channel sizes are given.
    #[must_use]
    pub fn new(channels: &[usize], norm: NormKind, bias: bool, seed: Option<u64>) -> Self {
        assert!(channels.len() >= 2, "Mlp needs at least input and output channels");

        let linear = |i: usize, fan_in: usize, fan_out: usize| {
            let s = derive_seed(seed, i as u64);
            if bias {
                Linear::with_seed(fan_in, fan_out, s)
            } else {
                Linear::without_bias(fan_in, fan_out, s)
            }
        };

        let n = channels.len();
        let hidden = (0..n - 2)
            .map(|i| HiddenBlock {
                linear: linear(i, channels[i], channels[i + 1]),
                norm: Norm::build(norm, channels[i + 1]),
            })
            .collect();
        let last = linear(n - 2, channels[n - 2], channels[n - 1]);

        Self {
            channels: channels.to_vec(),
            hidden,
            last,
            act: ReLU,
            training: true,
        }
    }

    /// Channel list.
    #[must_use]
    pub fn channels(&self) -> &[usize] {
        &self.channels
    }
}

impl Module for Mlp {
    fn forward(&self, input: &Tensor) -> Tensor {
        let mut x = input.clone();
        for block in &self.hidden {
            x = block.linear.forward(&x);
            if let Some(norm) = &block.norm {
                x = norm.as_module().forward(&x);
            }
            x = self.act.forward(&x);
        }
        self.last.forward(&x)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut p = Vec::new();
        for block in &self.hidden {
            p.extend(block.linear.parameters());
            if let Some(norm) = &block.norm {
                p.extend(norm.as_module().parameters());
            }
        }
        p.extend(self.last.parameters());
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p = Vec::new();
        for block in &mut self.hidden {
            p.extend(block.linear.parameters_mut());
            if let Some(norm) = &mut block.norm {
                p.extend(norm.as_module_mut().parameters_mut());
            }
        }
        p.extend(self.last.parameters_mut());
        p
    }

    fn train(&mut self) {
        self.training = true;
        for block in &mut self.hidden {
            if let Some(norm) = &mut block.norm {
                norm.as_module_mut().train();
            }
        }
    }

    fn eval(&mut self) {
        self.training = false;
        for block in &mut self.hidden {
            if let Some(norm) = &mut block.norm {
                norm.as_module_mut().eval();
            }
        }
    }

    fn training(&self) -> bool {
        self.training
    }
}

impl std::fmt::Debug for Mlp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mlp")
            .field("channels", &self.channels)
            .field("training", &self.training)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlp_shapes_and_parameters() {
        let mlp = Mlp::new(&[4, 8, 3], NormKind::None, true, Some(0));
        let out = mlp.forward(&Tensor::ones(&[2, 4]));
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(mlp.num_parameters(), (4 * 8 + 8) + (8 * 3 + 3));
    }

    #[test]
    fn test_mlp_norm_adds_affine_parameters() {
        let plain = Mlp::new(&[4, 8, 4], NormKind::None, false, Some(0));
        let layer = Mlp::new(&[4, 8, 4], NormKind::Layer, false, Some(0));
        assert_eq!(layer.num_parameters(), plain.num_parameters() + 16);
    }

    #[test]
    fn test_mlp_train_eval_propagates() {
        let mut mlp = Mlp::new(&[4, 8, 4], NormKind::Batch, false, Some(0));
        assert!(mlp.training());
        mlp.eval();
        assert!(!mlp.training());

        // Eval with fresh running stats is deterministic
        let x = Tensor::ones(&[3, 4]);
        assert_eq!(mlp.forward(&x), mlp.forward(&x));
    }

    #[test]
    fn test_norm_kind_serde() {
        let kind: NormKind = serde_json::from_str("\"layer\"").expect("valid norm");
        assert_eq!(kind, NormKind::Layer);
        assert_eq!(NormKind::default(), NormKind::Batch);
    }
}
