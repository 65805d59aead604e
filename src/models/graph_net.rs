use serde::Serialize;
use tracing::debug;

use super::{ConvGraphNet, DeeperGCN, RecurrentGCN, ScalableRecurrentGCN};
use crate::error::{GraphNetsError, Result};
use crate::nn::gnn::EdgeIndex;
use crate::tensor::Tensor;

/// Any supported architecture behind one sequence-level entry point.
#[derive(Debug)]
pub enum GraphNet {
    /// [`RecurrentGCN`]
    RecurrentGcn(RecurrentGCN),
    /// [`ConvGraphNet`]
    ConvGraphNet(ConvGraphNet),
    /// [`DeeperGCN`]
    DeeperGcn(DeeperGCN),
    /// [`ScalableRecurrentGCN`]
    ScalableRecurrentGcn(ScalableRecurrentGCN),
}

/// Static description of a built model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    /// Model kind, matching the config tag
    pub model: &'static str,
    /// Number of top-level graph layers
    pub layers: usize,
    /// Number of learnable scalars
    pub parameters: usize,
    /// Whether the model threads hidden state across snapshots
    pub recurrent: bool,
}

impl GraphNet {
    /// Config tag of the wrapped model.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RecurrentGcn(_) => "recurrent_gcn",
            Self::ConvGraphNet(_) => "conv_graph_net",
            Self::DeeperGcn(_) => "deeper_gcn",
            Self::ScalableRecurrentGcn(_) => "scalable_recurrent_gcn",
        }
    }

    /// Whether hidden state carries across snapshots.
    #[must_use]
    pub fn is_recurrent(&self) -> bool {
        matches!(self, Self::RecurrentGcn(_) | Self::ScalableRecurrentGcn(_))
    }

    /// Number of top-level graph layers.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        match self {
            Self::RecurrentGcn(m) => m.layers().len(),
            Self::ConvGraphNet(m) => m.num_layers(),
            // Blocks plus the final convolution
            Self::DeeperGcn(m) => m.layers().len() + 1,
            Self::ScalableRecurrentGcn(m) => m.layers().len(),
        }
    }

    /// Number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        match self {
            Self::RecurrentGcn(m) => m.num_parameters(),
            Self::ConvGraphNet(m) => m.num_parameters(),
            Self::DeeperGcn(m) => m.num_parameters(),
            Self::ScalableRecurrentGcn(m) => m.num_parameters(),
        }
    }

    /// Describe the model.
    #[must_use]
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            model: self.kind(),
            layers: self.num_layers(),
            parameters: self.num_parameters(),
            recurrent: self.is_recurrent(),
        }
    }

    /// Run the model over a snapshot sequence.
    ///
    /// Recurrent models thread hidden state through time; static models see
    /// each snapshot independently. Returns `[T, N, out]`.
    pub fn forward_sequence(&self, snapshots: &[Tensor], edges: &EdgeIndex) -> Result<Tensor> {
        if snapshots.is_empty() {
            return Err(GraphNetsError::empty_input("snapshot sequence"));
        }
        debug!(
            model = self.kind(),
            steps = snapshots.len(),
            nodes = edges.num_nodes(),
            "forward sequence"
        );

        match self {
            Self::RecurrentGcn(m) => m.forward(snapshots, edges),
            Self::ScalableRecurrentGcn(m) => m.forward(snapshots, edges),
            Self::ConvGraphNet(m) => {
                let outputs = snapshots
                    .iter()
                    .map(|x| m.forward(x, edges))
                    .collect::<Result<Vec<_>>>()?;
                Tensor::stack(&outputs)
            }
            Self::DeeperGcn(m) => {
                let outputs = snapshots
                    .iter()
                    .map(|x| m.forward(x, edges))
                    .collect::<Result<Vec<_>>>()?;
                Tensor::stack(&outputs)
            }
        }
    }

    /// Switch to training mode (dropout active).
    pub fn train(&mut self) {
        match self {
            Self::DeeperGcn(m) => m.train(),
            Self::ScalableRecurrentGcn(m) => m.train(),
            Self::RecurrentGcn(_) | Self::ConvGraphNet(_) => {}
        }
    }

    /// Switch to evaluation mode (dropout disabled).
    pub fn eval(&mut self) {
        match self {
            Self::DeeperGcn(m) => m.eval(),
            Self::ScalableRecurrentGcn(m) => m.eval(),
            Self::RecurrentGcn(_) | Self::ConvGraphNet(_) => {}
        }
    }
}
