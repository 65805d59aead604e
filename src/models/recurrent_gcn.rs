use tracing::{debug, trace};

use super::unroll;
use crate::error::Result;
use crate::nn::gnn::{EdgeIndex, GConvGRU};
use crate::nn::init::derive_seed;
use crate::tensor::Tensor;

/// Recurrent graph network of five stacked [`GConvGRU`] cells.
///
/// Widths are `node_features -> 256 -> 128 -> 64 -> 32 -> output_dim`, each
/// cell with Chebyshev filter size `K = 1`. Every cell after the first is
/// followed by `ReLU`, so the predictions are non-negative.
#[derive(Debug, Clone)]
pub struct RecurrentGCN {
    node_features: usize,
    output_dim: usize,
    layers: Vec<GConvGRU>,
}

impl RecurrentGCN {
    /// Hidden widths between the input and output cells.
    pub const HIDDEN_DIMS: [usize; 4] = [256, 128, 64, 32];

    /// Default prediction width.
    pub const DEFAULT_OUTPUT_DIM: usize = 2;

    /// Create the model with random initialization.
    #[must_use]
    pub fn new(node_features: usize, output_dim: usize) -> Self {
        Self::with_seed(node_features, output_dim, None)
    }

    /// Create the model with deterministic initialization.
    #[must_use]
    pub fn with_seed(node_features: usize, output_dim: usize, seed: Option<u64>) -> Self {
        let mut dims = vec![node_features];
        dims.extend(Self::HIDDEN_DIMS);
        dims.push(output_dim);

        let layers: Vec<GConvGRU> = dims
            .windows(2)
            .enumerate()
            .map(|(i, w)| GConvGRU::with_seed(w[0], w[1], 1, derive_seed(seed, i as u64)))
            .collect();

        let model = Self {
            node_features,
            output_dim,
            layers,
        };
        debug!(
            node_features,
            output_dim,
            layers = model.layers.len(),
            parameters = model.num_parameters(),
            "built RecurrentGCN"
        );
        model
    }

    /// Input feature width.
    #[must_use]
    pub fn node_features(&self) -> usize {
        self.node_features
    }

    /// Prediction width.
    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// The recurrent cells in order.
    #[must_use]
    pub fn layers(&self) -> &[GConvGRU] {
        &self.layers
    }

    /// Run the model over `snapshots` `[N, node_features]` sharing `edges`.
    ///
    /// Returns `[T, N, output_dim]`, one prediction per snapshot.
    pub fn forward(&self, snapshots: &[Tensor], edges: &EdgeIndex) -> Result<Tensor> {
        trace!(steps = snapshots.len(), nodes = edges.num_nodes(), "RecurrentGCN forward");
        unroll(&self.layers, snapshots, edges, Tensor::clone)
    }

    /// Total number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(GConvGRU::num_parameters).sum()
    }
}
