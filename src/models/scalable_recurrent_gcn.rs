use tracing::{debug, trace};

use super::unroll;
use crate::error::Result;
use crate::nn::gnn::{EdgeIndex, GConvGRU};
use crate::nn::init::derive_seed;
use crate::nn::{Dropout, Module};
use crate::tensor::Tensor;

/// Recurrent graph network with configurable depth and neighborhood size.
///
/// `hidden_dim_sequence` sets one [`GConvGRU`] per entry. The last cell maps
/// the second-to-last width to `output_dim`, so the final entry only adds a
/// layer. Each step's prediction passes through dropout (`p = 0.1`) while
/// training.
#[derive(Debug)]
pub struct ScalableRecurrentGCN {
    node_features: usize,
    output_dim: usize,
    hidden_dim_sequence: Vec<usize>,
    neighborhood_size: usize,
    layers: Vec<GConvGRU>,
    dropout: Dropout,
    training: bool,
}

impl ScalableRecurrentGCN {
    /// Default hidden widths.
    pub const DEFAULT_HIDDEN_DIMS: [usize; 7] = [1024, 512, 768, 256, 128, 64, 64];

    /// Default Chebyshev filter size.
    pub const DEFAULT_NEIGHBORHOOD_SIZE: usize = 2;

    /// Default prediction width.
    pub const DEFAULT_OUTPUT_DIM: usize = 2;

    /// Dropout applied to every prediction in training mode.
    pub const PREDICTION_DROPOUT: f32 = 0.1;

    /// Create the model with the default hidden widths and neighborhood.
    #[must_use]
    pub fn new(node_features: usize, output_dim: usize) -> Self {
        Self::with_config(
            node_features,
            output_dim,
            &Self::DEFAULT_HIDDEN_DIMS,
            Self::DEFAULT_NEIGHBORHOOD_SIZE,
            None,
        )
    }

    /// Create the model from explicit hyperparameters.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_dim_sequence` has fewer than two entries or
    /// `neighborhood_size == 0`.
    #[must_use]
    pub fn with_config(
        node_features: usize,
        output_dim: usize,
        hidden_dim_sequence: &[usize],
        neighborhood_size: usize,
        seed: Option<u64>,
    ) -> Self {
        assert!(
            hidden_dim_sequence.len() >= 2,
            "ScalableRecurrentGCN needs at least two hidden widths"
        );

        let n = hidden_dim_sequence.len();
        let mut layers = Vec::with_capacity(n);
        layers.push(GConvGRU::with_seed(
            node_features,
            hidden_dim_sequence[0],
            neighborhood_size,
            derive_seed(seed, 0),
        ));
        for i in 1..n {
            let out = if i == n - 1 {
                output_dim
            } else {
                hidden_dim_sequence[i]
            };
            layers.push(GConvGRU::with_seed(
                hidden_dim_sequence[i - 1],
                out,
                neighborhood_size,
                derive_seed(seed, i as u64),
            ));
        }

        let model = Self {
            node_features,
            output_dim,
            hidden_dim_sequence: hidden_dim_sequence.to_vec(),
            neighborhood_size,
            layers,
            dropout: Dropout::with_optional_seed(Self::PREDICTION_DROPOUT, derive_seed(seed, n as u64)),
            training: true,
        };
        debug!(
            node_features,
            output_dim,
            neighborhood_size,
            layers = model.layers.len(),
            parameters = model.num_parameters(),
            "built ScalableRecurrentGCN"
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

    /// Hidden widths as configured.
    #[must_use]
    pub fn hidden_dim_sequence(&self) -> &[usize] {
        &self.hidden_dim_sequence
    }

    /// Chebyshev filter size of every cell.
    #[must_use]
    pub fn neighborhood_size(&self) -> usize {
        self.neighborhood_size
    }

    /// The recurrent cells in order.
    #[must_use]
    pub fn layers(&self) -> &[GConvGRU] {
        &self.layers
    }

    /// Run the model over `snapshots` `[N, node_features]` sharing `edges`.
    ///
    /// Returns `[T, N, output_dim]`.
    pub fn forward(&self, snapshots: &[Tensor], edges: &EdgeIndex) -> Result<Tensor> {
        trace!(
            steps = snapshots.len(),
            nodes = edges.num_nodes(),
            training = self.training,
            "ScalableRecurrentGCN forward"
        );
        unroll(&self.layers, snapshots, edges, |h| self.dropout.forward(h))
    }

    /// Total number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(GConvGRU::num_parameters).sum()
    }

    /// Enable prediction dropout.
    pub fn train(&mut self) {
        self.training = true;
        self.dropout.train();
    }

    /// Disable prediction dropout.
    pub fn eval(&mut self) {
        self.training = false;
        self.dropout.eval();
    }

    /// Whether the model is in training mode.
    #[must_use]
    pub fn training(&self) -> bool {
        self.training
    }
}
