use tracing::{debug, trace};

use crate::error::Result;
use crate::nn::gnn::{EdgeIndex, GCNConv, GraphModule};
use crate::nn::init::derive_seed;
use crate::tensor::Tensor;

/// Feed-forward chain of [`GCNConv`] layers.
///
/// `input_dim -> hidden[0] -> .. -> hidden[last]` with `ReLU` after each,
/// then a final `GCNConv` to `output_dim` with no activation.
#[derive(Debug, Clone)]
pub struct ConvGraphNet {
    layers: Vec<GCNConv>,
    last_layer: GCNConv,
}

impl ConvGraphNet {
    /// Default hidden widths.
    pub const DEFAULT_HIDDEN_DIMS: [usize; 4] = [1024, 512, 256, 64];

    /// Default output width.
    pub const DEFAULT_OUTPUT_DIM: usize = 1;

    /// Create the model with default hidden widths and output width.
    #[must_use]
    pub fn new(input_dim: usize) -> Self {
        Self::with_config(
            input_dim,
            &Self::DEFAULT_HIDDEN_DIMS,
            Self::DEFAULT_OUTPUT_DIM,
            None,
        )
    }

    /// Create the model from explicit widths.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_dim_sequence` is empty.
    #[must_use]
    pub fn with_config(
        input_dim: usize,
        hidden_dim_sequence: &[usize],
        output_dim: usize,
        seed: Option<u64>,
    ) -> Self {
        assert!(
            !hidden_dim_sequence.is_empty(),
            "ConvGraphNet needs at least one hidden width"
        );
        let last_hidden = hidden_dim_sequence[hidden_dim_sequence.len() - 1];

        let mut widths = vec![input_dim];
        widths.extend_from_slice(hidden_dim_sequence);
        let layers: Vec<GCNConv> = widths
            .windows(2)
            .enumerate()
            .map(|(i, w)| GCNConv::with_seed(w[0], w[1], derive_seed(seed, i as u64)))
            .collect();
        let last_layer = GCNConv::with_seed(
            last_hidden,
            output_dim,
            derive_seed(seed, hidden_dim_sequence.len() as u64),
        );

        let model = Self { layers, last_layer };
        debug!(
            input_dim,
            output_dim,
            layers = model.num_layers(),
            parameters = model.num_parameters(),
            "built ConvGraphNet"
        );
        model
    }

    /// Hidden layers followed by `ReLU`.
    #[must_use]
    pub fn layers(&self) -> &[GCNConv] {
        &self.layers
    }

    /// Output layer.
    #[must_use]
    pub fn last_layer(&self) -> &GCNConv {
        &self.last_layer
    }

    /// Number of `GCNConv` layers including the output layer.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.layers.len() + 1
    }

    /// Input feature width.
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.layers[0].in_features()
    }

    /// Output width.
    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.last_layer.out_features()
    }

    /// Map node features `[N, input_dim]` to `[N, output_dim]`.
    pub fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        trace!(nodes = edges.num_nodes(), edges = edges.num_edges(), "ConvGraphNet forward");
        let mut x = x.clone();
        for layer in &self.layers {
            x = layer.forward(&x, edges)?.relu();
        }
        self.last_layer.forward(&x, edges)
    }

    /// Total number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .chain(std::iter::once(&self.last_layer))
            .map(|layer| layer.num_parameters())
            .sum()
    }
}
