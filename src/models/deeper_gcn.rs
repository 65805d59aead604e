use tracing::{debug, trace};

use crate::error::Result;
use crate::nn::gnn::{
    check_node_features, DeepBlock, DeepGCNLayer, EdgeIndex, GENConv, GenAggregation,
    GenConvOptions, GraphModule,
};
use crate::nn::init::derive_seed;
use crate::nn::{Dropout, LayerNorm, Linear, Module, NormKind, ReLU};
use crate::tensor::Tensor;

/// Deep residual graph network (DeeperGCN, Li et al., 2020).
///
/// ```text
/// x = node_encoder(x)
/// x = layers[0].conv(x)
/// x = layers[i](x)                 for i in 1..num_layers  (res+ blocks)
/// x = dropout(relu(norm_0(x)))
/// y = final(x)
/// ```
///
/// Every block wraps a `GENConv` with learnable softmax temperature, a
/// two-layer MLP using graph-mode layer norm, `LayerNorm` and `ReLU`.
pub struct DeeperGCN {
    node_encoder: Linear,
    layers: Vec<DeepGCNLayer>,
    final_conv: GENConv,
    dropout: Dropout,
    training: bool,
}

impl DeeperGCN {
    /// Dropout inside each block and before the final convolution.
    pub const DROPOUT: f32 = 0.1;

    /// Create the model with random initialization.
    #[must_use]
    pub fn new(
        num_features: usize,
        hidden_channels: usize,
        out_channels: usize,
        num_layers: usize,
    ) -> Self {
        Self::with_seed(num_features, hidden_channels, out_channels, num_layers, None)
    }

    /// Create the model with deterministic initialization.
    ///
    /// # Panics
    ///
    /// Panics if `num_layers == 0`.
    #[must_use]
    pub fn with_seed(
        num_features: usize,
        hidden_channels: usize,
        out_channels: usize,
        num_layers: usize,
        seed: Option<u64>,
    ) -> Self {
        assert!(num_layers > 0, "DeeperGCN needs at least one layer");

        let block_options = GenConvOptions {
            aggregation: GenAggregation::Softmax {
                t: 1.0,
                learn_t: true,
            },
            num_layers: 2,
            norm: NormKind::Layer,
            ..GenConvOptions::default()
        };

        let layers = (1..=num_layers)
            .map(|i| {
                let offset = 2 * i as u64;
                let conv = GENConv::with_options(
                    hidden_channels,
                    hidden_channels,
                    block_options.clone(),
                    derive_seed(seed, offset),
                );
                DeepGCNLayer::new(
                    conv,
                    Some(LayerNorm::new(hidden_channels)),
                    Some(ReLU::new()),
                    DeepBlock::ResPlus,
                    Self::DROPOUT,
                    derive_seed(seed, offset + 1),
                )
                .with_ckpt_grad(i % 3 != 0)
            })
            .collect();

        let model = Self {
            node_encoder: Linear::with_seed(num_features, hidden_channels, derive_seed(seed, 0)),
            layers,
            final_conv: GENConv::with_options(
                hidden_channels,
                out_channels,
                GenConvOptions::default(),
                derive_seed(seed, 1),
            ),
            dropout: Dropout::with_optional_seed(
                Self::DROPOUT,
                derive_seed(seed, 2 * num_layers as u64 + 2),
            ),
            training: true,
        };
        debug!(
            num_features,
            hidden_channels,
            out_channels,
            num_layers,
            parameters = model.num_parameters(),
            "built DeeperGCN"
        );
        model
    }

    /// Input projection.
    #[must_use]
    pub fn node_encoder(&self) -> &Linear {
        &self.node_encoder
    }

    /// Residual blocks.
    #[must_use]
    pub fn layers(&self) -> &[DeepGCNLayer] {
        &self.layers
    }

    /// Mutable access to the residual blocks.
    pub fn layers_mut(&mut self) -> &mut [DeepGCNLayer] {
        &mut self.layers
    }

    /// Output convolution.
    #[must_use]
    pub fn final_conv(&self) -> &GENConv {
        &self.final_conv
    }

    /// Input feature width.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.node_encoder.in_features()
    }

    /// Output width.
    #[must_use]
    pub fn out_channels(&self) -> usize {
        self.final_conv.out_features()
    }

    /// Map node features `[N, num_features]` to `[N, out_channels]`.
    pub fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        check_node_features(x, edges, self.node_encoder.in_features())?;
        trace!(
            nodes = edges.num_nodes(),
            edges = edges.num_edges(),
            training = self.training,
            "DeeperGCN forward"
        );

        let head = &self.layers[0];
        let mut x = head.conv().forward(&self.node_encoder.forward(x), edges)?;
        for layer in &self.layers[1..] {
            x = layer.forward(&x, edges)?;
        }
        let x = self.dropout.forward(&head.norm_act(&x));
        self.final_conv.forward(&x, edges)
    }

    /// Total number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.node_encoder.num_parameters()
            + self
                .layers
                .iter()
                .map(|layer| layer.num_parameters())
                .sum::<usize>()
            + self.final_conv.num_parameters()
    }

    /// Switch every block and dropout to training mode.
    pub fn train(&mut self) {
        self.training = true;
        for layer in &mut self.layers {
            layer.train();
        }
        self.final_conv.train();
        self.dropout.train();
    }

    /// Switch every block and dropout to evaluation mode.
    pub fn eval(&mut self) {
        self.training = false;
        for layer in &mut self.layers {
            layer.eval();
        }
        self.final_conv.eval();
        self.dropout.eval();
    }

    /// Whether the model is in training mode.
    #[must_use]
    pub fn training(&self) -> bool {
        self.training
    }
}

impl std::fmt::Debug for DeeperGCN {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeperGCN")
            .field("node_encoder", &self.node_encoder)
            .field("num_layers", &self.layers.len())
            .field("final_conv", &self.final_conv)
            .field("training", &self.training)
            .finish()
    }
}
