use serde::{Deserialize, Serialize};

use super::{check_node_features, EdgeIndex, GraphModule};
use crate::error::Result;
use crate::nn::init::derive_seed;
use crate::nn::{Linear, Mlp, Module, NormKind};
use crate::tensor::Tensor;

/// Neighborhood aggregation used by [`GENConv`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenAggregation {
    /// Per-channel softmax over incoming messages scaled by temperature `t`.
    Softmax {
        /// Initial inverse temperature
        t: f32,
        /// Whether `t` is a learnable parameter
        learn_t: bool,
    },
    /// Mean of incoming messages
    Mean,
    /// Sum of incoming messages
    Sum,
    /// Per-channel maximum of incoming messages
    Max,
}

impl Default for GenAggregation {
    fn default() -> Self {
        Self::Softmax {
            t: 1.0,
            learn_t: false,
        }
    }
}

/// Options for [`GENConv`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConvOptions {
    /// Aggregation scheme
    pub aggregation: GenAggregation,
    /// Number of MLP layers after aggregation
    pub num_layers: usize,
    /// Hidden width multiplier of the MLP
    pub expansion: usize,
    /// Normalization inside the MLP
    pub norm: NormKind,
    /// Added to every message after `ReLU`
    pub eps: f32,
    /// Whether projections and MLP layers carry a bias
    pub bias: bool,
}

impl Default for GenConvOptions {
    fn default() -> Self {
        Self {
            aggregation: GenAggregation::default(),
            num_layers: 2,
            expansion: 2,
            norm: NormKind::Batch,
            eps: 1e-7,
            bias: false,
        }
    }
}

/// Generalized graph convolution from DeeperGCN (Li et al., 2020).
///
/// ```text
/// m_st = ReLU(x_s) + eps
/// a_t  = AGG({m_st : s -> t})
/// x'_t = MLP(a_t + x_t)
/// ```
///
/// With softmax aggregation each channel is weighted by
/// `softmax_s(t * m_st)` over the incoming edges of `t`. Nodes with no
/// incoming edges aggregate to zero. When the input and output widths
/// differ, source and destination features are first projected by separate
/// `Linear` layers.
///
/// # Example
/// ```
/// use graphnets::nn::gnn::{EdgeIndex, GENConv, GenConvOptions, GraphModule};
/// use graphnets::tensor::Tensor;
///
/// let conv = GENConv::with_options(8, 8, GenConvOptions::default(), Some(0));
/// let out = conv.forward(&Tensor::ones(&[4, 8]), &EdgeIndex::ring(4)).expect("valid input");
/// assert_eq!(out.shape(), &[4, 8]);
/// ```
pub struct GENConv {
    in_features: usize,
    out_features: usize,
    options: GenConvOptions,
    /// Learnable temperature (only when `learn_t`)
    t: Option<Tensor>,
    lin_src: Option<Linear>,
    lin_dst: Option<Linear>,
    mlp: Mlp,
    training: bool,
}

impl GENConv {
    /// Create a `GENConv` with default options.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_options(in_features, out_features, GenConvOptions::default(), None)
    }

    /// Create a `GENConv` with explicit options.
    ///
    /// # Panics
    ///
    /// Panics if `options.num_layers == 0`.
    #[must_use]
    pub fn with_options(
        in_features: usize,
        out_features: usize,
        options: GenConvOptions,
        seed: Option<u64>,
    ) -> Self {
        assert!(options.num_layers > 0, "GENConv needs at least one MLP layer");

        let projection = |offset: u64| {
            let s = derive_seed(seed, offset);
            if options.bias {
                Linear::with_seed(in_features, out_features, s)
            } else {
                Linear::without_bias(in_features, out_features, s)
            }
        };
        let (lin_src, lin_dst) = if in_features == out_features {
            (None, None)
        } else {
            (Some(projection(0)), Some(projection(1)))
        };

        let mut channels = vec![out_features];
        channels.extend(std::iter::repeat(out_features * options.expansion).take(options.num_layers - 1));
        channels.push(out_features);
        let mlp = Mlp::new(&channels, options.norm, options.bias, derive_seed(seed, 2));

        let t = match options.aggregation {
            GenAggregation::Softmax { t, learn_t: true } => Some(Tensor::from_slice(&[t])),
            _ => None,
        };

        Self {
            in_features,
            out_features,
            options,
            t,
            lin_src,
            lin_dst,
            mlp,
            training: true,
        }
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Construction options.
    #[must_use]
    pub fn options(&self) -> &GenConvOptions {
        &self.options
    }

    /// Current softmax temperature, if softmax aggregation is used.
    #[must_use]
    pub fn temperature(&self) -> Option<f32> {
        match (&self.t, self.options.aggregation) {
            (Some(t), _) => Some(t.data()[0]),
            (None, GenAggregation::Softmax { t, .. }) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn aggregate(&self, x_src: &Tensor, edges: &EdgeIndex) -> Tensor {
        let (n, f) = (edges.num_nodes(), x_src.dim(1));
        let xs = x_src.data();
        let eps = self.options.eps;
        let message = |s: usize, k: usize| xs[s * f + k].max(0.0) + eps;

        let mut out = vec![0.0f32; n * f];
        let mut count = vec![0usize; n];
        for &t in edges.targets() {
            count[t] += 1;
        }

        match self.options.aggregation {
            GenAggregation::Softmax { .. } => {
                let temp = self.temperature().unwrap_or(1.0);
                // Per-target, per-channel max for a stable softmax
                let mut max = vec![f32::NEG_INFINITY; n * f];
                for (s, t, _) in edges.iter() {
                    for k in 0..f {
                        max[t * f + k] = max[t * f + k].max(temp * message(s, k));
                    }
                }
                let mut denom = vec![0.0f32; n * f];
                for (s, t, _) in edges.iter() {
                    for k in 0..f {
                        let m = message(s, k);
                        let w = (temp * m - max[t * f + k]).exp();
                        denom[t * f + k] += w;
                        out[t * f + k] += w * m;
                    }
                }
                for (o, d) in out.iter_mut().zip(&denom) {
                    if *d > 0.0 {
                        *o /= d;
                    }
                }
            }
            GenAggregation::Sum | GenAggregation::Mean => {
                for (s, t, _) in edges.iter() {
                    for k in 0..f {
                        out[t * f + k] += message(s, k);
                    }
                }
                if self.options.aggregation == GenAggregation::Mean {
                    for (t, &c) in count.iter().enumerate() {
                        if c > 0 {
                            for v in &mut out[t * f..(t + 1) * f] {
                                *v /= c as f32;
                            }
                        }
                    }
                }
            }
            GenAggregation::Max => {
                let mut max = vec![f32::NEG_INFINITY; n * f];
                for (s, t, _) in edges.iter() {
                    for k in 0..f {
                        max[t * f + k] = max[t * f + k].max(message(s, k));
                    }
                }
                for (o, m) in out.iter_mut().zip(max) {
                    if m.is_finite() {
                        *o = m;
                    }
                }
            }
        }

        Tensor::new(&out, &[n, f])
    }
}

impl GraphModule for GENConv {
    fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        check_node_features(x, edges, self.in_features)?;

        let x_src = match &self.lin_src {
            Some(lin) => lin.forward(x),
            None => x.clone(),
        };
        let x_dst = match &self.lin_dst {
            Some(lin) => lin.forward(x),
            None => x.clone(),
        };

        let out = self.aggregate(&x_src, edges).add(&x_dst);
        Ok(self.mlp.forward(&out))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut p: Vec<&Tensor> = self.t.iter().collect();
        for lin in self.lin_src.iter().chain(&self.lin_dst) {
            p.extend(lin.parameters());
        }
        p.extend(self.mlp.parameters());
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p: Vec<&mut Tensor> = self.t.iter_mut().collect();
        for lin in self.lin_src.iter_mut().chain(self.lin_dst.iter_mut()) {
            p.extend(lin.parameters_mut());
        }
        p.extend(self.mlp.parameters_mut());
        p
    }

    fn train(&mut self) {
        self.training = true;
        self.mlp.train();
    }

    fn eval(&mut self) {
        self.training = false;
        self.mlp.eval();
    }

    fn training(&self) -> bool {
        self.training
    }
}

impl std::fmt::Debug for GENConv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GENConv")
            .field("in_features", &self.in_features)
            .field("out_features", &self.out_features)
            .field("aggregation", &self.options.aggregation)
            .field("norm", &self.options.norm)
            .finish_non_exhaustive()
    }
}
