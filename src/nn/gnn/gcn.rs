use super::{check_node_features, EdgeIndex, GraphModule};
use crate::error::Result;
use crate::nn::init::{xavier_uniform, zeros};
use crate::tensor::Tensor;

/// Graph Convolutional Network layer (Kipf & Welling, 2017).
///
/// Implements the propagation rule:
/// X' = D̃^(-1/2) Ã D̃^(-1/2) X W + b
///
/// Where:
/// - Ã = A + I (adjacency with self-loops)
/// - D̃ = weighted in-degree matrix of Ã
///
/// No activation is applied; callers compose `ReLU` themselves.
///
/// # Example
/// ```
/// use graphnets::nn::gnn::{EdgeIndex, GCNConv, GraphModule};
/// use graphnets::tensor::Tensor;
///
/// let gcn = GCNConv::with_seed(64, 32, Some(0));
/// let x = Tensor::new(&vec![0.1; 3 * 64], &[3, 64]);
/// let edges = EdgeIndex::from_edge_index(&[[0, 1], [1, 2]], 3);
/// let out = gcn.forward(&x, &edges).expect("valid input");
/// assert_eq!(out.shape(), &[3, 32]);
/// ```
#[derive(Debug, Clone)]
pub struct GCNConv {
    in_features: usize,
    out_features: usize,
    /// Weight matrix [`in_features`, `out_features`]
    weight: Tensor,
    bias: Option<Tensor>,
    add_self_loops: bool,
    normalize: bool,
}

impl GCNConv {
    /// Create a new GCN layer.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a GCN layer with deterministic initialization.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        Self {
            in_features,
            out_features,
            weight: xavier_uniform(
                &[in_features, out_features],
                in_features,
                out_features,
                seed,
            ),
            bias: Some(zeros(&[out_features])),
            add_self_loops: true,
            normalize: true,
        }
    }

    /// Disable bias.
    #[must_use]
    pub fn without_bias(mut self) -> Self {
        self.bias = None;
        self
    }

    /// Disable automatic self-loop addition.
    #[must_use]
    pub fn without_self_loops(mut self) -> Self {
        self.add_self_loops = false;
        self
    }

    /// Disable symmetric normalization (plain weighted sum).
    #[must_use]
    pub fn without_normalize(mut self) -> Self {
        self.normalize = false;
        self
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

    /// Weight tensor `[in_features, out_features]`.
    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Replace the weight tensor.
    ///
    /// # Panics
    ///
    /// Panics if the shape is not `[in_features, out_features]`.
    pub fn set_weight(&mut self, weight: Tensor) {
        assert_eq!(weight.shape(), &[self.in_features, self.out_features]);
        self.weight = weight;
    }
}

impl GraphModule for GCNConv {
    // Contract: out[t] = sum_s norm(s, t) * (XW)[s] + b
    fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        check_node_features(x, edges, self.in_features)?;

        let graph = if self.add_self_loops {
            edges.add_remaining_self_loops(1.0)
        } else {
            edges.clone()
        };

        let num_nodes = x.dim(0);
        let out_f = self.out_features;

        let norm_coeffs: Vec<f32> = graph
            .in_degrees()
            .iter()
            .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
            .collect();

        // Step 1: Transform features: H = X * W
        let h = x.matmul(&self.weight);
        let h_data = h.data();

        // Step 2: Message passing with normalization
        let mut output = vec![0.0f32; num_nodes * out_f];
        for (src, tgt, w) in graph.iter() {
            let coeff = if self.normalize {
                norm_coeffs[src] * w * norm_coeffs[tgt]
            } else {
                w
            };
            if coeff == 0.0 {
                continue;
            }
            for f in 0..out_f {
                output[tgt * out_f + f] += coeff * h_data[src * out_f + f];
            }
        }

        // Step 3: Add bias
        let out = Tensor::new(&output, &[num_nodes, out_f]);
        Ok(match &self.bias {
            Some(b) => out.broadcast_add(b),
            None => out,
        })
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut p = vec![&self.weight];
        p.extend(self.bias.as_ref());
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p = vec![&mut self.weight];
        p.extend(self.bias.as_mut());
        p
    }
}
