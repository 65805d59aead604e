//! Graph Neural Network layers for learning on graph-structured data.
//!
//! Every layer consumes a node feature matrix `[num_nodes, features]` and an
//! [`EdgeIndex`] describing directed edges in COO format.
//!
//! # Implemented Layers
//!
//! - [`GCNConv`] - Graph Convolutional Network (Kipf & Welling, 2017)
//! - [`ChebConv`] - Chebyshev spectral convolution (Defferrard et al., 2016)
//! - [`GConvGRU`] - Graph-convolutional GRU cell (Seo et al., 2018)
//! - [`GENConv`] - Generalized aggregation convolution (Li et al., 2020)
//! - [`DeepGCNLayer`] - Residual DeepGCN block around a [`GENConv`]
//!
//! # Example
//!
//! ```
//! use graphnets::nn::gnn::{EdgeIndex, GCNConv, GraphModule};
//! use graphnets::tensor::Tensor;
//!
//! let edges = EdgeIndex::from_edge_index(&[[0, 1], [1, 2], [2, 0]], 3);
//! let gcn = GCNConv::with_seed(64, 32, Some(7));
//! let x = Tensor::new(&vec![0.0; 3 * 64], &[3, 64]);
//! let out = gcn.forward(&x, &edges).expect("valid input");
//! assert_eq!(out.shape(), &[3, 32]);
//! ```
//!
//! # References
//!
//! - Kipf, T. N., & Welling, M. (2017). Semi-Supervised Classification with
//!   Graph Convolutional Networks. ICLR.
//! - Defferrard, M., et al. (2016). Convolutional Neural Networks on Graphs
//!   with Fast Localized Spectral Filtering. `NeurIPS`.
//! - Seo, Y., et al. (2018). Structured Sequence Modeling with Graph
//!   Convolutional Recurrent Networks. ICONIP.
//! - Li, G., et al. (2020). `DeeperGCN`: All You Need to Train Deeper GCNs.

use crate::error::{GraphNetsError, Result};
use crate::tensor::Tensor;

mod cheb;
mod deep;
mod edge_index;
mod gcn;
mod gconv_gru;
mod gen_conv;

pub use cheb::{ChebConv, ChebNormalization};
pub use deep::{DeepBlock, DeepGCNLayer};
pub use edge_index::EdgeIndex;
pub use gcn::GCNConv;
pub use gconv_gru::GConvGRU;
pub use gen_conv::{GENConv, GenAggregation, GenConvOptions};

/// A layer that maps node features over a graph.
///
/// Unlike [`crate::nn::Module`], inputs come from callers and are checked,
/// so `forward` returns a [`Result`].
pub trait GraphModule: Send + Sync {
    /// Apply the layer to `x` `[num_nodes, in_features]` over `edges`.
    fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor>;

    /// Learnable parameters.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Mutable access to learnable parameters.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// Switch to training mode.
    fn train(&mut self) {}

    /// Switch to evaluation mode.
    fn eval(&mut self) {}

    /// Whether the layer is in training mode.
    fn training(&self) -> bool {
        false
    }

    /// Total number of learnable scalars.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}

/// Validate a node feature matrix against a graph and a layer width.
pub(crate) fn check_node_features(x: &Tensor, edges: &EdgeIndex, in_features: usize) -> Result<()> {
    if x.ndim() != 2 {
        return Err(GraphNetsError::dimension_mismatch("ndim", 2, x.ndim()));
    }
    if x.dim(0) != edges.num_nodes() {
        return Err(GraphNetsError::dimension_mismatch(
            "num_nodes",
            edges.num_nodes(),
            x.dim(0),
        ));
    }
    if x.dim(1) != in_features {
        return Err(GraphNetsError::dimension_mismatch(
            "in_features",
            in_features,
            x.dim(1),
        ));
    }
    edges.validate()
}
