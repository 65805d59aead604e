//! Graph neural network architectures assembled from [`crate::nn::gnn`] layers.
//!
//! - [`RecurrentGCN`] - stack of five `K = 1` [`GConvGRU`] cells over a
//!   sequence of graph snapshots
//! - [`ScalableRecurrentGCN`] - configurable-depth variant with a larger
//!   Chebyshev neighborhood and dropout on each prediction
//! - [`ConvGraphNet`] - plain [`GCNConv`](crate::nn::gnn::GCNConv) chain
//! - [`DeeperGCN`] - residual `res+` stack of
//!   [`GENConv`](crate::nn::gnn::GENConv) blocks
//!
//! [`ModelConfig`] describes any of them in JSON and builds a [`GraphNet`],
//! which runs every architecture over a snapshot sequence with one call.
//!
//! # Example
//!
//! ```
//! use graphnets::models::RecurrentGCN;
//! use graphnets::nn::gnn::EdgeIndex;
//! use graphnets::tensor::Tensor;
//!
//! let model = RecurrentGCN::with_seed(3, 2, Some(42));
//! let edges = EdgeIndex::ring(4);
//! let snapshots = vec![Tensor::ones(&[4, 3]); 5];
//! let out = model.forward(&snapshots, &edges).expect("valid input");
//! assert_eq!(out.shape(), &[5, 4, 2]);
//! ```

mod config;
mod conv_graph_net;
mod deeper_gcn;
mod graph_net;
mod recurrent_gcn;
mod scalable_recurrent_gcn;

pub use config::{
    ConvGraphNetConfig, DeeperGcnConfig, ModelConfig, RecurrentGcnConfig,
    ScalableRecurrentGcnConfig,
};
pub use conv_graph_net::ConvGraphNet;
pub use deeper_gcn::DeeperGCN;
pub use graph_net::{GraphNet, ModelSummary};
pub use recurrent_gcn::RecurrentGCN;
pub use scalable_recurrent_gcn::ScalableRecurrentGCN;

use crate::error::{GraphNetsError, Result};
use crate::nn::gnn::{EdgeIndex, GConvGRU};
use crate::tensor::Tensor;

/// Run stacked recurrent cells over `snapshots`.
///
/// Each layer keeps its own hidden state across time. Layer 0 reads the
/// snapshot; layer `i` reads layer `i - 1`'s new state and is followed by
/// `ReLU`. `readout` maps the last layer's state to the step's prediction.
/// Returns `[T, N, out]`.
pub(crate) fn unroll(
    layers: &[GConvGRU],
    snapshots: &[Tensor],
    edges: &EdgeIndex,
    readout: impl Fn(&Tensor) -> Tensor,
) -> Result<Tensor> {
    if snapshots.is_empty() {
        return Err(GraphNetsError::empty_input("snapshot sequence"));
    }
    let Some((first, rest)) = layers.split_first() else {
        return Err(GraphNetsError::empty_input("recurrent layers"));
    };

    let mut first_state: Option<Tensor> = None;
    let mut states: Vec<Option<Tensor>> = vec![None; rest.len()];
    let mut predictions = Vec::with_capacity(snapshots.len());

    for x in snapshots {
        let mut prev = first.forward_step(x, edges, first_state.as_ref())?;
        first_state = Some(prev.clone());

        for (layer, state) in rest.iter().zip(states.iter_mut()) {
            let h = layer.forward_step(&prev, edges, state.as_ref())?.relu();
            *state = Some(h.clone());
            prev = h;
        }
        predictions.push(readout(&prev));
    }

    Tensor::stack(&predictions)
}

#[cfg(test)]
mod tests;
