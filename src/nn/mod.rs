//! Neural network building blocks.
//!
//! The nn module is organized around two traits:
//!
//! - [`Module`] for dense layers that map a tensor to a tensor:
//!   [`Linear`], [`ReLU`], [`Dropout`], [`LayerNorm`], [`GraphLayerNorm`],
//!   [`BatchNorm1d`], [`Mlp`]
//! - [`gnn::GraphModule`] for layers that also consume an edge list:
//!   [`gnn::GCNConv`], [`gnn::ChebConv`], [`gnn::GENConv`],
//!   [`gnn::DeepGCNLayer`]
//!
//! The recurrent cell [`gnn::GConvGRU`] threads a hidden state through a
//! sequence of graph snapshots.
//!
//! # Example
//!
//! ```
//! use graphnets::nn::{Linear, Module, ReLU};
//! use graphnets::tensor::Tensor;
//!
//! let encoder = Linear::with_seed(16, 8, Some(0));
//! let h = ReLU::new().forward(&encoder.forward(&Tensor::ones(&[4, 16])));
//! assert_eq!(h.shape(), &[4, 8]);
//! ```
//!
//! # References
//!
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.

mod activation;
mod dropout;
pub mod functional;
pub mod gnn;
pub mod init;
mod linear;
mod mlp;
mod module;
mod normalization;

pub use activation::ReLU;
pub use dropout::Dropout;
pub use functional as F;
pub use linear::Linear;
pub use mlp::{Mlp, NormKind};
pub use module::Module;
pub use normalization::{BatchNorm1d, GraphLayerNorm, LayerNorm};
