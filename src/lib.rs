//! graphnets: graph neural networks over sequences of graph snapshots.
//!
//! The crate provides a small dense [`tensor::Tensor`], PyTorch-style layer
//! modules in [`nn`], graph layers in [`nn::gnn`], and four ready-made
//! architectures in [`models`].
//!
//! # Quick Start
//!
//! ```
//! use graphnets::prelude::*;
//!
//! // Four nodes on a ring, three features per node, five time steps
//! let edges = EdgeIndex::ring(4);
//! let snapshots = vec![Tensor::ones(&[4, 3]); 5];
//!
//! let config = ModelConfig::from_json_str(
//!     r#"{ "model": "recurrent_gcn", "node_features": 3, "seed": 7 }"#,
//! )
//! .unwrap();
//! let model = config.build().unwrap();
//!
//! let predictions = model.forward_sequence(&snapshots, &edges).unwrap();
//! assert_eq!(predictions.shape(), &[5, 4, 2]);
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: Row-major `f32` tensor
//! - [`nn`]: Dense layers (`Linear`, `Dropout`, normalization, `Mlp`)
//! - [`nn::gnn`]: Graph layers (`GCNConv`, `ChebConv`, `GConvGRU`,
//!   `GENConv`, `DeepGCNLayer`)
//! - [`models`]: `RecurrentGCN`, `ConvGraphNet`, `DeeperGCN`,
//!   `ScalableRecurrentGCN` and their JSON configuration
//! - [`error`]: Error type shared by every fallible operation
//!
//! The library emits [`tracing`] events and never installs a subscriber.

pub mod error;
pub mod models;
pub mod nn;
pub mod prelude;
pub mod tensor;

pub use error::{GraphNetsError, Result};
pub use tensor::Tensor;
