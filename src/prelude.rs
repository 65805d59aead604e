//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use graphnets::prelude::*;
//! ```

pub use crate::error::{GraphNetsError, Result};
pub use crate::models::{
    ConvGraphNet, DeeperGCN, GraphNet, ModelConfig, RecurrentGCN, ScalableRecurrentGCN,
};
pub use crate::nn::gnn::{EdgeIndex, GraphModule};
pub use crate::nn::Module;
pub use crate::tensor::Tensor;
