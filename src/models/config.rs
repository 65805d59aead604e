//! JSON model configuration.
//!
//! ```
//! use graphnets::models::ModelConfig;
//!
//! let config = ModelConfig::from_json_str(
//!     r#"{ "model": "conv_graph_net", "input_dim": 8, "hidden_dim_sequence": [16, 8] }"#,
//! )
//! .expect("valid config");
//! let model = config.build().expect("valid config");
//! assert_eq!(model.kind(), "conv_graph_net");
//! assert_eq!(model.num_layers(), 3);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConvGraphNet, DeeperGCN, GraphNet, RecurrentGCN, ScalableRecurrentGCN};
use crate::error::{GraphNetsError, Result};

fn positive(param: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(GraphNetsError::invalid_hyperparameter(param, value, "> 0"));
    }
    Ok(())
}

fn widths(param: &str, values: &[usize], min_len: usize) -> Result<()> {
    if values.len() < min_len {
        return Err(GraphNetsError::invalid_hyperparameter(
            param,
            format!("{values:?}"),
            &format!("at least {min_len} entries"),
        ));
    }
    if values.contains(&0) {
        return Err(GraphNetsError::invalid_hyperparameter(
            param,
            format!("{values:?}"),
            "every width > 0",
        ));
    }
    Ok(())
}

fn recurrent_output_dim() -> usize {
    RecurrentGCN::DEFAULT_OUTPUT_DIM
}

fn conv_hidden_dims() -> Vec<usize> {
    ConvGraphNet::DEFAULT_HIDDEN_DIMS.to_vec()
}

fn conv_output_dim() -> usize {
    ConvGraphNet::DEFAULT_OUTPUT_DIM
}

fn scalable_hidden_dims() -> Vec<usize> {
    ScalableRecurrentGCN::DEFAULT_HIDDEN_DIMS.to_vec()
}

fn scalable_neighborhood_size() -> usize {
    ScalableRecurrentGCN::DEFAULT_NEIGHBORHOOD_SIZE
}

/// [`RecurrentGCN`] hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrentGcnConfig {
    /// Input features per node
    pub node_features: usize,
    /// Prediction width
    #[serde(default = "recurrent_output_dim")]
    pub output_dim: usize,
    /// Initialization seed
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RecurrentGcnConfig {
    /// Config with default output width.
    #[must_use]
    pub fn new(node_features: usize) -> Self {
        Self {
            node_features,
            output_dim: recurrent_output_dim(),
            seed: None,
        }
    }

    /// Check hyperparameters.
    pub fn validate(&self) -> Result<()> {
        positive("node_features", self.node_features)?;
        positive("output_dim", self.output_dim)
    }

    /// Build the model.
    pub fn build(&self) -> Result<RecurrentGCN> {
        self.validate()?;
        Ok(RecurrentGCN::with_seed(self.node_features, self.output_dim, self.seed))
    }
}

/// [`ConvGraphNet`] hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvGraphNetConfig {
    /// Input features per node
    pub input_dim: usize,
    /// Hidden layer widths
    #[serde(default = "conv_hidden_dims")]
    pub hidden_dim_sequence: Vec<usize>,
    /// Output width
    #[serde(default = "conv_output_dim")]
    pub output_dim: usize,
    /// Initialization seed
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ConvGraphNetConfig {
    /// Config with default hidden and output widths.
    #[must_use]
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            hidden_dim_sequence: conv_hidden_dims(),
            output_dim: conv_output_dim(),
            seed: None,
        }
    }

    /// Check hyperparameters.
    pub fn validate(&self) -> Result<()> {
        positive("input_dim", self.input_dim)?;
        widths("hidden_dim_sequence", &self.hidden_dim_sequence, 1)?;
        positive("output_dim", self.output_dim)
    }

    /// Build the model.
    pub fn build(&self) -> Result<ConvGraphNet> {
        self.validate()?;
        Ok(ConvGraphNet::with_config(
            self.input_dim,
            &self.hidden_dim_sequence,
            self.output_dim,
            self.seed,
        ))
    }
}

/// [`DeeperGCN`] hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeeperGcnConfig {
    /// Input features per node
    pub num_features: usize,
    /// Width of every residual block
    pub hidden_channels: usize,
    /// Output width
    pub out_channels: usize,
    /// Number of residual blocks
    pub num_layers: usize,
    /// Initialization seed
    #[serde(default)]
    pub seed: Option<u64>,
}

impl DeeperGcnConfig {
    /// Check hyperparameters.
    pub fn validate(&self) -> Result<()> {
        positive("num_features", self.num_features)?;
        positive("hidden_channels", self.hidden_channels)?;
        positive("out_channels", self.out_channels)?;
        positive("num_layers", self.num_layers)
    }

    /// Build the model.
    pub fn build(&self) -> Result<DeeperGCN> {
        self.validate()?;
        Ok(DeeperGCN::with_seed(
            self.num_features,
            self.hidden_channels,
            self.out_channels,
            self.num_layers,
            self.seed,
        ))
    }
}

/// [`ScalableRecurrentGCN`] hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalableRecurrentGcnConfig {
    /// Input features per node
    pub node_features: usize,
    /// Prediction width
    #[serde(default = "recurrent_output_dim")]
    pub output_dim: usize,
    /// One recurrent cell per entry; the last width is replaced by
    /// `output_dim`
    #[serde(default = "scalable_hidden_dims")]
    pub hidden_dim_sequence: Vec<usize>,
    /// Chebyshev filter size `K`
    #[serde(default = "scalable_neighborhood_size")]
    pub neighborhood_size: usize,
    /// Initialization seed
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ScalableRecurrentGcnConfig {
    /// Config with default widths and neighborhood.
    #[must_use]
    pub fn new(node_features: usize) -> Self {
        Self {
            node_features,
            output_dim: recurrent_output_dim(),
            hidden_dim_sequence: scalable_hidden_dims(),
            neighborhood_size: scalable_neighborhood_size(),
            seed: None,
        }
    }

    /// Check hyperparameters.
    pub fn validate(&self) -> Result<()> {
        positive("node_features", self.node_features)?;
        positive("output_dim", self.output_dim)?;
        widths("hidden_dim_sequence", &self.hidden_dim_sequence, 2)?;
        positive("neighborhood_size", self.neighborhood_size)
    }

    /// Build the model.
    pub fn build(&self) -> Result<ScalableRecurrentGCN> {
        self.validate()?;
        Ok(ScalableRecurrentGCN::with_config(
            self.node_features,
            self.output_dim,
            &self.hidden_dim_sequence,
            self.neighborhood_size,
            self.seed,
        ))
    }
}

/// Configuration of any supported model, tagged by `"model"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    /// `"recurrent_gcn"`
    RecurrentGcn(RecurrentGcnConfig),
    /// `"conv_graph_net"`
    ConvGraphNet(ConvGraphNetConfig),
    /// `"deeper_gcn"`
    DeeperGcn(DeeperGcnConfig),
    /// `"scalable_recurrent_gcn"`
    ScalableRecurrentGcn(ScalableRecurrentGcnConfig),
}

impl ModelConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check hyperparameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::RecurrentGcn(c) => c.validate(),
            Self::ConvGraphNet(c) => c.validate(),
            Self::DeeperGcn(c) => c.validate(),
            Self::ScalableRecurrentGcn(c) => c.validate(),
        }
    }

    /// Initialization seed, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        match self {
            Self::RecurrentGcn(c) => c.seed,
            Self::ConvGraphNet(c) => c.seed,
            Self::DeeperGcn(c) => c.seed,
            Self::ScalableRecurrentGcn(c) => c.seed,
        }
    }

    /// Replace the initialization seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        match &mut self {
            Self::RecurrentGcn(c) => c.seed = seed,
            Self::ConvGraphNet(c) => c.seed = seed,
            Self::DeeperGcn(c) => c.seed = seed,
            Self::ScalableRecurrentGcn(c) => c.seed = seed,
        }
        self
    }

    /// Input feature width expected by the model.
    #[must_use]
    pub fn input_features(&self) -> usize {
        match self {
            Self::RecurrentGcn(c) => c.node_features,
            Self::ConvGraphNet(c) => c.input_dim,
            Self::DeeperGcn(c) => c.num_features,
            Self::ScalableRecurrentGcn(c) => c.node_features,
        }
    }

    /// Validate and build the model.
    pub fn build(&self) -> Result<GraphNet> {
        Ok(match self {
            Self::RecurrentGcn(c) => GraphNet::RecurrentGcn(c.build()?),
            Self::ConvGraphNet(c) => GraphNet::ConvGraphNet(c.build()?),
            Self::DeeperGcn(c) => GraphNet::DeeperGcn(c.build()?),
            Self::ScalableRecurrentGcn(c) => GraphNet::ScalableRecurrentGcn(c.build()?),
        })
    }
}
