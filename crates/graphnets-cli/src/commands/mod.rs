//! Subcommand implementations

pub(crate) mod describe;
pub(crate) mod run;

use std::path::Path;

use graphnets::models::ModelConfig;

use crate::error::{CliError, Result};

/// Load a model config, reporting a missing file distinctly.
pub(crate) fn load_config(path: &Path) -> Result<ModelConfig> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    Ok(ModelConfig::from_json_file(path)?)
}
