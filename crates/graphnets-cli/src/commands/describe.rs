//! Describe command implementation

use std::path::Path;

use tracing::info;

use super::load_config;
use crate::error::Result;
use crate::output;

/// Run the describe command
pub(crate) fn run(path: &Path, json: bool) -> Result<()> {
    let config = load_config(path)?;
    let model = config.build()?;
    let summary = model.summary();
    info!(model = summary.model, parameters = summary.parameters, "described model");

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::header(&format!("{}", path.display()));
    output::kv("model", summary.model);
    output::kv("inputs", config.input_features());
    output::kv("layers", summary.layers);
    output::kv("parameters", summary.parameters);
    output::kv("recurrent", summary.recurrent);
    Ok(())
}
