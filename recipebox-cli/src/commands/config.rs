use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use shared::config::client::{ClientConfig, ConfigFormat};

/// Writes a configuration file filled with default values.
///
/// # Errors
/// Returns an error if serialization or writing the file fails.
pub fn generate_config(format: ConfigFormat, output: Option<PathBuf>) -> Result<()> {
    let config = ClientConfig::with_defaults();
    let serialized = config
        .render(format)
        .context("failed to serialize default configuration")?;

    let path = output.unwrap_or_else(|| PathBuf::from(format.file_name()));
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write configuration to {}", path.display()))?;

    println!("Configuration file '{}' generated successfully.", path.display());
    Ok(())
}
