use std::path::Path;

use anyhow::{bail, Context, Result};
use apkforge_core::{ToolConfig, Toolchain};

/// Load configuration from the environment and build a real toolchain.
pub fn toolchain_from_env() -> Result<Toolchain> {
    let config = load_tool_config()?;
    Toolchain::from_config(&config).context("Failed to initialize toolchain")
}

pub fn load_tool_config() -> Result<ToolConfig> {
    ToolConfig::from_env().context("Failed to load tool configuration")
}

/// Fail with a user-facing message unless `path` exists.
pub fn require_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    Ok(())
}

/// Fail with a user-facing message unless `path` is a directory.
pub fn require_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!("directory not found: {}", path.display());
    }
    Ok(())
}
