//! Environment-driven configuration.
//!
//! apkforge keeps no configuration files. Everything that can be tuned is read
//! from `APKFORGE_*` environment variables:
//! - `APKFORGE_TOOLS_DIR`: tool cache directory (default `~/.apkforge/tools`).
//! - `APKFORGE_JAVA`: explicit Java executable.
//! - `APKFORGE_{APKTOOL,SIGNER,ZIPALIGN}_URL`: download source override.
//! - `APKFORGE_{APKTOOL,SIGNER,ZIPALIGN}_SHA256`: pinned digest of the download.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::error::ProvisionError;
use crate::tools::ToolKind;

pub const TOOLS_DIR_ENV: &str = "APKFORGE_TOOLS_DIR";
pub const JAVA_ENV: &str = "APKFORGE_JAVA";

/// Per-tool overrides of where an artifact comes from and what it must hash to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverride {
    pub url: Option<String>,
    pub sha256: Option<String>,
}

/// Resolved configuration for a toolchain.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Directory holding the cached tool artifacts.
    pub tools_dir: PathBuf,
    /// Java executable to use instead of searching `PATH`.
    pub java: Option<PathBuf>,
    pub overrides: HashMap<ToolKind, SourceOverride>,
}

impl ToolConfig {
    /// Configuration with an explicit cache directory and no overrides.
    pub fn new(tools_dir: impl Into<PathBuf>) -> Self {
        Self { tools_dir: tools_dir.into(), java: None, overrides: HashMap::new() }
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self, ProvisionError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProvisionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tools_dir = match lookup(TOOLS_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_tools_dir()?,
        };
        let mut config = Self::new(tools_dir);
        config.java = lookup(JAVA_ENV).map(PathBuf::from);

        for kind in ToolKind::ALL {
            let prefix = kind.env_prefix();
            let source = SourceOverride {
                url: lookup(&format!("{prefix}_URL")),
                sha256: lookup(&format!("{prefix}_SHA256")).map(|s| s.trim().to_ascii_lowercase()),
            };
            if source != SourceOverride::default() {
                config.overrides.insert(kind, source);
            }
        }
        Ok(config)
    }

    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = Some(java.into());
        self
    }

    pub fn with_override(mut self, kind: ToolKind, source: SourceOverride) -> Self {
        self.overrides.insert(kind, source);
        self
    }

    pub fn override_for(&self, kind: ToolKind) -> Option<&SourceOverride> {
        self.overrides.get(&kind)
    }
}

/// `~/.apkforge/tools`
pub fn default_tools_dir() -> Result<PathBuf, ProvisionError> {
    dirs::home_dir()
        .map(|home| home.join(".apkforge").join("tools"))
        .ok_or(ProvisionError::NoHomeDirectory)
}
