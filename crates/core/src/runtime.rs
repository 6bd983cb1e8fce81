//! Java runtime lookup.

use std::ffi::OsStr;
use std::path::PathBuf;

use log::debug;

use crate::error::ToolError;

/// Locate `java` on the process search path.
pub fn find_java() -> Result<PathBuf, ToolError> {
    let paths = std::env::var_os("PATH").ok_or(ToolError::JavaNotFound)?;
    let java = find_java_in(paths)?;
    debug!("Using java at {}", java.display());
    Ok(java)
}

/// Locate `java` on an explicit search path (same syntax as `PATH`).
pub fn find_java_in(paths: impl AsRef<OsStr>) -> Result<PathBuf, ToolError> {
    let cwd = std::env::current_dir()?;
    which::which_in("java", Some(paths), cwd).map_err(|_| ToolError::JavaNotFound)
}
