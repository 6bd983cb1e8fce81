//! apktool invoker: `d` (decode) and `b` (build).
//!
//! Neither operation inspects its inputs; apktool's exit status is the only
//! error signal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{ToolAction, ToolError};
use crate::process::Toolchain;
use crate::tools::ToolKind;

/// Decode `apk` into `output_dir`. With `force`, an existing directory is overwritten.
pub fn decode(
    tc: &Toolchain,
    apk: &Path,
    output_dir: &Path,
    force: bool,
) -> Result<PathBuf, ToolError> {
    let mut args: Vec<OsString> = vec!["d".into(), apk.into(), "-o".into(), output_dir.into()];
    if force {
        args.push("-f".into());
    }

    tc.run_jar(ToolKind::Apktool, args)?.check(ToolAction::Decode)?;
    info!("Decoded {} -> {}", apk.display(), output_dir.display());
    Ok(output_dir.to_path_buf())
}

/// Rebuild the decoded project at `source_dir` into `output_apk`.
pub fn build(tc: &Toolchain, source_dir: &Path, output_apk: &Path) -> Result<PathBuf, ToolError> {
    let args: Vec<OsString> = vec!["b".into(), source_dir.into(), "-o".into(), output_apk.into()];

    tc.run_jar(ToolKind::Apktool, args)?.check(ToolAction::Build)?;
    info!("Built {} -> {}", source_dir.display(), output_apk.display());
    Ok(output_apk.to_path_buf())
}
