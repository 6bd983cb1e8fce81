//! uber-apk-signer invoker.
//!
//! The signer picks its own output name (`<stem>-aligned-debugSigned.apk`) and
//! only accepts an output directory. Each invocation therefore writes into a
//! fresh scratch directory, where the result is the only candidate, and the
//! file is then moved into the destination directory.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{ToolAction, ToolError};
use crate::process::Toolchain;
use crate::tools::ToolKind;

/// Name shape produced when the signer also zipaligns.
pub const PRIMARY_PATTERN: &str = "*-aligned-debugSigned.apk";
/// Any debug-signed output.
pub const FALLBACK_PATTERN: &str = "*-debugSigned.apk";

/// Debug-sign `apk`, placing the result in `output_dir` (created if missing)
/// or next to the input.
pub fn sign(tc: &Toolchain, apk: &Path, output_dir: Option<&Path>) -> Result<PathBuf, ToolError> {
    let dest_dir = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => parent_dir(apk),
    };

    let scratch = tempfile::Builder::new().prefix(".apkforge-sign-").tempdir_in(&dest_dir)?;
    let args: Vec<OsString> =
        vec!["--apks".into(), apk.into(), "--out".into(), scratch.path().into()];
    tc.run_jar(ToolKind::Signer, args)?.check(ToolAction::Sign)?;

    let produced = discover_signed(scratch.path())?;
    let file_name = produced
        .file_name()
        .ok_or_else(|| ToolError::SignedOutputNotFound(scratch.path().to_path_buf()))?;
    let signed = dest_dir.join(file_name);
    fs::rename(&produced, &signed)?;

    info!("Signed {} -> {}", apk.display(), signed.display());
    Ok(signed)
}

/// Find the signer's output in `dir`: the first primary match in name order,
/// else the first fallback match.
pub fn discover_signed(dir: &Path) -> Result<PathBuf, ToolError> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    for pattern in [PRIMARY_PATTERN, FALLBACK_PATTERN] {
        let full = format!("{escaped}/{pattern}");
        let mut matches: Vec<PathBuf> = glob::glob(&full)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        matches.sort();
        if let Some(found) = matches.into_iter().next() {
            debug!("Signed output matched {pattern}: {}", found.display());
            return Ok(found);
        }
    }
    Err(ToolError::SignedOutputNotFound(dir.to_path_buf()))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
