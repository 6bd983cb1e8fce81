//! The `build` pipeline: rebuild, align, sign, clean up, rename.
//!
//! Stages run strictly in order. The first failing stage ends the build with a
//! [`PipelineError`] that names the stage and lists the intermediates still on
//! disk; nothing is rolled back.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::apktool;
use crate::error::{PipelineError, ToolError};
use crate::process::Toolchain;
use crate::signer;
use crate::zipalign::{self, DEFAULT_ALIGNMENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Rebuild,
    Align,
    Sign,
    Cleanup,
    Rename,
}

impl BuildStage {
    pub const ORDER: [BuildStage; 5] = [
        BuildStage::Rebuild,
        BuildStage::Align,
        BuildStage::Sign,
        BuildStage::Cleanup,
        BuildStage::Rename,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rebuild => "rebuild",
            Self::Align => "align",
            Self::Sign => "sign",
            Self::Cleanup => "cleanup",
            Self::Rename => "rename",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Signed, aligned APK at the requested name.
    pub output: PathBuf,
    /// Aligned-but-unsigned intermediate.
    pub aligned: PathBuf,
    /// Whether the cleanup stage deleted `aligned`.
    pub intermediate_removed: bool,
}

/// Rebuild `source_dir` into a signed, aligned APK at `output_apk`.
pub fn build_apk(
    tc: &Toolchain,
    source_dir: &Path,
    output_apk: &Path,
) -> Result<BuildOutcome, PipelineError> {
    let mut leftovers: Vec<PathBuf> = Vec::new();

    info!("[{}] {} -> {}", BuildStage::Rebuild, source_dir.display(), output_apk.display());
    let built = apktool::build(tc, source_dir, output_apk)
        .map_err(|e| stage_failed(BuildStage::Rebuild, &leftovers, e))?;
    leftovers.push(built.clone());

    info!("[{}] {}", BuildStage::Align, built.display());
    let aligned = zipalign::align(tc, &built, None, DEFAULT_ALIGNMENT)
        .map_err(|e| stage_failed(BuildStage::Align, &leftovers, e))?;
    if aligned != built {
        leftovers.push(aligned.clone());
    }

    info!("[{}] {}", BuildStage::Sign, aligned.display());
    let signed = signer::sign(tc, &aligned, None)
        .map_err(|e| stage_failed(BuildStage::Sign, &leftovers, e))?;
    leftovers.push(signed.clone());

    // A failed cleanup leaves a stray file behind but does not fail the build.
    let intermediate_removed = match cleanup_intermediate(&aligned, &built) {
        Ok(removed) => removed,
        Err(e) => {
            warn!("[{}] could not remove {}: {e}", BuildStage::Cleanup, aligned.display());
            false
        }
    };
    if intermediate_removed {
        leftovers.retain(|p| p != &aligned);
    }

    let output = finalize_output(&signed, output_apk)
        .map_err(|e| stage_failed(BuildStage::Rename, &leftovers, e.into()))?;

    info!("Build complete: {}", output.display());
    Ok(BuildOutcome { output, aligned, intermediate_removed })
}

/// Delete the aligned intermediate unless it is the rebuild output itself.
///
/// Returns `Ok(true)` when a file was removed, `Ok(false)` when there was
/// nothing to remove.
pub fn cleanup_intermediate(aligned: &Path, built: &Path) -> io::Result<bool> {
    if aligned == built || !aligned.exists() {
        return Ok(false);
    }
    fs::remove_file(aligned)?;
    Ok(true)
}

/// Move `signed` to the requested file name, in the directory it was signed into.
///
/// An existing file at the destination is replaced.
pub fn finalize_output(signed: &Path, requested: &Path) -> io::Result<PathBuf> {
    let target = output_target(signed, requested);
    if signed != target {
        fs::rename(signed, &target)?;
    }
    Ok(target)
}

/// Final path for `requested`. A bare file name is kept as given.
fn output_target(signed: &Path, requested: &Path) -> PathBuf {
    let bare = requested.parent().map_or(true, |p| p.as_os_str().is_empty());
    match (signed.parent(), requested.file_name()) {
        (Some(dir), Some(name)) if !bare => dir.join(name),
        _ => requested.to_path_buf(),
    }
}

fn stage_failed(stage: BuildStage, leftovers: &[PathBuf], source: ToolError) -> PipelineError {
    let leftovers = leftovers.iter().filter(|p| p.exists()).cloned().collect();
    PipelineError { stage, leftovers, source }
}
