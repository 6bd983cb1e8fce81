//! zipalign invoker.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{ToolAction, ToolError};
use crate::process::Toolchain;
use crate::tools::ToolKind;

/// Alignment boundary in bytes used when the caller has no preference.
pub const DEFAULT_ALIGNMENT: u32 = 4;

/// `<dir>/<stem>_aligned.<ext>` next to `input`.
pub fn default_aligned_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_aligned.{}", ext.to_string_lossy()),
        None => format!("{stem}_aligned"),
    };
    input.with_file_name(name)
}

/// Align `input` into `output` (or the default `_aligned` sibling).
///
/// Arguments are passed as `-f -p <alignment> <input> <output>`: overwrite the
/// output, page-align uncompressed shared objects.
pub fn align(
    tc: &Toolchain,
    input: &Path,
    output: Option<&Path>,
    alignment: u32,
) -> Result<PathBuf, ToolError> {
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_aligned_path(input));
    let args: Vec<OsString> = vec![
        "-f".into(),
        "-p".into(),
        alignment.to_string().into(),
        input.into(),
        output.clone().into(),
    ];

    tc.run_native(ToolKind::Zipalign, args)?.check(ToolAction::Align)?;
    info!("Aligned {} -> {}", input.display(), output.display());
    Ok(output)
}
