use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use apkforge_core::zipalign::DEFAULT_ALIGNMENT;
use apkforge_core::{apktool, pipeline, signer, zipalign};

use crate::commands::{require_dir, require_file, toolchain_from_env};
use crate::{default_build_output, default_decode_dir};

/// Decode an APK into a directory of resources and smali.
pub fn decode_command(apk: &str, output: Option<String>, force: bool) -> Result<PathBuf> {
    let apk = Path::new(apk);
    require_file(apk)?;
    let output = output.map(PathBuf::from).unwrap_or_else(|| default_decode_dir(apk));

    let tc = toolchain_from_env()?;
    println!("Decoding {} -> {}/", apk.display(), output.display());
    apktool::decode(&tc, apk, &output, force)
        .with_context(|| format!("Failed to decode {}", apk.display()))?;

    println!("Done! Output directory: {}/", output.display());
    Ok(output)
}

/// Rebuild a decoded directory into a signed, aligned APK.
pub fn build_command(source: &str, output: Option<String>) -> Result<PathBuf> {
    let source = Path::new(source);
    require_dir(source)?;
    let output = output.map(PathBuf::from).unwrap_or_else(|| default_build_output(source));

    let tc = toolchain_from_env()?;
    println!("Building {}/ -> {}", source.display(), output.display());
    let outcome = pipeline::build_apk(&tc, source, &output)
        .with_context(|| format!("Failed to build {}", source.display()))?;

    println!("Done! APK: {}", outcome.output.display());
    Ok(outcome.output)
}

/// Debug-sign an existing APK; the result lands next to the input.
pub fn sign_command(apk: &str) -> Result<PathBuf> {
    let apk = Path::new(apk);
    require_file(apk)?;

    let tc = toolchain_from_env()?;
    println!("Signing {}...", apk.display());
    let signed = signer::sign(&tc, apk, None)
        .with_context(|| format!("Failed to sign {}", apk.display()))?;

    println!("Done! Signed APK: {}", signed.display());
    Ok(signed)
}

/// Zipalign an existing APK.
pub fn align_command(apk: &str, output: Option<String>) -> Result<PathBuf> {
    let apk = Path::new(apk);
    require_file(apk)?;
    let output = output.map(PathBuf::from);

    let tc = toolchain_from_env()?;
    println!("Aligning {}...", apk.display());
    let aligned = zipalign::align(&tc, apk, output.as_deref(), DEFAULT_ALIGNMENT)
        .with_context(|| format!("Failed to align {}", apk.display()))?;

    println!("Done! Aligned APK: {}", aligned.display());
    Ok(aligned)
}
