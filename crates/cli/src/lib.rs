use std::path::{Path, PathBuf};

pub mod commands;

/// Initialize the global logger.
///
/// The filter comes from `APKFORGE_LOG` (default `warn`); each `-v` raises it:
/// one to `debug`, two or more to `trace`.
pub fn init_logger(verbose: u8) {
    let env = env_logger::Env::new()
        .filter_or("APKFORGE_LOG", "warn")
        .write_style("APKFORGE_LOG_STYLE");

    let mut builder = env_logger::Builder::from_env(env);
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    // Tests may initialize more than once.
    let _ = builder.try_init();
}

/// Name of the directory at `path`.
///
/// `.` and `..` are resolved against the filesystem; if that fails (or the
/// path has no final component, e.g. `/`), fall back to `app`.
pub fn infer_dir_name(path: &Path) -> String {
    let resolved = match path.file_name() {
        Some(_) => path.to_path_buf(),
        None => path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
    };
    resolved.file_name().and_then(|os_str| os_str.to_str()).unwrap_or("app").to_string()
}

/// Default decode target: the APK's file stem, relative to the working directory.
pub fn default_decode_dir(apk: &Path) -> PathBuf {
    let stem = apk.file_stem().and_then(|s| s.to_str()).unwrap_or("decoded");
    PathBuf::from(stem)
}

/// Default build output: `<dirname>_mod.apk`, relative to the working directory.
pub fn default_build_output(source: &Path) -> PathBuf {
    PathBuf::from(format!("{}_mod.apk", infer_dir_name(source)))
}
