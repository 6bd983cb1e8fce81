//! Error types shared by provisioning, the tool invokers and the build pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::BuildStage;

/// Failure while making a tool available in the local cache.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// No prebuilt artifact exists for this host.
    #[error("Unsupported platform for {tool}: {os}")]
    UnsupportedPlatform { tool: &'static str, os: String },

    /// The downloaded archive did not contain the expected executable.
    #[error("{entry} not found in downloaded archive {}", .archive.display())]
    EntryNotFound { entry: String, archive: PathBuf },

    /// Transport failure; downloads are attempted once.
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Downloaded bytes do not hash to the pinned value.
    #[error("SHA-256 mismatch for {tool}: expected {expected}, got {actual}")]
    DigestMismatch { tool: &'static str, expected: String, actual: String },

    #[error("Could not determine the home directory; set APKFORGE_TOOLS_DIR")]
    NoHomeDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Which tool operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    Decode,
    Build,
    Align,
    Sign,
}

impl fmt::Display for ToolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "decode",
            Self::Build => "build",
            Self::Align => "alignment",
            Self::Sign => "signing",
        })
    }
}

/// Failure while invoking one of the external tools.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Java runtime not found on PATH. Install JDK 11+ (or set APKFORGE_JAVA) before using apkforge.")]
    JavaNotFound,

    #[error("Failed to spawn {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited non-zero. `code` is -1 when killed by a signal.
    #[error("{action} failed (exit code {code}):\n{stderr}")]
    Failed { action: ToolAction, code: i32, stderr: String },

    #[error("Signed APK not found in {} after running uber-apk-signer", .0.display())]
    SignedOutputNotFound(PathBuf),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A build stage failed; later stages were not run.
#[derive(Debug, Error)]
#[error("build stopped at {stage} stage: {source}")]
pub struct PipelineError {
    pub stage: BuildStage,
    /// Intermediate files produced by earlier stages that are still on disk.
    pub leftovers: Vec<PathBuf>,
    #[source]
    pub source: ToolError,
}
