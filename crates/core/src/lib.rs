//! apkforge-core
//!
//! Core library for decoding, rebuilding, aligning and debug-signing Android
//! packages by driving three external tools: apktool, zipalign and
//! uber-apk-signer.
//!
//! The library owns tool provisioning (download on first use into a cache
//! directory), the subprocess seam, one invoker per tool, and the build
//! pipeline that chains them. The CLI crate is a thin frontend over it.

pub mod apktool;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod runtime;
pub mod signer;
pub mod tools;
pub mod zipalign;

pub use config::ToolConfig;
pub use error::{PipelineError, ProvisionError, ToolError};
pub use process::{CommandRunner, SystemRunner, ToolOutput, Toolchain};
pub use tools::{Provisioner, ToolKind};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
