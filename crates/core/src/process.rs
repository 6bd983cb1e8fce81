//! Subprocess seam shared by every tool invoker.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;

use crate::config::ToolConfig;
use crate::error::{ProvisionError, ToolAction, ToolError};
use crate::runtime::find_java;
use crate::tools::{Provisioner, ToolKind};

/// Exit status and captured streams of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into `ToolError::Failed` for `action`.
    pub fn check(self, action: ToolAction) -> Result<Self, ToolError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ToolError::Failed { action, code: self.code.unwrap_or(-1), stderr: self.stderr })
        }
    }
}

/// Runs a program to completion and captures its output.
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput>;
}

/// Runs processes for real, blocking until they exit. No timeout is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Everything an invoker needs: where tools live, how to run them, which Java to use.
pub struct Toolchain {
    provisioner: Provisioner,
    runner: Box<dyn CommandRunner>,
    java: Option<PathBuf>,
}

impl Toolchain {
    pub fn new(
        provisioner: Provisioner,
        runner: Box<dyn CommandRunner>,
        java: Option<PathBuf>,
    ) -> Self {
        Self { provisioner, runner, java }
    }

    /// Toolchain for real use: HTTPS downloads and real subprocesses.
    pub fn from_config(config: &ToolConfig) -> Result<Self, ProvisionError> {
        Ok(Self::new(Provisioner::new(config)?, Box::new(SystemRunner), config.java.clone()))
    }

    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    /// Configured Java, or the first `java` on the search path.
    pub fn java(&self) -> Result<PathBuf, ToolError> {
        match &self.java {
            Some(java) => Ok(java.clone()),
            None => find_java(),
        }
    }

    /// Run `java -jar <tool jar> <args...>`.
    pub(crate) fn run_jar(
        &self,
        kind: ToolKind,
        args: Vec<OsString>,
    ) -> Result<ToolOutput, ToolError> {
        let jar = self.provisioner.resolve(kind)?;
        let java = self.java()?;
        let mut full = vec![OsString::from("-jar"), jar.into_os_string()];
        full.extend(args);
        self.run(&java, &full)
    }

    /// Run a native tool resolved through the provisioner.
    pub(crate) fn run_native(
        &self,
        kind: ToolKind,
        args: Vec<OsString>,
    ) -> Result<ToolOutput, ToolError> {
        let program = self.provisioner.resolve(kind)?;
        self.run(&program, &args)
    }

    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        info!("Running: {} {}", program.display(), render_args(args));
        self.runner
            .run(program, args)
            .map_err(|source| ToolError::Spawn { program: program.to_path_buf(), source })
    }
}

fn render_args(args: &[OsString]) -> String {
    args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_passes_zero_exit_through() {
        let out = ToolOutput { code: Some(0), stdout: "ok".into(), stderr: String::new() };
        assert_eq!(out.clone().check(ToolAction::Build).unwrap(), out);
    }

    #[test]
    fn check_embeds_code_and_stderr() {
        let out = ToolOutput { code: Some(2), stdout: String::new(), stderr: "boom".into() };
        let err = out.check(ToolAction::Decode).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("decode failed"), "{msg}");
        assert!(msg.contains("exit code 2"), "{msg}");
        assert!(msg.contains("boom"), "{msg}");
    }

    #[test]
    fn signal_termination_is_reported_as_minus_one() {
        let out = ToolOutput { code: None, stdout: String::new(), stderr: String::new() };
        match out.check(ToolAction::Align).unwrap_err() {
            ToolError::Failed { code, action, .. } => {
                assert_eq!(code, -1);
                assert_eq!(action, ToolAction::Align);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
