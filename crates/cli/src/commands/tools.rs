use std::path::PathBuf;

use anyhow::{Context, Result};
use apkforge_core::tools::ToolStatus;
use apkforge_core::{Provisioner, ToolKind};
use serde::Serialize;

use crate::commands::load_tool_config;

#[derive(Debug, Serialize)]
pub struct ToolsReport {
    pub tools_dir: PathBuf,
    pub tools: Vec<ToolStatus>,
}

/// Show the tool cache, optionally downloading whatever is missing first.
pub fn tools_command(fetch: bool, json: bool) -> Result<ToolsReport> {
    let config = load_tool_config()?;
    let provisioner = Provisioner::new(&config).context("Failed to initialize downloader")?;

    if fetch {
        for kind in ToolKind::ALL {
            provisioner.resolve(kind).with_context(|| format!("Failed to provision {kind}"))?;
        }
    }

    let report = ToolsReport { tools_dir: config.tools_dir.clone(), tools: provisioner.status() };

    if json {
        let serialized = serde_json::to_string_pretty(&report)
            .context("Failed to serialize tool status to JSON")?;
        println!("{}", serialized);
    } else {
        println!("Tools dir: {}", report.tools_dir.display());
        for status in &report.tools {
            let source =
                status.source.as_ref().map(|s| s.url.as_str()).unwrap_or("(unsupported platform)");
            println!(
                "  - {} [{}] {} <- {}",
                status.tool,
                if status.present { "OK" } else { "MISSING" },
                status.path.display(),
                source
            );
        }
    }

    Ok(report)
}
