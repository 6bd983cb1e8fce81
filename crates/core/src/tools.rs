//! Tool provisioning.
//!
//! Maps each external tool to a file in the cache directory, downloading it on
//! first use. A cached artifact is trusted as-is on later calls; integrity is
//! only checked at download time, and only when a SHA-256 pin is configured.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::config::{SourceOverride, ToolConfig};
use crate::error::ProvisionError;
use crate::platform::Platform;

const APKTOOL_URL: &str =
    "https://github.com/iBotPeaches/Apktool/releases/download/v2.9.3/apktool_2.9.3.jar";
const SIGNER_URL: &str =
    "https://github.com/nicedayzhu/uber-apk-signer/releases/download/v1.3.0/uber-apk-signer-1.3.0.jar";
const BUILD_TOOLS_BASE: &str =
    "https://github.com/nicedayzhu/build-tools/releases/download/34.0.0";

/// Archive entry base names accepted as the zipalign executable.
const ZIPALIGN_ENTRY_NAMES: [&str; 2] = ["zipalign", "zipalign.exe"];

/// The three external tools apkforge drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// apktool jar (decode/build).
    Apktool,
    /// uber-apk-signer jar (debug signing).
    Signer,
    /// zipalign native executable.
    Zipalign,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Apktool, ToolKind::Signer, ToolKind::Zipalign];

    pub fn name(self) -> &'static str {
        match self {
            Self::Apktool => "apktool",
            Self::Signer => "uber-apk-signer",
            Self::Zipalign => "zipalign",
        }
    }

    /// Prefix of the environment variables overriding this tool's source.
    pub(crate) fn env_prefix(self) -> &'static str {
        match self {
            Self::Apktool => "APKFORGE_APKTOOL",
            Self::Signer => "APKFORGE_SIGNER",
            Self::Zipalign => "APKFORGE_ZIPALIGN",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a tool artifact is downloaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSource {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

fn zipalign_url(platform: Platform) -> String {
    format!("{BUILD_TOOLS_BASE}/build-tools-34.0.0-{platform}.zip")
}

/// Logical layout of the tool cache directory.
///
/// This is pure path computation; it does not touch the filesystem.
#[derive(Debug, Clone)]
pub struct ToolCache {
    pub root: PathBuf,
    pub apktool_jar: PathBuf,
    pub signer_jar: PathBuf,
    /// zipalign executable (`zipalign.exe` on Windows).
    pub zipalign: PathBuf,
    /// Transient download location of the build-tools archive.
    pub zipalign_archive: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl AsRef<Path>, os: &str) -> Self {
        let root = root.as_ref().to_path_buf();
        let zipalign_name = Platform::parse(os).map(Platform::zipalign_name).unwrap_or("zipalign");
        Self {
            apktool_jar: root.join("apktool.jar"),
            signer_jar: root.join("uber-apk-signer.jar"),
            zipalign: root.join(zipalign_name),
            zipalign_archive: root.join("build-tools.zip"),
            root,
        }
    }

    pub fn artifact_path(&self, kind: ToolKind) -> &Path {
        match kind {
            ToolKind::Apktool => &self.apktool_jar,
            ToolKind::Signer => &self.signer_jar,
            ToolKind::Zipalign => &self.zipalign,
        }
    }
}

/// Transport used to download tool artifacts.
pub trait Fetcher {
    /// Stream the resource at `url` into `sink`, returning the byte count.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, ProvisionError>;
}

/// HTTPS fetcher backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ProvisionError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("apkforge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(None::<Duration>)
            .build()
            .map_err(io::Error::other)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, ProvisionError> {
        let download_err = |source: Box<dyn std::error::Error + Send + Sync>| {
            ProvisionError::Download { url: url.to_string(), source }
        };
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_err(Box::new(e)))?;
        io::copy(&mut response, sink).map_err(|e| download_err(Box::new(e)))
    }
}

/// Presence report for one cached tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub tool: ToolKind,
    pub path: PathBuf,
    pub present: bool,
    /// Download source, or `None` when no artifact exists for this platform.
    pub source: Option<ToolSource>,
}

/// Resolves tools to local paths, downloading them into the cache on demand.
pub struct Provisioner {
    cache: ToolCache,
    os: String,
    overrides: HashMap<ToolKind, SourceOverride>,
    fetcher: Box<dyn Fetcher>,
}

impl Provisioner {
    /// Provisioner for the host platform that downloads over HTTPS.
    pub fn new(config: &ToolConfig) -> Result<Self, ProvisionError> {
        Ok(Self::with_fetcher(config, Box::new(HttpFetcher::new()?)))
    }

    pub fn with_fetcher(config: &ToolConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let os = Platform::host_os().to_string();
        Self {
            cache: ToolCache::new(&config.tools_dir, &os),
            os,
            overrides: config.overrides.clone(),
            fetcher,
        }
    }

    /// Pretend to run on another OS. Changes artifact names and download URLs.
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self.cache = ToolCache::new(&self.cache.root, &self.os);
        self
    }

    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    /// Download source for `kind`, honoring configured overrides.
    pub fn source(&self, kind: ToolKind) -> Result<ToolSource, ProvisionError> {
        let overridden = self.overrides.get(&kind);
        let url = match overridden.and_then(|o| o.url.clone()) {
            Some(url) => url,
            None => match kind {
                ToolKind::Apktool => APKTOOL_URL.to_string(),
                ToolKind::Signer => SIGNER_URL.to_string(),
                ToolKind::Zipalign => Platform::parse(&self.os)
                    .map(zipalign_url)
                    .ok_or_else(|| ProvisionError::UnsupportedPlatform {
                        tool: kind.name(),
                        os: self.os.clone(),
                    })?,
            },
        };
        Ok(ToolSource { url, sha256: overridden.and_then(|o| o.sha256.clone()) })
    }

    /// Local path of `kind`, downloading it first if the cache lacks it.
    pub fn resolve(&self, kind: ToolKind) -> Result<PathBuf, ProvisionError> {
        let target = self.cache.artifact_path(kind).to_path_buf();
        if target.is_file() {
            debug!("{kind} cached at {}", target.display());
            return Ok(target);
        }

        let source = self.source(kind)?;
        fs::create_dir_all(&self.cache.root)?;

        match kind {
            ToolKind::Apktool | ToolKind::Signer => self.download(kind, &source, &target)?,
            ToolKind::Zipalign => {
                let archive = &self.cache.zipalign_archive;
                self.download(kind, &source, archive)?;
                let extracted = extract_entry(archive, &ZIPALIGN_ENTRY_NAMES, &target);
                if let Err(e) = fs::remove_file(archive) {
                    warn!("Failed to remove {}: {e}", archive.display());
                }
                extracted?;
                make_executable(&target)?;
            }
        }

        info!("{kind} ready at {}", target.display());
        Ok(target)
    }

    /// Cache status of every tool. Never downloads.
    pub fn status(&self) -> Vec<ToolStatus> {
        ToolKind::ALL
            .iter()
            .map(|&kind| {
                let path = self.cache.artifact_path(kind).to_path_buf();
                let present = path.is_file();
                ToolStatus { tool: kind, path, present, source: self.source(kind).ok() }
            })
            .collect()
    }

    fn download(
        &self,
        kind: ToolKind,
        source: &ToolSource,
        dest: &Path,
    ) -> Result<(), ProvisionError> {
        info!("Downloading {kind} from {} -> {}", source.url, dest.display());
        let mut tmp = NamedTempFile::new_in(&self.cache.root)?;
        let bytes = {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            let bytes = self.fetcher.fetch(&source.url, &mut writer)?;
            writer.flush()?;
            bytes
        };

        let actual = sha256_file(tmp.path())?;
        info!("Downloaded {kind}: {bytes} bytes, sha256 {actual}");
        if let Some(expected) = &source.sha256 {
            if !expected.eq_ignore_ascii_case(&actual) {
                return Err(ProvisionError::DigestMismatch {
                    tool: kind.name(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        tmp.persist(dest).map_err(|e| ProvisionError::Io(e.error))?;
        Ok(())
    }
}

/// Extract the first file whose base name is in `names` from a zip archive to `dest`.
fn extract_entry(archive_path: &Path, names: &[&str], dest: &Path) -> Result<(), ProvisionError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let base = entry.name().rsplit(|c| c == '/' || c == '\\').next().unwrap_or("").to_string();
        if !names.contains(&base.as_str()) {
            continue;
        }

        debug!("Extracting {} from {}", entry.name(), archive_path.display());
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        io::copy(&mut entry, tmp.as_file_mut())?;
        tmp.persist(dest).map_err(|e| ProvisionError::Io(e.error))?;
        return Ok(());
    }

    Err(ProvisionError::EntryNotFound {
        entry: names.join(" / "),
        archive: archive_path.to_path_buf(),
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Compute the SHA-256 hash of a file and return it as a lowercase hex string.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
