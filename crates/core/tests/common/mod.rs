#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use apkforge_core::tools::Fetcher;
use apkforge_core::{CommandRunner, ProvisionError, Provisioner, ToolConfig, ToolOutput, Toolchain};
use tempfile::TempDir;

/// Fetcher that serves fixed bytes and counts calls.
pub struct FakeFetcher {
    pub body: Vec<u8>,
    pub calls: Arc<AtomicUsize>,
    pub urls: Arc<std::sync::Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into(), calls: Arc::default(), urls: Arc::default() }
    }

    pub fn count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        sink.write_all(&self.body)?;
        Ok(self.body.len() as u64)
    }
}

/// Fetcher that always fails like a dropped connection.
pub struct FailingFetcher;

impl Fetcher for FailingFetcher {
    fn fetch(&self, url: &str, _sink: &mut dyn Write) -> Result<u64, ProvisionError> {
        Err(ProvisionError::Download {
            url: url.to_string(),
            source: Box::new(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
        })
    }
}

/// Build a zip archive in memory with the given (name, contents) entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::<()>::default();
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// One recorded subprocess invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Call {
    /// Short label: `apktool d`, `apktool b`, `zipalign`, `signer`.
    pub fn step(&self) -> String {
        if self.args.first().map(String::as_str) == Some("-jar") {
            let jar = &self.args[1];
            if jar.ends_with("apktool.jar") {
                format!("apktool {}", self.args[2])
            } else {
                "signer".to_string()
            }
        } else {
            "zipalign".to_string()
        }
    }
}

/// Runner that imitates apktool, zipalign and uber-apk-signer on the filesystem.
///
/// Steps listed in `failing` exit with code 1 and write nothing.
pub struct FakeTools {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub failing: HashSet<String>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self { calls: Rc::default(), failing: HashSet::new() }
    }

    pub fn failing(mut self, step: &str) -> Self {
        self.failing.insert(step.to_string());
        self
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput> {
        let call = Call {
            program: program.to_path_buf(),
            args: args.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
        };
        let step = call.step();
        self.calls.borrow_mut().push(call.clone());

        if self.failing.contains(&step) {
            return Ok(ToolOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("{step}: simulated failure"),
            });
        }

        let a = &call.args;
        match step.as_str() {
            "apktool d" => fs::create_dir_all(&a[5])?,
            "apktool b" => fs::write(&a[5], b"unsigned")?,
            "zipalign" => {
                fs::copy(&a[3], &a[4])?;
            }
            "signer" => {
                let input = Path::new(&a[3]);
                let stem = input.file_stem().unwrap().to_string_lossy();
                let out_dir = Path::new(&a[5]);
                fs::write(out_dir.join(format!("{stem}-aligned-debugSigned.apk")), b"signed")?;
                fs::write(out_dir.join(format!("{stem}-aligned-debugSigned.apk.idsig")), b"")?;
            }
            _ => {}
        }
        Ok(ToolOutput { code: Some(0), stdout: String::new(), stderr: String::new() })
    }
}

/// A toolchain over a temp cache whose three tools are already present.
pub struct Harness {
    pub dir: TempDir,
    pub toolchain: Toolchain,
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub downloads: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(tools: FakeTools) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolConfig::new(dir.path().join("tools")).with_java("/opt/jdk/bin/java");
        let fetcher = FakeFetcher::new(Vec::new());
        let downloads = fetcher.count();
        let provisioner = Provisioner::with_fetcher(&config, Box::new(fetcher));

        let cache = provisioner.cache().clone();
        fs::create_dir_all(&cache.root).unwrap();
        for path in [&cache.apktool_jar, &cache.signer_jar, &cache.zipalign] {
            fs::write(path, b"tool").unwrap();
        }

        let calls = Rc::clone(&tools.calls);
        let toolchain = Toolchain::new(provisioner, Box::new(tools), config.java.clone());
        Self { dir, toolchain, calls, downloads }
    }

    pub fn work(&self) -> PathBuf {
        let work = self.dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        work
    }

    pub fn steps(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::step).collect()
    }
}
