use std::fmt;

/// Host platform families that ship a prebuilt zipalign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Map an OS identifier (as in `std::env::consts::OS`) to a platform family.
    ///
    /// Returns `None` for anything outside the three supported families.
    pub fn parse(os: &str) -> Option<Self> {
        match os.to_ascii_lowercase().as_str() {
            "windows" | "win32" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" | "darwin" => Some(Self::MacOs),
            _ => None,
        }
    }

    /// Identifier of the platform this binary was compiled for.
    pub fn host_os() -> &'static str {
        std::env::consts::OS
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }

    /// File name zipalign carries on this platform.
    pub fn zipalign_name(self) -> &'static str {
        match self {
            Self::Windows => "zipalign.exe",
            Self::Linux | Self::MacOs => "zipalign",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
