//! Locating the bundled `mlv_dump` binary and reading its version banner.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::utils::config::{CONVERTER_BIN_DIR, CONVERTER_ENV_KEY};

/// Platform-specific converter file name.
pub fn converter_file_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "mlv_dump.exe"
    } else if cfg!(target_os = "macos") {
        "mlv_dump.osx"
    } else {
        "mlv_dump.linux"
    }
}

/// `<root>/bin/<platform binary>`.
pub fn bundled_converter_path(root: &Path) -> PathBuf {
    root.join(CONVERTER_BIN_DIR).join(converter_file_name())
}

/// Resolve the converter: explicit path → `MLVBATCH_CONVERTER` → `bin/` next to this executable.
pub fn resolve_converter(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Ok(s) = std::env::var(CONVERTER_ENV_KEY) {
        let s = s.trim();
        if !s.is_empty() {
            debug!("Converter from {}", CONVERTER_ENV_KEY);
            return Ok(PathBuf::from(s));
        }
    }
    let exe = std::env::current_exe().context("locate current executable")?;
    let root = exe.parent().unwrap_or(Path::new("."));
    Ok(bundled_converter_path(root))
}

/// Parsed `mlv_dump --version` banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterVersion {
    pub title: String,
    pub last_update: Option<String>,
    pub build_date: Option<String>,
}

impl ConverterVersion {
    /// Banner layout is title, blank-ish separator, last update, separator, build date. Lines
    /// are trimmed and empty lines dropped before matching that layout.
    pub fn parse(output: &str) -> Option<Self> {
        let lines: Vec<&str> = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let title = lines.first()?.to_string();
        if lines.len() >= 5 {
            return Some(Self {
                title,
                last_update: Some(lines[2].to_string()),
                build_date: Some(lines[4].to_string()),
            });
        }
        Some(Self {
            title,
            last_update: lines.get(1).map(|s| s.to_string()),
            build_date: lines.get(2).map(|s| s.to_string()),
        })
    }
}

/// Run `<converter> --version` and parse its stdout.
pub fn converter_version(converter: &Path) -> Result<ConverterVersion> {
    let output = Command::new(converter)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .with_context(|| format!("run {} --version", converter.display()))?;
    let text = String::from_utf8_lossy(&output.stdout).replace('\r', "");
    match ConverterVersion::parse(&text) {
        Some(v) => Ok(v),
        None => bail!("{} printed no version info", converter.display()),
    }
}
