//! Durable user settings: a flat TOML key/value document at a fixed per-user path.
//!
//! Reads never fail: a key that is absent (or a store that was never loaded) yields the key's
//! fallback. Only the CLI thread mutates the store; batches see it through [`SettingsStore::snapshot`].

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConvertResult;
use crate::types::{ChromaSmoothing, ConfigSnapshot, OutputFormat};
use crate::utils::config::PackagePaths;

/// Known setting keys. The string forms are the on-disk keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    Theme,
    OutputDirectory,
    ImportDirectory,
    OutputType,
    ChromaSmoothing,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Theme,
        SettingKey::OutputDirectory,
        SettingKey::ImportDirectory,
        SettingKey::OutputType,
        SettingKey::ChromaSmoothing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Theme => "theme",
            SettingKey::OutputDirectory => "output_directory",
            SettingKey::ImportDirectory => "import_directory",
            SettingKey::OutputType => "output_type",
            SettingKey::ChromaSmoothing => "chroma_smoothing",
        }
    }

    /// Value returned when the key is absent.
    pub fn fallback(&self) -> &'static str {
        match self {
            SettingKey::OutputType => OutputFormat::Dng.as_str(),
            _ => "",
        }
    }
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .with_context(|| {
                let keys: Vec<&str> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown setting '{}' (expected one of: {})", s, keys.join(", "))
            })
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value settings bound to a file path.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<SettingKey, String>,
}

impl SettingsStore {
    /// Store bound to `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
        }
    }

    /// Store bound to `~/.mlv_dump/<pkg>.toml`.
    pub fn at_default_location() -> Result<Self> {
        let path = PackagePaths::get()
            .settings_path()
            .context("cannot determine home directory for settings")?;
        Ok(Self::new(path))
    }

    /// Open the store at `path` and load it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load from disk, replacing in-memory values. A missing file resets to defaults.
    pub fn load(&mut self) -> Result<()> {
        self.values.clear();
        if !self.path.exists() {
            debug!("No settings at {}, using defaults", self.path.display());
            for key in SettingKey::ALL {
                self.values.insert(key, key.fallback().to_string());
            }
            return Ok(());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("read settings {}", self.path.display()))?;
        let table: toml::Table = toml::from_str(&content)
            .with_context(|| format!("parse settings {}", self.path.display()))?;
        for (name, value) in table {
            let Ok(key) = name.parse::<SettingKey>() else {
                warn!("{}: ignoring unknown setting '{}'", self.path.display(), name);
                continue;
            };
            match value {
                toml::Value::String(s) => {
                    self.values.insert(key, s);
                }
                other => warn!(
                    "{}: setting '{}' is not a string ({}), ignoring",
                    self.path.display(),
                    name,
                    other.type_str()
                ),
            }
        }
        Ok(())
    }

    /// Write every key atomically (temp file + rename), creating the parent directory.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create settings dir {}", parent.display()))?;
        }
        let table: toml::Table = SettingKey::ALL
            .into_iter()
            .map(|k| (k.as_str().to_string(), toml::Value::String(self.get(k))))
            .collect();
        let content = toml::to_string(&table).context("serialize settings")?;

        let temp = self.path.with_extension("toml.tmp");
        fs::write(&temp, content)
            .with_context(|| format!("write settings {}", temp.display()))?;
        fs::rename(&temp, &self.path).with_context(|| {
            format!(
                "atomic rename settings ({} -> {})",
                temp.display(),
                self.path.display()
            )
        })?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    pub fn get(&self, key: SettingKey) -> String {
        self.values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.fallback().to_string())
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn theme(&self) -> String {
        self.get(SettingKey::Theme)
    }

    pub fn set_theme(&mut self, value: impl Into<String>) {
        self.set(SettingKey::Theme, value);
    }

    pub fn output_directory(&self) -> String {
        self.get(SettingKey::OutputDirectory)
    }

    pub fn set_output_directory(&mut self, dir: &Path) {
        self.set(SettingKey::OutputDirectory, dir.to_string_lossy());
    }

    pub fn import_directory(&self) -> String {
        self.get(SettingKey::ImportDirectory)
    }

    pub fn set_import_directory(&mut self, dir: &Path) {
        self.set(SettingKey::ImportDirectory, dir.to_string_lossy());
    }

    pub fn output_type(&self) -> String {
        self.get(SettingKey::OutputType)
    }

    pub fn set_output_type(&mut self, format: OutputFormat) {
        self.set(SettingKey::OutputType, format.as_str());
    }

    pub fn chroma_smoothing(&self) -> String {
        self.get(SettingKey::ChromaSmoothing)
    }

    pub fn set_chroma_smoothing(&mut self, level: ChromaSmoothing) {
        self.set(SettingKey::ChromaSmoothing, level.as_str());
    }

    /// Set a key from user input, validating values for typed keys.
    pub fn set_checked(&mut self, key: SettingKey, value: &str) -> Result<()> {
        match key {
            SettingKey::OutputType => self.set_output_type(value.parse()?),
            SettingKey::ChromaSmoothing => self.set_chroma_smoothing(value.parse()?),
            SettingKey::OutputDirectory | SettingKey::ImportDirectory => {
                let path = Path::new(value);
                if !value.is_empty() && !path.is_absolute() {
                    bail!("{} must be an absolute path: {}", key, value);
                }
                self.set(key, value);
            }
            SettingKey::Theme => self.set(key, value),
        }
        Ok(())
    }

    /// Immutable copy of the conversion settings, validated.
    pub fn snapshot(&self) -> ConvertResult<ConfigSnapshot> {
        ConfigSnapshot::parse(
            &self.output_type(),
            &self.output_directory(),
            &self.chroma_smoothing(),
        )
    }
}

impl fmt::Display for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings: Vec<String> = SettingKey::ALL
            .iter()
            .map(|k| {
                let v = self.get(*k);
                if v.is_empty() {
                    format!("{}=None", k)
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect();
        write!(f, "Settings({})", settings.join(", "))
    }
}
