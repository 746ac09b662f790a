//! Application configuration constants.
//! Paths, naming and worker tuning in one place.

use std::path::PathBuf;
use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    settings_filename: String,
    log_filename: String,
    report_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Per-user directory (under home) holding settings and logs. Shared with the mlv_dump UI.
    pub const USER_DIR_NAME: &'static str = ".mlv_dump";

    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                settings_filename: format!("{pkg}.toml"),
                log_filename: format!("{pkg}.log"),
                report_filename: format!("{pkg}.report.json"),
            }
        })
    }

    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    pub fn log_filename(&self) -> &str {
        &self.log_filename
    }

    pub fn report_filename(&self) -> &str {
        &self.report_filename
    }

    /// `~/.mlv_dump`, or `None` when the home directory cannot be determined.
    pub fn user_dir(&self) -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(Self::USER_DIR_NAME))
    }

    /// Fixed per-user settings location.
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.user_dir().map(|d| d.join(self.settings_filename()))
    }

    /// Default log file location; records never go to the terminal unless this is unavailable.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.user_dir().map(|d| d.join(self.log_filename()))
    }
}

// ---- Source files ----

/// Literal extension marker stripped from display names when deriving output names (case-sensitive).
pub const SOURCE_EXTENSION_MARKER: &str = ".MLV";

/// Extensions accepted when importing files or walking directories.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["MLV", "mlv"];

// ---- Converter ----

/// Env var overriding the converter path.
pub const CONVERTER_ENV_KEY: &str = "MLVBATCH_CONVERTER";

/// Directory (next to the executable) holding the bundled converter binaries.
pub const CONVERTER_BIN_DIR: &str = "bin";

// ---- Worker threads ----

/// Concurrency limits for the conversion pool.
/// Use [`WorkerLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerLimits {
    /// Available threads (from rayon); set by [`WorkerLimits::current()`].
    pub all_threads: usize,
    /// Minimum worker count.
    pub floor: usize,
    /// Hard cap on converters running at once, regardless of core count.
    pub max: usize,
}

impl Default for WorkerLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_WORKERS,
            max: Self::MAX_WORKERS,
        }
    }
}

impl WorkerLimits {
    pub const FLOOR_WORKERS: usize = 1;
    pub const MAX_WORKERS: usize = 32;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Default worker count: available threads clamped to `[floor, max]`.
    pub fn default_workers(&self) -> usize {
        self.all_threads.clamp(self.floor, self.max)
    }
}
