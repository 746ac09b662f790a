//! Progress bar utilities for displaying batch status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " clips"
    )))
}

/// Advance the bar by `n` finished clips.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.update(n);
    }
}

/// Print a line above the bar without tearing it.
pub fn write_above_bar(pb: &ProgressBar, line: String) {
    match pb.lock() {
        Ok(mut bar) => {
            let _ = bar.write(line);
        }
        Err(_) => eprintln!("{}", line),
    }
}

/// Force a refresh of the bar (e.g. so "0/N" shows before the first job finishes).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}
