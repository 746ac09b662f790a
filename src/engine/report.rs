//! Terminal presentation of a batch: per-job status lines, summary, JSON report.

use anyhow::{Context, Result};
use colored::Colorize;
use kdam::Animation;
use log::info;
use std::fs;
use std::path::Path;

use super::progress::{
    ProgressBar, ProgressBarConfig, create_progress_bar, refresh_bar, update_progress_bar,
    write_above_bar,
};
use crate::pipeline::BatchObserver;
use crate::types::{BatchResult, ConversionJob, JobOutcome, OutputFormat};

/// Observer driving the CLI: a progress bar over finished jobs and one line per result.
pub struct TerminalObserver {
    bar: Option<ProgressBar>,
    format: OutputFormat,
    verbose: bool,
}

impl TerminalObserver {
    pub fn new(total: usize, format: OutputFormat, verbose: bool) -> Self {
        let bar = create_progress_bar(ProgressBarConfig::new(
            total,
            "Converting",
            Animation::Classic,
        ));
        refresh_bar(&bar);
        Self {
            bar: Some(bar),
            format,
            verbose,
        }
    }

    fn print(&self, line: String) {
        match &self.bar {
            Some(bar) => write_above_bar(bar, line),
            None => eprintln!("{}", line),
        }
    }
}

impl BatchObserver for TerminalObserver {
    fn on_job_started(&mut self, job: &ConversionJob) {
        if self.verbose {
            self.print(format!(
                "  {} Converting {} to {}",
                "…".dimmed(),
                job.name,
                self.format.as_str().to_uppercase()
            ));
        }
    }

    fn on_job_finished(&mut self, job: &ConversionJob, outcome: &JobOutcome) {
        let line = match outcome {
            JobOutcome::Success => format!("  {} {}", "✓".green(), job.name),
            JobOutcome::Failure { kind, message } => format!(
                "  {} {} [{}] {}",
                "✗".red(),
                job.name,
                kind.as_str().yellow(),
                message
            ),
        };
        self.print(line);
        if let Some(bar) = &self.bar {
            update_progress_bar(bar, 1);
        }
    }

    fn on_batch_complete(&mut self, result: &BatchResult) {
        self.bar = None;
        eprintln!();
        eprintln!("{}", summary_line(result));
    }
}

/// "3 converted, 1 failed" with colors.
pub fn summary_line(result: &BatchResult) -> String {
    let ok = format!("{} converted", result.succeeded()).green();
    let failed = result.failed();
    if failed == 0 {
        ok.to_string()
    } else {
        format!("{}, {}", ok, format!("{} failed", failed).red())
    }
}

/// Write the batch outcome as pretty JSON.
pub fn write_report(result: &BatchResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&result.report()).context("serialize report")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
