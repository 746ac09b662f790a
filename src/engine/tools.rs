//! Input collection and path utilities

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::types::ConversionJob;
use crate::utils::config::ACCEPTED_EXTENSIONS;

/// True if the file extension is one we import (`MLV` / `mlv`).
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e))
}

/// Absolute form of `path` without resolving symlinks.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("make path absolute: {}", path.display()))
}

/// Accepted files directly or recursively under `dir`, sorted.
fn walk_for_sources(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|r| match r {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_accepted_extension(e.path()))
        .map(|e| e.into_path())
        .collect();
    found.sort();
    found
}

fn expand_input(input: &Path) -> Result<Vec<PathBuf>> {
    let abs = absolutize(input)?;
    if abs.is_dir() {
        let found = walk_for_sources(&abs);
        debug!("{}: {} source files", abs.display(), found.len());
        return Ok(found);
    }
    if !abs.is_file() {
        bail!("input not found: {}", input.display());
    }
    if !has_accepted_extension(&abs) {
        warn!("{} does not look like an MLV file", abs.display());
    }
    Ok(vec![abs])
}

/// Turn CLI inputs (files or directories) into jobs, in input order, without duplicates.
pub fn collect_jobs(inputs: &[PathBuf]) -> Result<Vec<ConversionJob>> {
    let expanded: Vec<Vec<PathBuf>> = inputs
        .par_iter()
        .map(|p| expand_input(p))
        .collect::<Result<_>>()?;

    let mut seen = HashSet::new();
    let jobs: Vec<ConversionJob> = expanded
        .into_iter()
        .flatten()
        .filter(|p| seen.insert(p.clone()))
        .filter_map(|p| {
            let job = ConversionJob::from_path(&p);
            if job.is_none() {
                warn!("skipping {}: file name is not valid UTF-8", p.display());
            }
            job
        })
        .collect();
    Ok(jobs)
}

/// Parent directory of the last job, used to remember where files were imported from.
pub fn last_import_directory(jobs: &[ConversionJob]) -> Option<PathBuf> {
    jobs.last()
        .and_then(|j| j.source.parent())
        .map(Path::to_path_buf)
}
