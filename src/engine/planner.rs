//! Output planning: job + snapshot -> converter invocation and the filesystem work it needs first.
//!
//! [`plan_job`] is pure. [`apply_side_effects`] is the only place that touches the disk, and it
//! refuses to reuse an existing DNG directory.

use log::{debug, info};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ConfigSnapshot, ConversionJob, OutputFormat};
use crate::utils::config::SOURCE_EXTENSION_MARKER;

/// A fully-formed converter command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Arguments as lossy UTF-8, for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Filesystem work that must succeed before the converter is spawned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SideEffect {
    /// Create this directory; fail if it already exists.
    CreateFreshDir(PathBuf),
}

/// Planned conversion of one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub invocation: Invocation,
    pub side_effects: Vec<SideEffect>,
}

/// Output name for a display name: one trailing `.MLV` removed.
pub fn output_name(display_name: &str) -> &str {
    display_name
        .strip_suffix(SOURCE_EXTENSION_MARKER)
        .unwrap_or(display_name)
}

/// Per-job output stem `<output_dir>/<name>`: the RAW file or the DNG directory.
pub fn output_target(job: &ConversionJob, snapshot: &ConfigSnapshot) -> ConvertResult<PathBuf> {
    let name = output_name(&job.name);
    if name.is_empty() || Path::new(name).file_name().is_none_or(|n| n != name) {
        return Err(ConvertError::invalid(format!(
            "cannot derive an output name from '{}'",
            job.name
        )));
    }
    Ok(snapshot.output_dir().join(name))
}

/// Build the converter invocation for `job`. Does not touch the filesystem.
pub fn plan_job(
    job: &ConversionJob,
    snapshot: &ConfigSnapshot,
    converter: &Path,
) -> ConvertResult<Plan> {
    let name = output_name(&job.name);
    let target = output_target(job, snapshot)?;
    let mut args: Vec<OsString> = Vec::with_capacity(6);
    let mut side_effects = Vec::new();

    match snapshot.format() {
        OutputFormat::Raw => {
            args.push("-o".into());
            args.push(target.into_os_string());
            args.push("-r".into());
        }
        OutputFormat::Dng => {
            args.push("-o".into());
            args.push(target.join(name).into_os_string());
            args.push("--dng".into());
            if let Some(flag) = snapshot.smoothing().flag() {
                args.push(flag.into());
            }
            side_effects.push(SideEffect::CreateFreshDir(target));
        }
    }

    // input file is always the last arg
    args.push(job.source.clone().into_os_string());

    Ok(Plan {
        invocation: Invocation {
            program: converter.to_path_buf(),
            args,
        },
        side_effects,
    })
}

/// Perform the plan's filesystem work. A DNG directory that already exists is an
/// [`ConvertError::OutputCollision`]; missing parents are created.
pub fn apply_side_effects(plan: &Plan) -> ConvertResult<()> {
    for effect in &plan.side_effects {
        match effect {
            SideEffect::CreateFreshDir(dir) => create_fresh_dir(dir)?,
        }
    }
    Ok(())
}

fn create_fresh_dir(dir: &Path) -> ConvertResult<()> {
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent).map_err(|source| ConvertError::OutputUnavailable {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    match fs::create_dir(dir) {
        Ok(()) => {
            info!("Made directory: {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Refusing to reuse {}", dir.display());
            Err(ConvertError::OutputCollision {
                path: dir.to_path_buf(),
            })
        }
        Err(source) => Err(ConvertError::OutputUnavailable {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
