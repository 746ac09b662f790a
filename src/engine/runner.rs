//! Process execution: one converter process per job, stdio discarded, exit status mapped to
//! [`ConvertError`]. Platform launch tweaks are injected through [`LaunchStrategy`].

use log::debug;
use std::process::{Command, ExitStatus, Stdio};

use super::planner::Invocation;
use crate::error::{ConvertError, ConvertResult};

/// Executes a planned invocation to completion. Blocks the calling thread.
pub trait JobRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> ConvertResult<()>;
}

/// Adjusts a [`Command`] before spawn (e.g. console suppression on Windows).
pub trait LaunchStrategy: Send + Sync {
    fn configure(&self, cmd: &mut Command);
}

/// Launch the command as built.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainLaunch;

impl LaunchStrategy for PlainLaunch {
    fn configure(&self, _cmd: &mut Command) {}
}

/// Do not open a console window for the child (Windows only; no-op elsewhere).
#[derive(Clone, Copy, Debug, Default)]
pub struct HiddenConsole;

impl LaunchStrategy for HiddenConsole {
    #[cfg(windows)]
    fn configure(&self, cmd: &mut Command) {
        use std::os::windows::process::CommandExt;
        // CREATE_NO_WINDOW
        cmd.creation_flags(0x08000000);
    }

    #[cfg(not(windows))]
    fn configure(&self, _cmd: &mut Command) {}
}

/// Launch strategy appropriate for the current platform.
pub fn platform_launch() -> Box<dyn LaunchStrategy> {
    if cfg!(windows) {
        Box::new(HiddenConsole)
    } else {
        Box::new(PlainLaunch)
    }
}

/// Runs invocations as real child processes.
pub struct ProcessRunner {
    launch: Box<dyn LaunchStrategy>,
}

impl ProcessRunner {
    pub fn new(launch: Box<dyn LaunchStrategy>) -> Self {
        Self { launch }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(platform_launch())
    }
}

impl JobRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> ConvertResult<()> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        self.launch.configure(&mut cmd);

        debug!(
            "Executing command: {} {}",
            invocation.program.display(),
            invocation.args_lossy().join(" ")
        );
        let status = cmd
            .status()
            .map_err(|source| ConvertError::ProcessSpawnFailed {
                program: invocation.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::ProcessExitedNonZero {
                status: describe_status(status),
            })
        }
    }
}

/// "code 3", or "signal 9" for unix children killed by a signal.
fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return format!("signal {sig}");
        }
    }
    "unknown status".to_string()
}
