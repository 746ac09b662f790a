//! Engine: planning, process execution, converter discovery, CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod converter;
pub mod planner;
pub mod progress;
pub mod report;
pub mod runner;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, ConfigAction, ConvertArgs};
pub use cli::handle_run;
pub use converter::{ConverterVersion, converter_version, resolve_converter};
pub use planner::{
    Invocation, Plan, SideEffect, apply_side_effects, output_name, output_target, plan_job,
};
pub use runner::{HiddenConsole, JobRunner, LaunchStrategy, PlainLaunch, ProcessRunner};
pub use tools::{collect_jobs, has_accepted_extension, last_import_directory};
