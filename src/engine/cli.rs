//! CLI command handlers: convert, config, version.

use anyhow::Result;
use colored::Colorize;
use log::{debug, info};

use crate::engine::arg_parser::{Cli, Commands, ConfigAction, ConvertArgs};
use crate::engine::converter::{converter_version, resolve_converter};
use crate::engine::report::{TerminalObserver, write_report};
use crate::engine::tools::{absolutize, collect_jobs, last_import_directory};
use crate::pipeline::BatchOptions;
use crate::settings::{SettingKey, SettingsStore};
use crate::utils::config::{PackagePaths, WorkerLimits};
use crate::utils::{cap_jobs_by_fd_limit, setup_logging};
use crate::{ConfigSnapshot, Opts, convert_batch};

/// A bare `--report` lands in the output directory.
fn setup_opts(cli: &Cli, args: &ConvertArgs, snapshot: &ConfigSnapshot) -> Opts {
    Opts {
        converter: args.converter.clone(),
        concurrency: args.jobs,
        report: args.report.as_ref().map(|path| match path {
            Some(path) => path.clone(),
            None => snapshot
                .output_dir()
                .join(PackagePaths::get().report_filename()),
        }),
        save_settings: !args.no_save,
        verbose: cli.verbose,
    }
}

fn load_settings(cli: &Cli) -> Result<SettingsStore> {
    let mut store = match &cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::at_default_location()?,
    };
    store.load()?;
    Ok(store)
}

/// Worker count when none is requested: available threads, capped by the FD limit.
pub fn default_concurrency() -> usize {
    cap_jobs_by_fd_limit(WorkerLimits::current().default_workers())
}

/// Apply command-line overrides to the store. Values are validated here so a bad flag fails
/// before anything is queued.
fn apply_overrides(store: &mut SettingsStore, args: &ConvertArgs) -> Result<()> {
    if let Some(dir) = &args.output_dir {
        store.set_output_directory(&absolutize(dir)?);
    }
    if let Some(format) = &args.format {
        store.set_output_type(format.parse()?);
    }
    if let Some(level) = &args.chroma_smoothing {
        store.set_chroma_smoothing(level.parse()?);
    }
    Ok(())
}

/// Convert every input. Returns true when all jobs succeeded.
fn handle_convert(cli: &Cli, args: &ConvertArgs) -> Result<bool> {
    let mut store = load_settings(cli)?;
    apply_overrides(&mut store, args)?;

    let jobs = collect_jobs(&args.inputs)?;
    if let Some(dir) = last_import_directory(&jobs) {
        store.set_import_directory(&dir);
    }
    debug!("{}", store);

    let snapshot = store.snapshot()?;
    let opts = setup_opts(cli, args, &snapshot);
    if opts.save_settings {
        info!("Saving settings");
        store.save()?;
    }

    let converter = resolve_converter(opts.converter.as_deref())?;
    let concurrency = opts.concurrency.unwrap_or_else(default_concurrency);
    info!("Utilizing executable: {}", converter.display());
    debug!(
        "{} jobs, up to {} at once, output {}",
        jobs.len(),
        concurrency,
        snapshot.output_dir().display()
    );

    let mut observer = TerminalObserver::new(jobs.len(), snapshot.format(), opts.verbose);
    let result = convert_batch(
        jobs,
        &snapshot,
        &BatchOptions::new(converter, concurrency),
        &mut observer,
    )?;

    if let Some(path) = &opts.report {
        write_report(&result, path)?;
    }
    Ok(result.all_succeeded())
}

fn handle_config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let mut store = load_settings(cli)?;
    match action {
        ConfigAction::Show => {
            println!("{}", store.path().display().to_string().dimmed());
            for key in SettingKey::ALL {
                println!("{} = {:?}", key.as_str().cyan(), store.get(key));
            }
        }
        ConfigAction::Get { key } => {
            println!("{}", store.get(key.parse()?));
        }
        ConfigAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            store.set_checked(key, value)?;
            store.save()?;
            info!("{} = {:?}", key, store.get(key));
        }
    }
    Ok(())
}

fn handle_version(converter: Option<&std::path::Path>) -> Result<()> {
    let converter = resolve_converter(converter)?;
    let version = converter_version(&converter)?;
    println!("{}", version.title.bold());
    if let Some(s) = &version.last_update {
        println!("{}", s);
    }
    if let Some(s) = &version.build_date {
        println!("{}", s);
    }
    Ok(())
}

/// Dispatch the parsed command line. Returns false when a conversion batch had failures.
pub fn handle_run(cli: &Cli) -> Result<bool> {
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| PackagePaths::get().log_path());
    setup_logging(cli.verbose, log_file.as_deref());
    match &cli.command {
        Commands::Convert(args) => handle_convert(cli, args),
        Commands::Config { action } => handle_config(cli, action).map(|_| true),
        Commands::Version { converter } => handle_version(converter.as_deref()).map(|_| true),
    }
}
