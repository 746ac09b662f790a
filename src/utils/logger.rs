use colored::Colorize;
use env_logger::{Builder, Target};
use log::Level;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Init logging. With `log_file`, records go to that file (truncated) as plain timestamped lines
/// and the terminal is left to the progress bar. Without one, or if it cannot be opened, records
/// use the compact colored terminal format.
pub fn setup_logging(verbose: bool, log_file: Option<&Path>) {
    use log::LevelFilter;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = Builder::from_default_env();
    builder
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level); // Our crate: use requested level

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        File::create(path)
            .map_err(|e| eprintln!("cannot open log file {}: {}", path.display(), e))
            .ok()
    });

    match file {
        Some(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .format(|buf, record| {
                    writeln!(
                        buf,
                        "{} - {} - {}",
                        buf.timestamp(),
                        record.level(),
                        record.args()
                    )
                });
        }
        None => {
            builder.format(|buf, record| {
                let name = env!("CARGO_PKG_NAME");
                let line = match record.level() {
                    Level::Error | Level::Warn => {
                        let level_str = match record.level() {
                            Level::Warn => "WARN".yellow(),
                            Level::Error => "ERROR".red(),
                            _ => unreachable!(),
                        };
                        let path = record.target().to_string().white();
                        format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                    }
                    _ => format!("[{}] {}", name.cyan(), record.args()),
                };
                writeln!(buf, "{}", line)
            });
        }
    }

    let _ = builder.try_init();
}
