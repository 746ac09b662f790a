use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Batch converter for Magic Lantern MLV files.
#[derive(Clone, Parser)]
#[command(name = "mlvbatch")]
#[command(about = "Convert MLV clips to DNG sequences or RAW files with mlv_dump, several at a time.")]
pub struct Cli {
    /// Settings file. Default: ~/.mlv_dump/mlvbatch.toml
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log file. Default: ~/.mlv_dump/mlvbatch.log
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Convert MLV files (or every MLV file under the given directories).
    Convert(ConvertArgs),

    /// Show or edit stored settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the converter's version banner.
    Version {
        /// Converter executable. Default: MLVBATCH_CONVERTER or bin/ next to this program.
        #[arg(long)]
        converter: Option<PathBuf>,
    },
}

#[derive(Clone, Args)]
pub struct ConvertArgs {
    /// Input files or directories.
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output directory. Default: stored output_directory.
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Output format: dng or raw. Default: stored output_type.
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Chroma smoothing for DNG: none, 2x2, 3x3 or 5x5. Default: stored chroma_smoothing.
    #[arg(long, short = 's')]
    pub chroma_smoothing: Option<String>,

    /// Max conversions at once. Default: available threads, capped by the FD limit.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Converter executable. Default: MLVBATCH_CONVERTER or bin/ next to this program.
    #[arg(long)]
    pub converter: Option<PathBuf>,

    /// Write a JSON report of every outcome. Without a path: mlvbatch.report.json in the output directory.
    #[arg(long, value_name = "PATH")]
    pub report: Option<Option<PathBuf>>,

    /// Do not persist settings changed by this run.
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Clone, Subcommand)]
pub enum ConfigAction {
    /// Print every setting.
    Show,
    /// Print one setting.
    Get { key: String },
    /// Set one setting and save.
    Set { key: String, value: String },
}
