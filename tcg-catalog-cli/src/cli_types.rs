//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tcg_catalog::SeriesFolderConvention;

#[derive(Parser)]
#[command(name = "tcg-catalog")]
#[command(about = "Build a local trading-card catalog from a text dump", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Rebuild the catalog database from the dump and auxiliary sources
    Build(BuildArgs),

    /// Show row counts of the catalog database
    Stats {
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Clone, Default)]
pub(crate) struct BuildArgs {
    /// Root directory of the text dump
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Legacy set archive (zip of JSON set summaries)
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Database path
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Also consult the remote card-catalog API
    #[arg(long)]
    pub remote: bool,

    /// How series metadata files name their folders
    #[arg(long, value_enum)]
    pub series_folder: Option<SeriesFolderArg>,

    /// Dump file extension, without the dot
    #[arg(long)]
    pub extension: Option<String>,

    /// Fetch at most this many sets and cards from the remote API
    #[arg(long)]
    pub limit: Option<usize>,

    /// Succeed (and empty the database) when the dump has no series
    #[arg(long)]
    pub allow_empty: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum SeriesFolderArg {
    SeriesId,
    FileName,
}

impl From<SeriesFolderArg> for SeriesFolderConvention {
    fn from(arg: SeriesFolderArg) -> Self {
        match arg {
            SeriesFolderArg::SeriesId => SeriesFolderConvention::SeriesId,
            SeriesFolderArg::FileName => SeriesFolderConvention::MetadataFileName,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Print the settings file path
    Path,
}
