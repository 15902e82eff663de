//! Command-line argument model

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::board::BoardCommands;
use crate::cli::commands::bucket::BucketArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::piece::PieceCommands;
use crate::cli::commands::reserve::{ReleaseArgs, ReserveArgs};
use crate::cli::commands::summary::SummaryArgs;

/// Sheetstock - board stock allocation engine
#[derive(Parser, Debug)]
#[command(name = "sheetstock", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Config file (defaults to .sheetstock/config.yaml of the enclosing workspace)
    #[arg(long, global = true, env = "SHEETSTOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Log engine decisions to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Output formats
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Table for lists, YAML for single records
    #[default]
    Auto,
    Table,
    Json,
    Yaml,
    Csv,
    /// Ids only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a workspace in the current directory
    Init(InitArgs),

    /// Board catalog
    #[command(subcommand)]
    Board(BoardCommands),

    /// Stock pieces: intake, listing, moves, consumption
    #[command(subcommand)]
    Piece(PieceCommands),

    /// Reserve full boards for a project (FIFO, all or nothing)
    Reserve(ReserveArgs),

    /// Return every board reserved for a project to available stock
    Release(ReleaseArgs),

    /// Classify an offcut by its share of the standard sheet
    Bucket(BucketArgs),

    /// Stock totals for a board
    Summary(SummaryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
