use clap::Parser;
use std::path::PathBuf;

use crate::core::ExtractionMode;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // --quiet
    pub no_color: bool, // --no-color
}

#[derive(Parser, Debug)]
#[command(name = "deepbase")]
#[command(
    about = "Analyzes a project or file and creates a unified context document for an LLM"
)]
#[command(version, long_about = None)]
pub struct Cli {
    /// The file or directory to scan
    pub target: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "llm_context.md")]
    pub output: PathBuf,

    /// Include the full content of every significant file
    #[arg(short, long)]
    pub all: bool,

    /// Include structural skeletons (signatures, headings, schemas) instead of bodies
    #[arg(short, long)]
    pub light: bool,

    /// Force full detail for matching paths (glob or substring); `db.sqlite/table` focuses a table
    #[arg(short, long, value_name = "PATTERN")]
    pub focus: Vec<String>,

    /// Read additional focus patterns from a file (one per line, `#` comments)
    #[arg(long, value_name = "PATH")]
    pub focus_file: Option<PathBuf>,

    /// Suppress progress bars and non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Global extraction mode selected by the flags. `--all` wins over `--light`.
    pub fn mode(&self) -> ExtractionMode {
        if self.all {
            ExtractionMode::Full
        } else if self.light {
            ExtractionMode::Skeleton
        } else {
            ExtractionMode::TreeOnly
        }
    }

    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
