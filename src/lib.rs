//! **deepbase** - Consolidate a file or project tree into one bounded context document for LLMs
//!
//! Per file, decides how much to reveal (full content, structural skeleton, or
//! only a tree entry) under a global mode, with focus patterns forcing full detail.

/// Command-line interface with clap integration
pub mod cli;

/// Core pipeline - traversal, dispatch, introspection, focus and composition
pub mod core {
    /// Target resolution, traversal and significance classification
    pub mod scan;
    pub use scan::{FileEntry, ScanResult, ScanTarget, TargetKind};

    /// Format detection and the closed extractor registry
    pub mod dispatch;
    pub use dispatch::{Dispatcher, ExtractError, Format};

    /// SQLite schema discovery and its three renderings
    pub mod database;
    pub use database::{RelationalSchema, SchemaView, has_sqlite_signature};

    /// Focus pattern resolution (paths and table-qualified patterns)
    pub mod focus;
    pub use focus::{FocusMatch, FocusSet};

    /// Advisory size-to-token accounting and display helpers
    pub mod budgeter;
    pub use budgeter::TokenEstimate;

    /// Structure section: annotated directory tree
    pub mod tree;

    /// Verdicts, section layout and the document composer
    pub mod compose;
    pub use compose::{Composer, ExtractionMode, RunTotals, Verdict, run};
}

/// Skeleton extractors - one per supported format family
pub mod parsers {
    /// Python skeletons with tree-sitter (signatures, docstrings, module header)
    pub mod python_parser;
    pub use python_parser::PythonExtractor;

    /// JavaScript/TypeScript skeletons from a line-oriented heuristic scan
    pub mod script_parser;
    pub use script_parser::ScriptExtractor;

    /// Markdown headings and LaTeX structural commands
    pub mod document_parser;
    pub use document_parser::{LatexExtractor, MarkdownExtractor};

    /// Key outlines for JSON, TOML, INI, YAML and build manifests
    pub mod config_parser;
    pub use config_parser::{
        IniExtractor, JsonExtractor, ManifestExtractor, TomlExtractor, YamlExtractor,
    };

    /// Generic truncating fallback for unsupported formats
    pub mod fallback_parser;
    pub use fallback_parser::FallbackExtractor;
}

/// Infrastructure - Configuration, I/O, traversal and shared helpers
pub mod infra {
    /// Built-in defaults merged with an optional `.deepbase.toml`
    pub mod config;
    pub use config::{Config, load_config};

    /// File reading with memory mapping and encoding recovery
    pub mod io;
    pub use io::{ReadError, read_text};

    /// Gitignore-aware directory walking with early directory pruning
    pub mod walk;
    pub use walk::FileWalker;

    /// Tree-sitter and Python docstring helpers
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli};
pub use core::{ExtractionMode, Verdict, run};
pub use infra::{Config, FileWalker, load_config};
