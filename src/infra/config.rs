//! Filepath: src/infra/config.rs
//! Run configuration: three sets (ignored directories, ignored files,
//! significant extensions/filenames) built once from built-in defaults
//! and extended additively by an optional `.deepbase.toml` in the scan
//! root. The value is immutable after load.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

/// Per-target config file name, looked up in the scan root
pub const CONFIG_FILE_NAME: &str = ".deepbase.toml";

const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    ".idea",
    ".vscode",
    "venv",
    ".venv",
    "env",
    ".env",
    "node_modules",
    "build",
    "dist",
    "target",
    "out",
    "bin",
    "obj",
    "logs",
    "tmp",
    "eggs",
    ".eggs",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "site",
    "*.egg-info",
];

const DEFAULT_IGNORE_FILES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    "*.pyc",
    "*.pyo",
    "*.min.js",
    "*.map",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
    "Cargo.lock",
    CONFIG_FILE_NAME,
];

const DEFAULT_SIGNIFICANT: &[&str] = &[
    ".py",
    ".pyi",
    ".java",
    ".js",
    ".jsx",
    ".mjs",
    ".cjs",
    ".ts",
    ".tsx",
    ".html",
    ".css",
    ".scss",
    ".sql",
    ".md",
    ".markdown",
    ".tex",
    ".sty",
    ".cls",
    ".json",
    ".xml",
    ".yml",
    ".yaml",
    ".toml",
    ".ini",
    ".cfg",
    ".sh",
    ".bat",
    ".rs",
    ".go",
    ".db",
    ".sqlite",
    ".sqlite3",
    ".db3",
    "Dockerfile",
    "Makefile",
    ".dockerignore",
    ".gitignore",
    "requirements.txt",
    "pom.xml",
    "gradlew",
    "pyproject.toml",
    "setup.py",
];

/// Immutable run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config
{
    /// Directory names or globs pruned before descending
    pub ignore_dirs: BTreeSet<String>,

    /// File names or globs rejected outright
    pub ignore_files: BTreeSet<String>,

    /// Extensions (with leading dot) or exact basenames that make a file significant
    pub significant: BTreeSet<String>,
}

/// Optional overrides read from `.deepbase.toml`; every array extends a default set
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides
{
    pub ignore_dirs: Vec<String>,
    pub ignore_files: Vec<String>,
    pub significant_extensions: Vec<String>,
}

impl Default for Config
{
    fn default() -> Self
    {
        let owned = |items: &[&str]| {
            items
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<_>>()
        };

        Self {
            ignore_dirs: owned(DEFAULT_IGNORE_DIRS),
            ignore_files: owned(DEFAULT_IGNORE_FILES),
            significant: owned(DEFAULT_SIGNIFICANT),
        }
    }
}

impl Config
{
    /// Defaults extended by the override arrays (set union, never removal)
    pub fn merged(overrides: ConfigOverrides) -> Self
    {
        let mut cfg = Self::default();

        cfg.ignore_dirs
            .extend(overrides.ignore_dirs);
        cfg.ignore_files
            .extend(overrides.ignore_files);
        cfg.significant
            .extend(overrides.significant_extensions);

        cfg
    }

    /// Significant when the basename or its extension is in the allow-list.
    /// Extensions compare case-insensitively (`.PY` counts as `.py`).
    pub fn is_significant(
        &self,
        file_name: &str,
    ) -> bool
    {
        if self
            .significant
            .contains(file_name)
        {
            return true;
        }

        match Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) =>
            {
                let dotted = format!(".{ext}");
                self.significant
                    .contains(&dotted)
                    || self
                        .significant
                        .contains(&dotted.to_lowercase())
            }
            None => false,
        }
    }

    /// Compile the ignored-directory entries into a matcher
    pub fn ignore_dir_matcher(&self) -> Result<GlobSet>
    {
        compile_globs(&self.ignore_dirs)
    }

    /// Compile the ignored-file entries into a matcher
    pub fn ignore_file_matcher(&self) -> Result<GlobSet>
    {
        compile_globs(&self.ignore_files)
    }
}

/// Exact names are globs without metacharacters, so one matcher serves both.
/// Malformed globs are skipped with a warning instead of failing the run.
fn compile_globs(patterns: &BTreeSet<String>) -> Result<GlobSet>
{
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns
    {
        match Glob::new(pattern)
        {
            Ok(glob) =>
            {
                builder.add(glob);
            }
            Err(err) => warn!("ignoring malformed pattern {pattern:?}: {err}"),
        }
    }

    builder
        .build()
        .context("Failed to compile ignore patterns")
}

/// Read and deserialize a config file; errors on malformed TOML
pub fn read_overrides(path: &Path) -> Result<ConfigOverrides>
{
    let cfg = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()
        .context("Failed to load configuration")?;

    cfg.try_deserialize()
        .context("Failed to parse configuration")
}

/// Load the configuration for a scan root. Absent or malformed config
/// files fall back to the defaults; this never fails.
pub fn load_config(root: &Path) -> Config
{
    let path = root.join(CONFIG_FILE_NAME);

    if !path.is_file()
    {
        return Config::default();
    }

    match read_overrides(&path)
    {
        Ok(overrides) =>
        {
            debug!("loaded {}", path.display());
            Config::merged(overrides)
        }
        Err(err) =>
        {
            warn!("{}: {err:#}; using built-in defaults", path.display());
            Config::default()
        }
    }
}
