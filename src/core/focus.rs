//! Focus pattern resolution.
//!
//! A pattern matches a file when the file's `/`-separated relative path
//! matches it as a glob or contains it as a literal substring. Patterns
//! with a `/` additionally act on databases as `<db-name-glob>/<table>`,
//! selecting a single table when the database's file name matches.

use std::collections::BTreeSet;
use std::path::Path;

use globset::{Glob, GlobMatcher};
use indexmap::IndexSet;
use tracing::debug;

/// Outcome of resolving one file against the focus set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusMatch {
    #[default]
    None,
    /// Some tables of a database file (lowercase names)
    Tables(BTreeSet<String>),
    /// The whole file
    File,
}

impl FocusMatch {
    pub fn is_focused(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug)]
struct PathPattern {
    literal: String,
    glob: Option<GlobMatcher>,
}

impl PathPattern {
    fn matches(&self, rel: &str) -> bool {
        rel.contains(&self.literal) || self.glob.as_ref().is_some_and(|g| g.is_match(rel))
    }

    /// Database names match the whole file name, never a substring
    fn matches_exactly(&self, name: &str) -> bool {
        name == self.literal || self.glob.as_ref().is_some_and(|g| g.is_match(name))
    }
}

#[derive(Debug)]
struct TablePattern {
    database: PathPattern,
    table: String,
}

/// Deduplicated focus patterns, compiled once per run
#[derive(Debug, Default)]
pub struct FocusSet {
    patterns: IndexSet<String>,
    paths: Vec<PathPattern>,
    tables: Vec<TablePattern>,
}

impl FocusSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: IndexSet<String> = patterns
            .into_iter()
            .map(|p| normalize(p.as_ref().trim()))
            .filter(|p| !p.is_empty())
            .collect();

        let paths = patterns.iter().map(|p| compile(p)).collect();

        let tables = patterns
            .iter()
            .filter_map(|p| {
                let (db, table) = p.rsplit_once('/')?;
                if db.is_empty() || table.is_empty() {
                    return None;
                }
                Some(TablePattern {
                    database: compile(db),
                    table: table.to_lowercase(),
                })
            })
            .collect();

        Self {
            patterns,
            paths,
            tables,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in first-seen order, without duplicates
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Resolve a file by its scan-relative path. Table-qualified patterns
    /// are only consulted for database files.
    pub fn resolve(&self, rel_path: &str, is_database: bool) -> FocusMatch {
        let rel = normalize(rel_path);

        if self.paths.iter().any(|p| p.matches(&rel)) {
            return FocusMatch::File;
        }

        if !is_database {
            return FocusMatch::None;
        }

        let file_name = rel.rsplit('/').next().unwrap_or(&rel);
        let tables: BTreeSet<String> = self
            .tables
            .iter()
            .filter(|t| t.database.matches_exactly(file_name))
            .map(|t| t.table.clone())
            .collect();

        if tables.is_empty() {
            FocusMatch::None
        } else {
            FocusMatch::Tables(tables)
        }
    }
}

fn compile(pattern: &str) -> PathPattern {
    let glob = match Glob::new(pattern) {
        Ok(g) => Some(g.compile_matcher()),
        Err(err) => {
            debug!("focus pattern {pattern:?} used as literal only: {err}");
            None
        }
    };

    PathPattern {
        literal: pattern.to_string(),
        glob,
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Read focus patterns from a file: one per line, blank lines and
/// `#` comments skipped.
pub fn load_pattern_file(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}
