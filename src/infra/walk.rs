//! Filepath: src/infra/walk.rs
//! Gitignore-aware file walker driven by the run configuration.
//! - Git ignore rules (repository, info/exclude, global) apply
//! - Ignored directories (exact name or glob) are pruned before descent
//! - Hidden directories are pruned; hidden files are kept
//! - Ignored files (exact name or glob) are filtered late
//! - Deterministic ordering for stable output across runs
//!
//! Traversal is the `ignore` crate; name matching is `globset`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::GlobSet;
use ignore::{DirEntry, WalkBuilder};
use tracing::debug;

use crate::infra::config::Config;

/// Walker over a scan root with directory pruning and file rejection.
/// Ignore rules are applied in two places:
///   1) Early: prune directories during traversal (filter_entry), so
///      their subtrees are never visited.
///   2) Late: drop files whose name or relative path is ignored.
pub struct FileWalker
{
    /// Ignored directory names/globs
    ignore_dirs: GlobSet,

    /// Ignored file names/globs
    ignore_files: GlobSet,

    /// Absolute paths never yielded (e.g. the output document itself)
    excluded: Vec<PathBuf>,
}

impl FileWalker
{
    /// Build a walker from the configured ignore sets.
    pub fn new(config: &Config) -> Result<Self>
    {
        Ok(Self {
            ignore_dirs: config.ignore_dir_matcher()?,
            ignore_files: config.ignore_file_matcher()?,
            excluded: Vec::new(),
        })
    }

    /// (Optional) Never yield this path. Compared verbatim against walked
    /// paths, so pass it in the same (canonical) form as the root.
    pub fn with_excluded(
        mut self,
        path: PathBuf,
    ) -> Self
    {
        self.excluded
            .push(path);
        self
    }

    /// True when a file name or root-relative path is on the ignore list.
    pub fn is_ignored_file(
        &self,
        name: &str,
        rel: &Path,
    ) -> bool
    {
        self.ignore_files
            .is_match(name)
            || self
                .ignore_files
                .is_match(rel)
    }

    /// Configure the underlying walk for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Dotfiles stay visible; dot-directories are pruned below
        b.hidden(false);

        // Git ignore sources, same as `git status` would apply
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);

        // Early directory pruning: a pruned subtree is never read.
        let dirs = self
            .ignore_dirs
            .clone();
        let root_buf = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            if ent.depth() == 0
            {
                return true;
            }

            // Unknown types are kept; the late filter sees only files
            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);
            if !is_dir
            {
                return true;
            }

            let name = ent
                .file_name()
                .to_string_lossy();
            if name.starts_with('.')
            {
                return false;
            }

            let rel = ent
                .path()
                .strip_prefix(&root_buf)
                .unwrap_or(ent.path());
            !(dirs.is_match(&*name) || dirs.is_match(rel))
        });

        b
    }

    /// Traverse files under `root`, respecting ignore rules.
    /// Returns a **sorted** list of file paths for determinism.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Vec<PathBuf>
    {
        let root_path = root.as_ref();
        let walker = self
            .build_walk(root_path)
            .build();

        let mut out: Vec<PathBuf> = walker
            .filter_map(|res| match res
            {
                Ok(entry) => Some(entry),
                Err(err) =>
                {
                    debug!("skipping unreadable entry: {err}");
                    None
                }
            })
            // Regular files only
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            .map(|entry| entry.into_path())
            .filter(|abs| {
                !self
                    .excluded
                    .iter()
                    .any(|x| x == abs)
            })
            // Late file-level filtering on name and RELATIVE path
            .filter(|abs| {
                let rel = abs
                    .strip_prefix(root_path)
                    .unwrap_or(abs);
                let name = abs
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                !self.is_ignored_file(&name, rel)
            })
            .collect();

        // Deterministic order (stable output & tests)
        out.sort();

        out
    }
}
