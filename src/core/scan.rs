//! Filepath: src/core/scan.rs
//! Target resolution, traversal and significance classification.
//!
//! The scan runs once per invocation and produces an immutable snapshot:
//! every walked file with its relative path, size, format and whether it
//! is significant enough to appear in the document.

use std::path::{Path, PathBuf};

use anyhow::Result;
use camino::Utf8PathBuf;
use tracing::{debug, info, instrument};

use crate::core::compose::RunError;
use crate::core::dispatch::Format;
use crate::infra::config::Config;
use crate::infra::walk::FileWalker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
}

/// The path the run was asked to consolidate, canonicalized
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub path: PathBuf,
    pub kind: TargetKind,
}

impl ScanTarget {
    /// Expand `~`/`$VAR`, canonicalize, and classify the target.
    pub fn resolve(raw: &Path) -> Result<Self, RunError> {
        let expanded = expand_path(raw);
        let path = dunce::canonicalize(&expanded)
            .map_err(|_| RunError::TargetNotFound(expanded.clone()))?;

        let kind = if path.is_dir() {
            TargetKind::Directory
        } else {
            TargetKind::File
        };

        Ok(Self { path, kind })
    }

    /// Directory that relative paths are computed against
    pub fn root(&self) -> &Path {
        match self.kind {
            TargetKind::Directory => &self.path,
            TargetKind::File => self.path.parent().unwrap_or(&self.path),
        }
    }

    /// Name shown in the document header
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Label for the root of the structure tree: the scanned directory,
    /// which for a single file is its parent.
    pub fn tree_root_name(&self) -> String {
        let root = self.root();
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string())
    }
}

/// Shell-style expansion of `~` and `$VAR`; unknown variables leave the
/// path as typed (tilde still expanded).
pub fn expand_path(raw: &Path) -> PathBuf {
    let text = raw.to_string_lossy();
    match shellexpand::full(&text) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(&text).into_owned()),
    }
}

/// One walked file
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub abs_path: PathBuf,
    /// Relative to the scan root, always `/`-separated
    pub rel_path: Utf8PathBuf,
    pub size: u64,
    pub format: Format,
    pub significant: bool,
}

impl FileEntry {
    pub fn is_database(&self) -> bool {
        self.format == Format::Database
    }

    pub fn file_name(&self) -> &str {
        self.rel_path.file_name().unwrap_or(self.rel_path.as_str())
    }
}

/// Ordered scan snapshot
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub entries: Vec<FileEntry>,
    /// Bytes over significant entries only
    pub total_bytes: u64,
}

impl ScanResult {
    fn new(entries: Vec<FileEntry>) -> Self {
        let total_bytes = entries.iter().filter(|e| e.significant).map(|e| e.size).sum();
        Self {
            entries,
            total_bytes,
        }
    }

    pub fn significant(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|e| e.significant)
    }

    pub fn significant_count(&self) -> usize {
        self.significant().count()
    }
}

/// Walk the target and classify every file. `excluded` (the output
/// document) is never listed.
#[instrument(level = "debug", skip_all, fields(target = %target.path.display()))]
pub fn scan(target: &ScanTarget, config: &Config, excluded: Option<&Path>) -> Result<ScanResult> {
    if target.kind == TargetKind::File {
        // Explicitly chosen files bypass the significance filter
        let entry = classify(target.root(), &target.path, config, true);
        return Ok(ScanResult::new(vec![entry]));
    }

    let mut walker = FileWalker::new(config)?;
    if let Some(path) = excluded {
        walker = walker.with_excluded(path.to_path_buf());
    }

    let entries: Vec<FileEntry> = walker
        .walk_files(&target.path)
        .iter()
        .map(|abs| classify(&target.path, abs, config, false))
        .collect();

    let result = ScanResult::new(entries);
    info!(
        files = result.entries.len(),
        significant = result.significant_count(),
        bytes = result.total_bytes,
        "scan complete"
    );

    Ok(result)
}

fn classify(root: &Path, abs: &Path, config: &Config, force_significant: bool) -> FileEntry {
    let rel = abs.strip_prefix(root).unwrap_or(abs);
    let rel_path = Utf8PathBuf::from(rel.to_string_lossy().replace('\\', "/"));

    let size = match std::fs::metadata(abs) {
        Ok(meta) => meta.len(),
        Err(err) => {
            debug!("{rel_path}: metadata unavailable: {err}");
            0
        }
    };

    let format = Format::detect(abs);
    let name = rel_path.file_name().unwrap_or(rel_path.as_str());
    let significant =
        force_significant || config.is_significant(name) || format == Format::Database;

    FileEntry {
        abs_path: abs.to_path_buf(),
        rel_path,
        size,
        format,
        significant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &[u8]) {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, body).unwrap();
    }

    #[test]
    fn classifies_by_allow_list_and_signature() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "src/app.py", b"def f(): pass\n");
        write(root, "logo.png", b"\x89PNG");
        let mut db = b"SQLite format 3\0".to_vec();
        db.extend_from_slice(&[0u8; 84]);
        write(root, "state.bin", &db);

        let target = ScanTarget::resolve(root).unwrap();
        let result = scan(&target, &Config::default(), None).unwrap();

        let sig: Vec<&str> = result.significant().map(|e| e.rel_path.as_str()).collect();
        assert_eq!(sig, ["src/app.py", "state.bin"]);
        assert!(result.entries.iter().any(|e| e.rel_path == "logo.png" && !e.significant));
        assert_eq!(result.total_bytes, 14 + 100);
    }

    #[test]
    fn single_file_bypasses_significance() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "LICENSE", b"MIT");

        let target = ScanTarget::resolve(&tmp.path().join("LICENSE")).unwrap();
        assert_eq!(target.kind, TargetKind::File);

        let result = scan(&target, &Config::default(), None).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].significant);
        assert_eq!(result.entries[0].rel_path, "LICENSE");
        assert_eq!(target.display_name(), "LICENSE");

        let parent = tmp.path().file_name().unwrap().to_string_lossy();
        assert_eq!(target.tree_root_name(), parent);
    }

    #[test]
    fn missing_target_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = ScanTarget::resolve(&tmp.path().join("nope")).unwrap_err();

        assert!(matches!(err, RunError::TargetNotFound(_)));
    }

    #[test]
    fn excluded_output_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "notes.md", b"# a");
        write(tmp.path(), "llm_context.md", b"# old output");

        let target = ScanTarget::resolve(tmp.path()).unwrap();
        let out = target.path.join("llm_context.md");
        let result = scan(&target, &Config::default(), Some(&out)).unwrap();

        let names: Vec<&str> = result.entries.iter().map(|e| e.rel_path.as_str()).collect();
        assert_eq!(names, ["notes.md"]);
    }
}
