//! Filepath: src/core/tree.rs
//! Structure section: a directory tree of the significant files where
//! every entry is annotated as `name (size, pct%, ~tokens tokens)`.
//!
//! Notes:
//! - Sizes come from the scan snapshot; no file is re-read here.
//! - Folder sizes are a bottom-up fold; each level returns its rendered
//!   item together with its subtree size.
//! - BTreeMap keeps ordering deterministic (folders first, then files).

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use ptree::PrintConfig;
use ptree::item::StringItem;

use crate::core::budgeter::{TokenEstimate, human_size, percent};
use crate::core::scan::FileEntry;

#[derive(Debug, Default)]
struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    files: BTreeMap<String, u64>,
}

impl DirNode {
    fn insert(&mut self, rel_path: &str, size: u64) {
        let mut parts: Vec<&str> = rel_path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };

        let mut node = self;
        for dir in parts {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.insert(file.to_string(), size);
    }
}

/// Render the annotated tree for `entries` under a root labelled `root_name`.
pub fn render_tree<'a, I>(root_name: &str, entries: I, total_bytes: u64) -> Result<String>
where
    I: IntoIterator<Item = &'a FileEntry>,
{
    let mut root = DirNode::default();
    for entry in entries {
        root.insert(entry.rel_path.as_str(), entry.size);
    }

    let (item, _) = fold(&format!("{root_name}/"), &root, total_bytes);

    let mut buf = Vec::new();
    ptree::write_tree_with(&item, &mut buf, &PrintConfig::default())
        .context("Failed to render directory tree")?;

    Ok(String::from_utf8_lossy(&buf).trim_end().to_string())
}

/// Returns the rendered subtree and its byte size.
fn fold(name: &str, node: &DirNode, total: u64) -> (StringItem, u64) {
    let mut children = Vec::with_capacity(node.dirs.len() + node.files.len());
    let mut size = 0u64;

    for (dir_name, child) in &node.dirs {
        let (item, child_size) = fold(&format!("{dir_name}/"), child, total);
        size += child_size;
        children.push(item);
    }

    for (file_name, &file_size) in &node.files {
        size += file_size;
        children.push(StringItem {
            text: label(file_name, file_size, total),
            children: Vec::new(),
        });
    }

    let item = StringItem {
        text: label(name, size, total),
        children,
    };

    (item, size)
}

fn label(name: &str, size: u64, total: u64) -> String {
    format!(
        "{name} ({}, {:.1}%, ~{} tokens)",
        human_size(size),
        percent(size, total),
        TokenEstimate::from_bytes(size)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::Format;
    use camino::Utf8PathBuf;
    use std::path::PathBuf;

    fn entry(rel: &str, size: u64) -> FileEntry {
        FileEntry {
            abs_path: PathBuf::from("/x").join(rel),
            rel_path: Utf8PathBuf::from(rel),
            size,
            format: Format::from_path(rel.as_ref()),
            significant: true,
        }
    }

    #[test]
    fn folders_sum_their_children() {
        let entries = [
            entry("src/core/a.py", 300),
            entry("src/b.py", 100),
            entry("README.md", 600),
        ];
        let out = render_tree("proj", &entries, 1000).unwrap();

        assert!(out.starts_with("proj/ (1000 B, 100.0%, ~250 tokens)"));
        assert!(out.contains("src/ (400 B, 40.0%, ~100 tokens)"));
        assert!(out.contains("core/ (300 B, 30.0%, ~75 tokens)"));
        assert!(out.contains("a.py (300 B, 30.0%, ~75 tokens)"));
        assert!(out.contains("README.md (600 B, 60.0%, ~150 tokens)"));
    }

    #[test]
    fn folders_listed_before_files() {
        let entries = [entry("z.md", 1), entry("a/b.md", 1)];
        let out = render_tree("p", &entries, 2).unwrap();

        let dir_at = out.find("a/ (").unwrap();
        let file_at = out.find("z.md").unwrap();
        assert!(dir_at < file_at);
    }

    #[test]
    fn empty_total_renders_zero_percent() {
        let entries = [entry("empty.py", 0)];
        let out = render_tree("p", &entries, 0).unwrap();

        assert!(out.contains("empty.py (0 B, 0.0%, ~0 tokens)"));
    }
}
