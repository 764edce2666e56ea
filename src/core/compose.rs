//! Filepath: src/core/compose.rs
//! Per-file verdicts, section layout and the document composer.
//!
//! A run is strictly sequential: every significant file is resolved
//! against the focus set, given a [`Verdict`], rendered and written before
//! the next one is touched. Only the target lookup and the output write
//! are fatal; anything that goes wrong with a single file becomes a
//! bracketed marker in that file's section.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::{debug, info, instrument, warn};

use crate::cli::{AppContext, Cli};
use crate::core::budgeter::{TokenEstimate, human_size};
use crate::core::database::{RelationalSchema, SchemaView};
use crate::core::dispatch::{Dispatcher, Format, fallback_label};
use crate::core::focus::{FocusMatch, FocusSet, load_pattern_file};
use crate::core::scan::{FileEntry, ScanTarget, TargetKind, expand_path, scan};
use crate::core::tree::render_tree;
use crate::infra::config::load_config;
use crate::infra::io::read_text;

/// Global extraction policy chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    TreeOnly,
    Skeleton,
    Full,
}

/// Final rendering depth of one file. Ordered: a larger verdict
/// reveals more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    Omitted,
    SkeletonView,
    FullView,
}

impl Verdict {
    /// Full mode or any focus match gives full detail; skeleton mode (or
    /// an explicitly chosen single file) gives the skeleton.
    pub fn decide(mode: ExtractionMode, focus: &FocusMatch, kind: TargetKind) -> Self {
        if mode == ExtractionMode::Full || focus.is_focused() {
            Self::FullView
        } else if mode == ExtractionMode::Skeleton || kind == TargetKind::File {
            Self::SkeletonView
        } else {
            Self::Omitted
        }
    }
}

/// Fatal run failures
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Target not found: '{}'", .0.display())]
    TargetNotFound(PathBuf),

    #[error("Cannot write output '{}'", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read focus file '{}'", path.display())]
    FocusFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub full: usize,
    pub skeleton: usize,
    pub omitted: usize,
    /// Files whose section carries an error marker or diagnostic
    pub errors: usize,
    /// Bytes of source files that got a section
    pub source_bytes: u64,
    /// Bytes written to the output document
    pub output_bytes: u64,
    /// Extensions (or bare names) rendered by the generic fallback
    pub fallback: BTreeSet<String>,
}

impl RunTotals {
    pub fn tokens(&self) -> TokenEstimate {
        TokenEstimate::from_bytes(self.output_bytes)
    }

    fn count(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Omitted => self.omitted += 1,
            Verdict::SkeletonView => self.skeleton += 1,
            Verdict::FullView => self.full += 1,
        }
    }
}

const BANNER: &str = "================================================================================";
const SEPARATOR: &str = "----------------------------------------";

const LIGHT_NOTICE: &str = "> [LIGHT MODE] Only structural skeletons are shown: signatures, \
docstrings, headings and database schemas. Bodies are omitted.";

const NO_CONTENT_NOTICE: &str =
    "> No file contents requested. Use --all, --light or --focus to include them.";

/// Section marker style, chosen once per run from the global mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// START/END markers for every section
    Standard,
    /// Skeletons get a lighter header and no footer
    Light,
}

impl Layout {
    fn for_mode(mode: ExtractionMode) -> Self {
        match mode {
            ExtractionMode::Skeleton => Self::Light,
            ExtractionMode::TreeOnly | ExtractionMode::Full => Self::Standard,
        }
    }

    fn section(self, verdict: Verdict, rel: &str, focused: bool, body: &str) -> String {
        let tag = if focused { " [FOCUS]" } else { "" };

        match (self, verdict) {
            (_, Verdict::Omitted) => String::new(),
            (Self::Light, Verdict::SkeletonView) => {
                format!("--- SKELETON: {rel} ---\n\n{body}\n\n")
            }
            _ => format!(
                "--- START OF FILE: {rel}{tag} ---\n\n{body}\n\n--- END OF FILE: {rel} ---\n{SEPARATOR}\n\n"
            ),
        }
    }
}

/// Writes the three document parts in order: header, structure, contents.
pub struct Composer<'a, W: Write> {
    out: W,
    mode: ExtractionMode,
    target_kind: TargetKind,
    layout: Layout,
    dispatcher: &'a Dispatcher,
    focus: &'a FocusSet,
    totals: RunTotals,
}

impl<'a, W: Write> Composer<'a, W> {
    pub fn new(
        out: W,
        mode: ExtractionMode,
        target_kind: TargetKind,
        dispatcher: &'a Dispatcher,
        focus: &'a FocusSet,
    ) -> Self {
        Self {
            out,
            mode,
            target_kind,
            layout: Layout::for_mode(mode),
            dispatcher,
            focus,
            totals: RunTotals::default(),
        }
    }

    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.totals.output_bytes += text.len() as u64;
        Ok(())
    }

    pub fn write_header(&mut self, name: &str) -> io::Result<()> {
        self.emit(&format!("# Project Context: {name}\n\n"))
    }

    pub fn write_structure(&mut self, tree: &str) -> io::Result<()> {
        self.emit(&format!(
            "{BANNER}\n### PROJECT STRUCTURE ###\n{BANNER}\n\n{tree}\n\n"
        ))
    }

    pub fn begin_contents(&mut self) -> io::Result<()> {
        self.emit(&format!("{BANNER}\n### FILE CONTENTS ###\n{BANNER}\n\n"))?;

        if self.mode == ExtractionMode::Skeleton {
            self.emit(&format!("{LIGHT_NOTICE}\n\n"))?;
        }

        Ok(())
    }

    /// Decide, render and write one file's section.
    pub fn write_entry(&mut self, entry: &FileEntry) -> io::Result<Verdict> {
        let rel = entry.rel_path.as_str();
        let focus = self.focus.resolve(rel, entry.is_database());
        let verdict = Verdict::decide(self.mode, &focus, self.target_kind);
        debug!(path = rel, format = entry.format.name(), ?verdict, "verdict");

        self.totals.count(verdict);

        let body = match verdict {
            Verdict::Omitted => return Ok(verdict),
            Verdict::FullView => self.full_body(entry, &focus),
            Verdict::SkeletonView => self.skeleton_body(entry),
        };

        let section = self.layout.section(verdict, rel, focus.is_focused(), &body);
        self.totals.source_bytes += entry.size;
        self.emit(&section)?;

        Ok(verdict)
    }

    fn full_body(&mut self, entry: &FileEntry, focus: &FocusMatch) -> String {
        if entry.is_database() {
            let view = match focus {
                FocusMatch::Tables(tables) if self.mode != ExtractionMode::Full => {
                    SchemaView::Hybrid(tables.clone())
                }
                _ => SchemaView::Full,
            };
            return self.schema_body(entry, &view);
        }

        match read_text(&entry.abs_path) {
            Ok(content) => content,
            Err(err) => self.read_failure(entry, err),
        }
    }

    fn skeleton_body(&mut self, entry: &FileEntry) -> String {
        if entry.is_database() {
            return self.schema_body(entry, &SchemaView::Compact);
        }

        let content = match read_text(&entry.abs_path) {
            Ok(content) => content,
            Err(err) => return self.read_failure(entry, err),
        };

        if entry.format == Format::Generic {
            self.totals.fallback.insert(fallback_label(&entry.abs_path));
        }

        match self.dispatcher.extract(entry.format, &content, entry.file_name()) {
            Ok(skeleton) => skeleton.trim_end().to_string(),
            Err(err) => {
                warn!("{}: {err}", entry.rel_path);
                self.totals.errors += 1;
                err.to_string()
            }
        }
    }

    fn schema_body(&mut self, entry: &FileEntry, view: &SchemaView) -> String {
        match RelationalSchema::introspect(&entry.abs_path) {
            Ok(schema) => schema.render(view),
            Err(err) => {
                warn!("{}: database unreadable: {err}", entry.rel_path);
                self.totals.errors += 1;
                format!("[Error reading database: {err}]")
            }
        }
    }

    fn read_failure(&mut self, entry: &FileEntry, err: impl std::fmt::Display) -> String {
        warn!("{}: read failed: {err}", entry.rel_path);
        self.totals.errors += 1;
        format!("[Error reading file: {err}]")
    }

    /// Append closing notices, flush, and hand back the totals.
    pub fn finish(mut self) -> io::Result<RunTotals> {
        if self.totals.full + self.totals.skeleton == 0 {
            self.emit(&format!("{NO_CONTENT_NOTICE}\n"))?;
        }

        if !self.totals.fallback.is_empty() {
            let formats = self.totals.fallback.iter().join(", ");
            warn!("generic fallback used for: {formats}");
            self.emit(&format!(
                "\n> [WARNING] Light Mode support is currently limited for: {formats}. \
                 Using generic fallback for these files.\n"
            ))?;
        }

        self.out.flush()?;
        Ok(self.totals)
    }
}

/// Execute one consolidation run as configured on the command line.
#[instrument(level = "info", skip_all, fields(target = %cli.target.display()))]
pub fn run(cli: &Cli, ctx: &AppContext) -> Result<RunTotals> {
    let target = ScanTarget::resolve(&cli.target)?;
    let output = output_path(&cli.output);
    let config = load_config(target.root());

    let focus = FocusSet::new(focus_patterns(cli)?);
    if !focus.is_empty() {
        info!(patterns = %focus.patterns().join(", "), "focus");
    }

    let mode = cli.mode();
    let dispatcher = Dispatcher::new().context("Failed to prepare extractors")?;
    let snapshot = scan(&target, &config, Some(&output))
        .with_context(|| format!("Failed to scan '{}'", target.path.display()))?;

    let tree = render_tree(
        &target.tree_root_name(),
        snapshot.significant(),
        snapshot.total_bytes,
    )?;

    let write_err = |source: io::Error| RunError::OutputWrite {
        path: output.clone(),
        source,
    };

    let file = File::create(&output).map_err(write_err)?;
    let mut composer = Composer::new(
        BufWriter::new(file),
        mode,
        target.kind,
        &dispatcher,
        &focus,
    );

    composer.write_header(&target.display_name()).map_err(write_err)?;
    composer.write_structure(&tree).map_err(write_err)?;
    composer.begin_contents().map_err(write_err)?;

    let progress = progress_bar(ctx, snapshot.significant_count() as u64);
    for entry in snapshot.significant() {
        progress.set_message(entry.rel_path.to_string());
        composer.write_entry(entry).map_err(write_err)?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    let totals = composer.finish().map_err(write_err)?;
    info!(
        full = totals.full,
        skeleton = totals.skeleton,
        omitted = totals.omitted,
        errors = totals.errors,
        "run complete"
    );

    if !ctx.quiet {
        print_summary(ctx, &output, &totals, mode);
    }

    Ok(totals)
}

/// Output location after `~`/`$VAR` expansion. The parent directory is
/// canonicalized when it exists so the scan can recognise the file.
fn output_path(raw: &Path) -> PathBuf {
    let expanded = expand_path(raw);
    let parent = match expanded.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    match (dunce::canonicalize(&parent), expanded.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => expanded,
    }
}

fn focus_patterns(cli: &Cli) -> Result<Vec<String>> {
    let mut patterns = cli.focus.clone();

    if let Some(raw) = &cli.focus_file {
        let path = expand_path(raw);
        let from_file = load_pattern_file(&path).map_err(|source| RunError::FocusFile {
            path: path.clone(),
            source,
        })?;
        debug!(count = from_file.len(), "focus patterns loaded from file");
        patterns.extend(from_file);
    }

    Ok(patterns)
}

fn progress_bar(ctx: &AppContext, len: u64) -> ProgressBar {
    if ctx.quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn print_summary(ctx: &AppContext, output: &Path, totals: &RunTotals, mode: ExtractionMode) {
    let shown = output.display().to_string();
    if ctx.no_color {
        println!("✓ SUCCESS: Context created in '{shown}'");
    } else {
        println!(
            "{}: Context created in '{}'",
            "✓ SUCCESS".green().bold(),
            shown.cyan()
        );
    }

    println!(
        "  {} full, {} skeleton, {} tree-only | {} written, ~{} tokens",
        totals.full,
        totals.skeleton,
        totals.omitted,
        human_size(totals.output_bytes),
        totals.tokens()
    );

    if totals.errors > 0 {
        println!("  {} file(s) rendered with an error marker", totals.errors);
    }

    if mode == ExtractionMode::TreeOnly && totals.full == 0 && totals.skeleton == 0 {
        let hint = "Note: only the structure was generated. Use --all or --light to include content.";
        if ctx.no_color {
            println!("{hint}");
        } else {
            println!("{}", hint.dimmed());
        }
    }
}
