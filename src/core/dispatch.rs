//! Format detection and the closed extractor registry.
//!
//! Every file maps to exactly one [`Format`]; the [`Dispatcher`] owns one
//! prepared extractor per text format and routes on the tag. Adding a
//! format means one enum variant, one detection rule and one match arm.

use std::path::Path;

use anyhow::Result;
use tracing::trace;

use crate::core::database::has_sqlite_signature;
use crate::parsers::{
    FallbackExtractor, IniExtractor, JsonExtractor, LatexExtractor, ManifestExtractor,
    MarkdownExtractor, PythonExtractor, ScriptExtractor, TomlExtractor, YamlExtractor,
};

/// Extensionless file names routed to the manifest extractor
const MANIFEST_NAMES: &[&str] = &[".gitignore", ".dockerignore", "Dockerfile", "Makefile"];

/// Format family of a file, decided once per file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format
{
    Python,
    Script,
    Markdown,
    Latex,
    Json,
    Toml,
    Ini,
    Yaml,
    Manifest,
    Database,
    Generic,
}

impl Format
{
    /// Format by well-known file name, then extension (case-insensitive);
    /// unknown → `Generic`.
    pub fn from_path(path: &Path) -> Self
    {
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| MANIFEST_NAMES.contains(&n))
        {
            return Self::Manifest;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref()
        {
            Some("py" | "pyw" | "pyi") => Self::Python,
            Some("js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" | "mts" | "cts") => Self::Script,
            Some("md" | "markdown" | "mdown" | "mkd") => Self::Markdown,
            Some("tex" | "sty" | "cls") => Self::Latex,
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            Some("ini" | "cfg") => Self::Ini,
            Some("yml" | "yaml") => Self::Yaml,
            Some("txt" | "dockerignore" | "gitignore") => Self::Manifest,
            _ => Self::Generic,
        }
    }

    /// Full detection: the database signature wins over any extension.
    pub fn detect(path: &Path) -> Self
    {
        if has_sqlite_signature(path)
        {
            return Self::Database;
        }

        Self::from_path(path)
    }

    /// Stable lowercase name for logs
    pub fn name(self) -> &'static str
    {
        match self
        {
            Self::Python => "python",
            Self::Script => "script",
            Self::Markdown => "markdown",
            Self::Latex => "latex",
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Ini => "ini",
            Self::Yaml => "yaml",
            Self::Manifest => "manifest",
            Self::Database => "database",
            Self::Generic => "generic",
        }
    }
}

/// Label under which a generic-fallback file is reported: its lowercase
/// extension with a dot, or the bare file name when it has none.
pub fn fallback_label(path: &Path) -> String
{
    match path
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
        None => path
            .file_name()
            .map(|n| {
                n.to_string_lossy()
                    .into_owned()
            })
            .unwrap_or_default(),
    }
}

/// Per-file extraction failures; the message is the diagnostic line
/// written in place of the skeleton.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError
{
    #[error("(Syntax Error parsing {file})")]
    Syntax
    {
        file: String
    },

    #[error("(Parser unavailable: {0})")]
    Grammar(String),

    #[error("(No text skeleton for binary file {file})")]
    NotText
    {
        file: String
    },
}

/// Closed registry of text extractors, built once per run
pub struct Dispatcher
{
    python: PythonExtractor,
    script: ScriptExtractor,
    markdown: MarkdownExtractor,
    latex: LatexExtractor,
    json: JsonExtractor,
    toml: TomlExtractor,
    ini: IniExtractor,
    yaml: YamlExtractor,
    manifest: ManifestExtractor,
    fallback: FallbackExtractor,
}

impl Dispatcher
{
    pub fn new() -> Result<Self>
    {
        Ok(Self {
            python: PythonExtractor::new()?,
            script: ScriptExtractor::new()?,
            markdown: MarkdownExtractor::new()?,
            latex: LatexExtractor::new()?,
            json: JsonExtractor,
            toml: TomlExtractor,
            ini: IniExtractor,
            yaml: YamlExtractor,
            manifest: ManifestExtractor,
            fallback: FallbackExtractor,
        })
    }

    /// Skeleton of decoded text content. Databases are not text and are
    /// rendered by the schema introspector instead.
    pub fn extract(
        &self,
        format: Format,
        content: &str,
        file_name: &str,
    ) -> Result<String, ExtractError>
    {
        trace!(format = format.name(), file_name, "extract");

        match format
        {
            Format::Python => self
                .python
                .extract(content, file_name),
            Format::Script => Ok(self
                .script
                .extract(content, file_name)),
            Format::Markdown => Ok(self
                .markdown
                .extract(content)),
            Format::Latex => Ok(self
                .latex
                .extract(content)),
            Format::Json => Ok(self
                .json
                .extract(content)),
            Format::Toml => Ok(self
                .toml
                .extract(content)),
            Format::Ini => Ok(self
                .ini
                .extract(content)),
            Format::Yaml => Ok(self
                .yaml
                .extract(content)),
            Format::Manifest => Ok(self
                .manifest
                .extract(content)),
            Format::Generic => Ok(self
                .fallback
                .extract(content)),
            Format::Database => Err(ExtractError::NotText {
                file: file_name.to_string(),
            }),
        }
    }
}
