//! Filepath: src/parsers/config_parser.rs
//! Key outlines for configuration and manifest files.
//!
//! - JSON: parsed with serde_json; top-level keys with a one-line hint
//!   of each value's shape.
//! - TOML: parsed with the toml crate; table headers and their keys,
//!   values elided. Unparseable TOML falls back to the INI scan.
//! - INI/CFG: `[section]` lines and `key = ...` by line scan.
//! - YAML: every `key:` line, indentation kept, values dropped.
//! - Manifests (Dockerfile, Makefile, ignore lists, requirements):
//!   comment-stripped and never truncated.

use serde_json::Value as JsonValue;
use toml::Value as TomlValue;
use tracing::debug;

const EMPTY: &str = "(Empty or comments-only file)";

/// Top-level keys of a JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExtractor;

impl JsonExtractor
{
    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let value: JsonValue = match serde_json::from_str(content)
        {
            Ok(value) => value,
            Err(err) =>
            {
                debug!(%err, "json parse failed");
                return "(Invalid JSON content)".to_string();
            }
        };

        let JsonValue::Object(map) = value
        else
        {
            return "(JSON Array or Scalar)".to_string();
        };

        let mut lines = Vec::with_capacity(map.len() + 2);
        lines.push("{".to_string());
        for (key, value) in &map
        {
            let shape = match value
            {
                JsonValue::Object(inner) =>
                {
                    let keys = inner
                        .keys()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{{ ...keys: [{keys}] }}")
                }
                JsonValue::Array(items) => format!("[ ...size: {} ]", items.len()),
                _ => "(value)".to_string(),
            };
            lines.push(format!("  {key}: {shape}"));
        }
        lines.push("}".to_string());

        lines.join("\n")
    }
}

/// Table headers and keys of a TOML document.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlExtractor;

impl TomlExtractor
{
    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let table = match toml::from_str::<toml::Table>(content)
        {
            Ok(table) => table,
            Err(err) =>
            {
                debug!(%err, "toml parse failed; using line scan");
                return IniExtractor.extract(content);
            }
        };

        let mut lines = Vec::new();

        // Bare keys come first, as they must in the source
        for (key, value) in &table
        {
            if !is_section(value)
            {
                lines.push(format!("{key} = ..."));
            }
        }

        for (key, value) in &table
        {
            match value
            {
                TomlValue::Table(inner) =>
                {
                    lines.push(format!("[{key}]"));
                    push_keys(&mut lines, inner);
                }
                TomlValue::Array(items) if is_section(value) =>
                {
                    lines.push(format!("[[{key}]]"));
                    if let Some(TomlValue::Table(first)) = items.first()
                    {
                        push_keys(&mut lines, first);
                    }
                }
                _ =>
                {}
            }
        }

        if lines.is_empty()
        {
            return EMPTY.to_string();
        }

        lines.join("\n")
    }
}

/// Tables and non-empty arrays of tables become headers; nested tables
/// below a header are listed as keys.
fn is_section(value: &TomlValue) -> bool
{
    match value
    {
        TomlValue::Table(_) => true,
        TomlValue::Array(items) =>
        {
            !items.is_empty() && items.iter().all(|i| matches!(i, TomlValue::Table(_)))
        }
        _ => false,
    }
}

fn push_keys(
    lines: &mut Vec<String>,
    table: &toml::Table,
)
{
    lines.extend(table.keys().map(|k| format!("{k} = ...")));
}

/// `[section]` headers and `key = ...` lines of INI-style files.
#[derive(Debug, Default, Clone, Copy)]
pub struct IniExtractor;

impl IniExtractor
{
    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with(';'))
            .filter_map(|l| {
                if l.starts_with('[') && l.ends_with(']')
                {
                    return Some(l.to_string());
                }

                l.split_once('=')
                    .map(|(key, _)| format!("{} = ...", key.trim()))
            })
            .collect();

        if lines.is_empty()
        {
            return EMPTY.to_string();
        }

        lines.join("\n")
    }
}

/// Mapping keys of a YAML file, one `key:` per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlExtractor;

impl YamlExtractor
{
    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let lines: Vec<String> = content
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .filter_map(|l| l.split_once(':'))
            .map(|(key, _)| format!("{}:", key.trim_end()))
            .collect();

        if lines.is_empty()
        {
            return EMPTY.to_string();
        }

        lines.join("\n")
    }
}

/// Dockerfiles, Makefiles, ignore lists and requirement files: every
/// non-blank, non-`#` line, untruncated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestExtractor;

impl ManifestExtractor
{
    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();

        if lines.is_empty()
        {
            return EMPTY.to_string();
        }

        lines.join("\n")
    }
}
