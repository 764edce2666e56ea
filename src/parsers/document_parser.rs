//! Filepath: src/parsers/document_parser.rs
//! Header-only skeletons for documents: markdown headings and the
//! structural commands of LaTeX sources.

use anyhow::{Context, Result};
use regex::Regex;

/// Keeps ATX headings (`#` .. `######`), skipping fenced code blocks.
pub struct MarkdownExtractor
{
    heading_re: Regex,
}

impl MarkdownExtractor
{
    pub fn new() -> Result<Self>
    {
        let heading_re = Regex::new(r"^#{1,6}(?:\s|$)").context("compile heading pattern")?;

        Ok(Self { heading_re })
    }

    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let mut fence: Option<&str> = None;
        let mut out: Vec<&str> = Vec::new();

        for raw in content.lines()
        {
            let line = raw.trim();

            // A fence closes only with the same marker it opened with
            if let Some(marker) = fence
            {
                if line.starts_with(marker)
                {
                    fence = None;
                }
                continue;
            }

            if let Some(marker) = ["```", "~~~"]
                .into_iter()
                .find(|m| line.starts_with(m))
            {
                fence = Some(marker);
                continue;
            }

            if self
                .heading_re
                .is_match(line)
            {
                out.push(line);
            }
        }

        if out.is_empty()
        {
            return "(Markdown file with no headers)".to_string();
        }

        out.join("\n")
    }
}

/// Keeps document-class, package/include, sectioning, environment and
/// title-block commands; prose and inline comments are dropped.
pub struct LatexExtractor
{
    command_re: Regex,
}

impl LatexExtractor
{
    pub fn new() -> Result<Self>
    {
        let command_re = Regex::new(
            r"^\s*\\(?:documentclass|usepackage|RequirePackage|input|include|includeonly|part|chapter|section|subsection|subsubsection|paragraph|subparagraph|begin|end|title|author|date)\*?(?:[\[{\s]|$)",
        )
        .context("compile LaTeX command pattern")?;

        Ok(Self { command_re })
    }

    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let out: Vec<&str> = content
            .lines()
            .map(strip_comment)
            .map(str::trim_end)
            .filter(|line| {
                self.command_re
                    .is_match(line)
            })
            .collect();

        if out.is_empty()
        {
            return "(LaTeX content empty or purely textual)".to_string();
        }

        out.join("\n")
    }
}

/// Cut a line at its first unescaped `%`.
fn strip_comment(line: &str) -> &str
{
    let bytes = line.as_bytes();

    for (idx, &b) in bytes
        .iter()
        .enumerate()
    {
        if b != b'%'
        {
            continue;
        }

        // `\%` is a literal percent unless the backslash is itself escaped
        let backslashes = bytes[..idx]
            .iter()
            .rev()
            .take_while(|&&c| c == b'\\')
            .count();
        if backslashes % 2 == 0
        {
            return &line[..idx];
        }
    }

    line
}
