//! Filepath: src/parsers/script_parser.rs
//! JavaScript/TypeScript skeletons from a line-oriented scan.
//!
//! No grammar is involved: each trimmed physical line is matched
//! against a handful of declaration shapes. Matched lines lose any
//! body that follows the opening brace (or the arrow) and get an
//! explicit `{ ... }` marker instead. Block comments are kept verbatim
//! since they are usually JSDoc for the declaration below them.

use anyhow::{Context, Result};
use regex::Regex;

/// Replacement for an omitted body
const BODY_MARKER: &str = " { ... }";

/// Which declaration shape a line matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptDecl
{
    Class,
    Function,
    Arrow,
    TypeDecl,
    DefaultExport,
}

/// Line-heuristic extractor for the curly-brace scripting family.
pub struct ScriptExtractor
{
    class_re: Regex,
    function_re: Regex,
    arrow_re: Regex,
    type_re: Regex,
    default_export_re: Regex,
}

impl ScriptExtractor
{
    /// Compile the declaration patterns once for reuse across files.
    pub fn new() -> Result<Self>
    {
        let class_re = Regex::new(
            r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?class\s+[A-Za-z0-9_$]+",
        )
        .context("compile class pattern")?;

        let function_re = Regex::new(
            r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function\s*\*?\s*[A-Za-z0-9_$]+\s*[<(]",
        )
        .context("compile function pattern")?;

        let arrow_re = Regex::new(
            r"^(?:export\s+)?(?:const|let|var)\s+[A-Za-z0-9_$]+\s*(?::[^=]+)?=\s*(?:async\s*)?(?:\(.*\)|[^=]+)\s*(?::[^=]+)?=>",
        )
        .context("compile arrow pattern")?;

        let type_re = Regex::new(
            r"^(?:export\s+)?(?:declare\s+)?(?:interface|type)\s+[A-Za-z0-9_$]+",
        )
        .context("compile type pattern")?;

        let default_export_re = Regex::new(r"^export\s+default\s+[A-Za-z0-9_$]+\s*;?$")
            .context("compile default export pattern")?;

        Ok(Self {
            class_re,
            function_re,
            arrow_re,
            type_re,
            default_export_re,
        })
    }

    fn classify(
        &self,
        line: &str,
    ) -> Option<ScriptDecl>
    {
        // Order matters: `export default function f` is a function,
        // `export default Foo;` only a re-export.
        if self
            .class_re
            .is_match(line)
        {
            Some(ScriptDecl::Class)
        }
        else if self
            .function_re
            .is_match(line)
        {
            Some(ScriptDecl::Function)
        }
        else if self
            .arrow_re
            .is_match(line)
        {
            Some(ScriptDecl::Arrow)
        }
        else if self
            .type_re
            .is_match(line)
        {
            Some(ScriptDecl::TypeDecl)
        }
        else if self
            .default_export_re
            .is_match(line)
        {
            Some(ScriptDecl::DefaultExport)
        }
        else
        {
            None
        }
    }

    /// Render the skeleton of a script file. Never fails; a file with
    /// no recognizable declarations yields a sentinel line.
    pub fn extract(
        &self,
        content: &str,
        file_name: &str,
    ) -> String
    {
        let source: Vec<&str> = content
            .lines()
            .collect();
        let mut out: Vec<String> = Vec::new();
        let mut in_comment = false;

        for (i, raw) in source
            .iter()
            .enumerate()
        {
            let line = raw.trim();

            if in_comment
            {
                out.push(line.to_string());
                in_comment = !line.contains("*/");
                continue;
            }

            if line.starts_with("/*")
            {
                out.push(line.to_string());
                in_comment = !line[2..].contains("*/");
                continue;
            }

            if line.is_empty() || line.starts_with("//")
            {
                continue;
            }

            if let Some(decl) = self.classify(line)
            {
                out.push(render_declaration(decl, line));
                continue;
            }

            // Decorators survive only directly above a class
            if line.starts_with('@')
                && source
                    .get(i + 1)
                    .is_some_and(|next| {
                        self.class_re
                            .is_match(next.trim())
                    })
            {
                out.push(line.to_string());
            }
        }

        if out.is_empty()
        {
            return format!("(No exported functions, classes or components found in {file_name})");
        }

        out.join("\n")
    }
}

fn render_declaration(
    decl: ScriptDecl,
    line: &str,
) -> String
{
    match decl
    {
        ScriptDecl::Arrow => match arrow_end(line)
        {
            Some(end) => format!("{}{BODY_MARKER}", &line[..end]),
            None => line.to_string(),
        },
        ScriptDecl::DefaultExport => line.to_string(),
        ScriptDecl::Class | ScriptDecl::Function | ScriptDecl::TypeDecl =>
        {
            match body_brace(line)
            {
                Some(idx) => format!(
                    "{}{BODY_MARKER}",
                    line[..idx].trim_end()
                ),
                None => line.to_string(),
            }
        }
    }
}

/// Byte offset just past the arrow that starts the function body: the
/// first `=>` outside brackets that follows the assignment `=`. Arrows in
/// parameter types or in a type annotation before the `=` are skipped.
fn arrow_end(line: &str) -> Option<usize>
{
    let bytes = line.as_bytes();
    let mut depth = 0usize;
    let mut assigned = false;

    for (idx, &b) in bytes
        .iter()
        .enumerate()
    {
        match b
        {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 =>
            {
                let next = bytes
                    .get(idx + 1)
                    .copied();
                let prev = idx
                    .checked_sub(1)
                    .map(|p| bytes[p]);

                if next == Some(b'>')
                {
                    if assigned
                    {
                        return Some(idx + 2);
                    }
                }
                else if next != Some(b'=') && !matches!(prev, Some(b'=' | b'!' | b'<' | b'>'))
                {
                    assigned = true;
                }
            }
            _ =>
            {}
        }
    }

    None
}

/// Byte offset of the first `{` outside parentheses and brackets, which
/// is where a declaration body (or object type literal) begins.
fn body_brace(line: &str) -> Option<usize>
{
    let mut depth = 0usize;

    for (idx, ch) in line.char_indices()
    {
        match ch
        {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '{' if depth == 0 => return Some(idx),
            _ =>
            {}
        }
    }

    None
}
