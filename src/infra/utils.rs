//! Filepath: src/infra/utils.rs
//! Syntax-tree helpers shared by the skeleton extractors: field text,
//! whitespace collapsing for multi-line signatures, and PEP 257
//! docstring lookup.

use tree_sitter::Node;

/// Node text accessors
pub struct TsNodeUtils;

impl TsNodeUtils
{
    /// Source text of the child under `field`, if any
    pub fn field_text<'a>(
        node: Node,
        field: &str,
        bytes: &'a [u8],
    ) -> Option<&'a str>
    {
        let child = node.child_by_field_name(field)?;

        child
            .utf8_text(bytes)
            .ok()
    }

    /// Node text with every whitespace run (newlines included)
    /// collapsed to one space
    pub fn collapsed_text(
        node: Node,
        bytes: &[u8],
    ) -> Option<String>
    {
        node.utf8_text(bytes)
            .ok()
            .map(Self::collapse_ws)
    }

    /// Collapse whitespace runs to a single space and trim
    pub fn collapse_ws(s: &str) -> String
    {
        s.split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
    }

    /// Check if `node` has a direct child of the given kind
    pub fn has_child_kind(
        node: Node,
        kind: &str,
    ) -> bool
    {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| c.kind() == kind)
    }
}

/// Docstring lookup and normalization
pub struct PyDocUtils;

impl PyDocUtils
{
    /// Extract a PEP 257 docstring from a function or class
    /// node: the first non-comment statement of its body
    /// must be a bare string literal.
    pub fn docstring_for(
        node: Node,
        bytes: &[u8],
    ) -> Option<String>
    {
        // Definitions keep their suite under the 'body' field
        let body = node.child_by_field_name("body")?;

        // First real statement, comments do not count
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment")?;

        if first.kind() != "expression_statement"
        {
            return None;
        }

        // Its only named child must be a string literal
        let lit = first
            .named_child(0)
            .filter(|n| n.kind() == "string")?;

        let raw = lit
            .utf8_text(bytes)
            .ok()?;

        Some(Self::unquote_and_dedent(raw))
    }

    /// First non-blank line of a docstring, trimmed
    pub fn first_line(doc: &str) -> Option<&str>
    {
        doc.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
    }

    /// Strip prefix letters and quotes, then dedent the body
    pub fn unquote_and_dedent(s: &str) -> String
    {
        let s = s.trim();

        // Legal Python string prefixes: r, u, f, b and two-letter combos
        let is_prefix = |c: char| matches!(c.to_ascii_uppercase(), 'R' | 'U' | 'F' | 'B');
        let skip = s
            .chars()
            .take(2)
            .take_while(|c| is_prefix(*c))
            .count();

        // Prefix letters are ASCII, so char count equals byte count
        let s = &s[skip..];

        for q in [r#"""""#, r#"'''"#]
        {
            if s.starts_with(q) && s.ends_with(q) && s.len() >= 2 * q.len()
            {
                let inner = &s[q.len()..s.len() - q.len()];
                return Self::dedent(inner);
            }
        }

        // Single-quoted literals may carry escapes
        if s.len() >= 2
            && ((s.starts_with('"') && s.ends_with('"'))
                || (s.starts_with('\'') && s.ends_with('\'')))
        {
            let inner = &s[1..s.len() - 1];

            return inner
                .replace("\\n", "\n")
                .replace("\\t", "\t")
                .replace("\\\"", "\"")
                .replace("\\'", "'");
        }

        s.to_string()
    }

    /// Remove the smallest leading-space run shared by non-blank lines
    pub fn dedent(s: &str) -> String
    {
        let lines: Vec<&str> = s
            .lines()
            .collect();

        let indent = lines
            .iter()
            .filter(|l| {
                !l.trim()
                    .is_empty()
            })
            .map(|l| {
                l.chars()
                    .take_while(|c| *c == ' ')
                    .count()
            })
            .min()
            .unwrap_or(0);

        lines
            .iter()
            .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
            .collect::<Vec<&str>>()
            .join("\n")
    }
}
