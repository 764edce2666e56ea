//! Filepath: src/parsers/python_parser.rs
//! ------------------------------------------------------------------
//! Python skeleton extractor built on Tree-sitter 0.25.x.
//! Output:
//!   - Leading module comments and the module docstring, verbatim.
//!   - One line per class/function signature, indented by nesting.
//!   - The first docstring line under each definition.
//!
//! Notes:
//!   - Only module and class bodies are walked; functions nested
//!     inside functions are implementation detail and stay hidden.
//!   - Decorated definitions are unwrapped to the inner def/class.
//!   - Parameter lists spanning several lines are collapsed.
//!   - Any ERROR node in the tree is reported as a syntax failure
//!     rather than a partial skeleton.
//! ------------------------------------------------------------------

use anyhow::Result;
use tree_sitter::{Language, Node, Parser};

use crate::core::dispatch::ExtractError;
use crate::infra::utils::{PyDocUtils, TsNodeUtils};

/// One indentation level in the rendered skeleton
const INDENT: &str = "    ";

/// Extracts Python skeletons (module header, classes, functions).
pub struct PythonExtractor
{
    /// Python language handle for Tree-sitter.
    language: Language,
}

impl PythonExtractor
{
    /// Construct a new extractor; verifies the grammar loads once so
    /// per-file failures can only be syntax failures.
    pub fn new() -> Result<Self>
    {
        let language: Language = tree_sitter_python::LANGUAGE.into();

        // Probe the grammar against this tree-sitter runtime
        Parser::new().set_language(&language)?;

        Ok(Self { language })
    }

    /// Parse `content` and render its structural skeleton.
    /// `file_name` only names the file in diagnostics.
    pub fn extract(
        &self,
        content: &str,
        file_name: &str,
    ) -> Result<String, ExtractError>
    {
        // Create a parser instance and set the language.
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractError::Grammar(e.to_string()))?;

        let syntax_error = || ExtractError::Syntax {
            file: file_name.to_string(),
        };

        // Parse the source; no tree or any ERROR/MISSING node fails.
        let tree = parser
            .parse(content, None)
            .ok_or_else(syntax_error)?;
        let root = tree.root_node();
        if root.has_error()
        {
            return Err(syntax_error());
        }

        // Use the same bytes slice for all utf8_text calls.
        let bytes = content.as_bytes();

        let mut lines = Vec::with_capacity(16);
        visit_body(root, 0, bytes, &mut lines);

        let header = module_header(content);
        let signatures = lines.join("\n");

        let rendered = [header, signatures]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        let rendered = rendered.trim();
        if rendered.is_empty()
        {
            return Ok(format!("(No functions or classes found in {file_name})"));
        }

        Ok(rendered.to_string())
    }
}

/// Walk the direct children of a module or class body, emitting every
/// declaration found there.
fn visit_body(
    parent: Node,
    depth: usize,
    bytes: &[u8],
    out: &mut Vec<String>,
)
{
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor)
    {
        visit_declaration(child, depth, bytes, out);
    }
}

fn visit_declaration(
    node: Node,
    depth: usize,
    bytes: &[u8],
    out: &mut Vec<String>,
)
{
    match node.kind()
    {
        "function_definition" => emit_function(node, depth, bytes, out),
        "class_definition" => emit_class(node, depth, bytes, out),
        "decorated_definition" =>
        {
            if let Some(inner) = node.child_by_field_name("definition")
            {
                visit_declaration(inner, depth, bytes, out);
            }
        }
        _ =>
        {}
    }
}

fn emit_class(
    node: Node,
    depth: usize,
    bytes: &[u8],
    out: &mut Vec<String>,
)
{
    let Some(name) = TsNodeUtils::field_text(node, "name", bytes)
    else
    {
        return;
    };

    // Base list keeps its parentheses: `(Base, metaclass=M)`
    let bases = node
        .child_by_field_name("superclasses")
        .and_then(|n| TsNodeUtils::collapsed_text(n, bytes))
        .unwrap_or_default();

    push_line(out, depth, &format!("class {name}{bases}:"));
    emit_doc_line(node, depth + 1, bytes, out);

    if let Some(body) = node.child_by_field_name("body")
    {
        visit_body(body, depth + 1, bytes, out);
    }
}

fn emit_function(
    node: Node,
    depth: usize,
    bytes: &[u8],
    out: &mut Vec<String>,
)
{
    let Some(name) = TsNodeUtils::field_text(node, "name", bytes)
    else
    {
        return;
    };

    let prefix = if TsNodeUtils::has_child_kind(node, "async")
    {
        "async "
    }
    else
    {
        ""
    };

    let params = node
        .child_by_field_name("parameters")
        .map(|p| render_parameters(p, bytes))
        .unwrap_or_default();

    let ret = node
        .child_by_field_name("return_type")
        .and_then(|n| TsNodeUtils::collapsed_text(n, bytes))
        .map(|r| format!(" -> {r}"))
        .unwrap_or_default();

    push_line(out, depth, &format!("{prefix}def {name}({params}){ret}: ..."));
    emit_doc_line(node, depth + 1, bytes, out);
}

/// Render a `parameters` node as `a, b: int = 1, *args, **kw`.
fn render_parameters(
    params: Node,
    bytes: &[u8],
) -> String
{
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|p| p.kind() != "comment")
        .filter_map(|p| render_parameter(p, bytes))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_parameter(
    param: Node,
    bytes: &[u8],
) -> Option<String>
{
    let field = |name: &str| {
        param
            .child_by_field_name(name)
            .and_then(|n| TsNodeUtils::collapsed_text(n, bytes))
    };

    match param.kind()
    {
        // `x=1` is normalized to `x = 1`
        "default_parameter" => Some(format!("{} = {}", field("name")?, field("value")?)),
        "typed_default_parameter" => Some(format!(
            "{}: {} = {}",
            field("name")?,
            field("type")?,
            field("value")?
        )),
        _ => TsNodeUtils::collapsed_text(param, bytes),
    }
}

fn emit_doc_line(
    node: Node,
    depth: usize,
    bytes: &[u8],
    out: &mut Vec<String>,
)
{
    if let Some(doc) = PyDocUtils::docstring_for(node, bytes)
        && let Some(first) = PyDocUtils::first_line(&doc)
    {
        push_line(out, depth, &format!("\"\"\"{first}\"\"\""));
    }
}

fn push_line(
    out: &mut Vec<String>,
    depth: usize,
    text: &str,
)
{
    out.push(format!("{}{text}", INDENT.repeat(depth)));
}

/// Leading `#` comments and the module docstring, copied verbatim from
/// the top of the file. Stops at the first other statement.
fn module_header(source: &str) -> String
{
    let mut lines: Vec<&str> = Vec::new();
    let mut open_quote: Option<&str> = None;

    for line in source.lines()
    {
        let stripped = line.trim();

        if let Some(quote) = open_quote
        {
            lines.push(line.trim_end());
            if stripped.ends_with(quote)
            {
                open_quote = None;
            }
            continue;
        }

        if stripped.is_empty()
        {
            // Blank lines only count once the header has started
            if !lines.is_empty()
            {
                lines.push("");
            }
            continue;
        }

        if stripped.starts_with('#')
        {
            lines.push(line.trim_end());
            continue;
        }

        if let Some((quote, body_at)) = docstring_opener(stripped)
        {
            lines.push(line.trim_end());

            // Single-line docstring closes on the same line
            let rest = &stripped[body_at..];
            if !(rest.len() >= quote.len() && rest.ends_with(quote))
            {
                open_quote = Some(quote);
            }
            continue;
        }

        break;
    }

    while lines
        .last()
        .is_some_and(|l| {
            l.trim()
                .is_empty()
        })
    {
        lines.pop();
    }

    lines.join("\n")
}

/// Triple quote opening a docstring line, allowing a string prefix of up
/// to two letters (`r`, `u`, `b`, `f` and pairs). Returns the quote and
/// the byte offset just past it.
fn docstring_opener(line: &str) -> Option<(&'static str, usize)>
{
    let prefix = line
        .bytes()
        .take(2)
        .take_while(|b| matches!(b.to_ascii_lowercase(), b'r' | b'u' | b'b' | b'f'))
        .count();
    let rest = &line[prefix..];

    ["\"\"\"", "'''"]
        .into_iter()
        .find(|q| rest.starts_with(q))
        .map(|q| (q, prefix + q.len()))
}
