//! Filepath: src/parsers/fallback_parser.rs
//! Generic truncating preview for formats without a dedicated extractor.

/// Lines kept before the preview is cut
pub const FALLBACK_LINE_LIMIT: usize = 20;

/// Drops blank and single-line comment lines, then keeps at most
/// [`FALLBACK_LINE_LIMIT`] lines followed by a hidden-line count.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackExtractor;

impl FallbackExtractor
{
    pub fn extract(
        &self,
        content: &str,
    ) -> String
    {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !is_line_comment(l))
            .collect();

        if lines.is_empty()
        {
            return "(Empty or comments-only file)".to_string();
        }

        if lines.len() > FALLBACK_LINE_LIMIT
        {
            let hidden = lines.len() - FALLBACK_LINE_LIMIT;
            return format!(
                "{}\n... ({hidden} more lines hidden - Light Mode Fallback)",
                lines[..FALLBACK_LINE_LIMIT].join("\n")
            );
        }

        lines.join("\n")
    }
}

fn is_line_comment(line: &str) -> bool
{
    line.starts_with('#') || line.starts_with("//") || line.starts_with("--")
}
