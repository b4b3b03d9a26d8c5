use serde::Serialize;

/// Turns one line of source into markup for display.
pub trait Highlighter {
    fn highlight(&self, line: &str, language: &str) -> String;
}

/// Escapes the line with ammonia so it can be embedded as-is.
///
/// No token colouring; a front-end highlighter can run over the escaped
/// text. Whitespace is escaped too, which keeps indentation intact.
#[derive(Debug, Default, Clone, Copy)]
pub struct EscapingHighlighter;

impl Highlighter for EscapingHighlighter {
    fn highlight(&self, line: &str, _language: &str) -> String {
        ammonia::clean_text(line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetLine {
    pub line_number: usize,
    pub content: String,
}

/// Splits `code` into 1-based numbered lines. Empty lines become a single
/// space so they keep their height when rendered.
pub fn render_snippet(code: &str, language: &str, highlighter: &dyn Highlighter) -> Vec<SnippetLine> {
    code.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let content = if line.is_empty() {
                " ".to_string()
            } else {
                highlighter.highlight(line, language)
            };
            SnippetLine {
                line_number: idx + 1,
                content,
            }
        })
        .collect()
}
