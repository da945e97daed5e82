//! HTML special-character escaping for text content.
//!
//! Escaping happens once, at normalization time; the renderer emits text
//! nodes verbatim and relies on this step having already run.

/// Escape the five HTML special characters (`& < > " '`).
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}
