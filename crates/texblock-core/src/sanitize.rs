//! Payload sanitization ahead of structural parsing.
//!
//! Block payloads arrive from browser-side editors and routinely carry
//! invisible Unicode (zero-width spaces, BOM, bidi marks) and stray control
//! bytes that either break JSON parsing or hide content from review. The
//! cleaners here strip that noise *before* the tree walk sees the data.
//!
//! Notes:
//! - `sanitize_json` is idempotent for inputs it accepts: the output is a
//!   canonical `serde_json` re-serialization containing none of the stripped
//!   character classes.
//! - Formatting marks that double as spacing (NBSP, figure/en/em/thin/hair
//!   spaces) are replaced with a normal space; marks with no visual width
//!   (ZWSP, word joiner, BOM, bidi controls) are removed outright.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Backslash-u escape sequences for the formatting-mark denylist
/// (U+200B–U+200F, U+2028–U+202F, U+205F–U+206F, U+FEFF).
static ESCAPED_MARKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\\u(200[b-f]|202[89a-f]|205f|206[0-9a-f]|feff)").expect("static pattern")
});

/// Malformed escape-brace sequences such as `\u{...}` or `\X{...}`.
///
/// The leading `(^|[^\\])` stands in for a negative lookbehind: a sequence
/// whose backslash is itself escaped is left alone.
static ESCAPE_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\\])\\[A-Za-z]\{[^}]*\}").expect("static pattern"));

/// Unescaped `\n` / `\r` / `\t` escape sequences (the two characters are
/// removed, not unescaped).
static NRT_ESCAPES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\\])\\[nrt]").expect("static pattern"));

fn in_formatting_ranges(c: char) -> bool {
    matches!(c,
        '\u{200B}'..='\u{200F}'
        | '\u{2028}'..='\u{202F}'
        | '\u{205F}'..='\u{206F}'
        | '\u{FEFF}')
}

fn is_invisible_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2007}' | '\u{2009}' | '\u{200A}'
    )
}

fn is_stripped_control(c: char) -> bool {
    (c < '\u{20}' && c != '\t' && c != '\n' && c != '\r') || c == '\u{7F}'
}

/// Replace spacing-class marks, drop control bytes (except tab/newline/CR)
/// and drop zero-width formatting marks, in one pass.
fn clean_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if is_invisible_space(c) {
            out.push(' ');
        } else if is_stripped_control(c) || in_formatting_ranges(c) {
            // dropped
        } else {
            out.push(c);
        }
    }
    out
}

/// Apply a capture-preserving removal repeatedly.
///
/// Adjacent matches share the guard character consumed by `(^|[^\\])`, so a
/// single `replace_all` pass can leave every other occurrence behind.
fn replace_to_fixed_point(re: &Regex, input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let next = re.replace_all(&current, "$1").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn parse_and_reserialize(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string(&value).ok()
}

/// Sanitize a textual JSON payload.
///
/// Returns the canonical re-serialization of the cleaned payload, or `None`
/// when no parseable structure survives (callers must treat this as "no
/// usable input").
pub fn sanitize_json(raw: &str) -> Option<String> {
    // Escaped forms first, so a raw `\u200b` sequence never reaches the parser.
    let cleaned = ESCAPED_MARKS.replace_all(raw, "").into_owned();
    let cleaned = clean_chars(&cleaned);
    let cleaned = replace_to_fixed_point(&ESCAPE_BRACES, &cleaned);

    if let Some(out) = parse_and_reserialize(&cleaned) {
        return Some(out);
    }

    // Aggressive fallback: printable ASCII plus tab/newline/CR only.
    let ascii: String = cleaned
        .chars()
        .filter(|&c| ('\u{20}'..='\u{7E}').contains(&c) || c == '\t' || c == '\n' || c == '\r')
        .collect();
    let ascii = ESCAPED_MARKS.replace_all(&ascii, "").into_owned();

    parse_and_reserialize(&ascii)
}

/// Sanitize an already-structured payload by round-tripping it through its
/// serialized form.
pub fn sanitize_json_value(value: &Value) -> Option<String> {
    let serialized = serde_json::to_string(value).ok()?;
    sanitize_json(&serialized)
}

/// Narrow cleaner for block bodies whose schema opts in.
///
/// Removes all control bytes (including tab/newline/CR) and deletes
/// unescaped `\n` / `\r` / `\t` escape sequences from the serialized form.
pub fn strip_control_characters(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|&c| !(c < '\u{20}' || c == '\u{7F}'))
        .collect();
    replace_to_fixed_point(&NRT_ESCAPES, &cleaned)
}
