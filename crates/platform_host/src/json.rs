//! Minimal JSON literal encoding for values returned across the content boundary.
//!
//! The boundary only marshals strings and primitives, so structured results (directory listings,
//! stat records) are handed back as JSON text built here rather than through a general serializer.

use std::fmt::Write as _;

/// Encodes `value` as a double-quoted JSON string literal.
///
/// `"`, `\`, `/` and the backspace, form-feed, newline, carriage-return and tab controls use their
/// two-character escapes. Any other code point below `0x20` becomes a lowercase `\u00xx` escape.
/// Everything else is copied through untouched.
pub fn escape_json_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Encodes a sequence of strings as a JSON array literal, escaping each item independently.
pub fn json_string_array<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("[");
    for (idx, item) in items.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_json_string(item.as_ref()));
    }
    out.push(']');
    out
}
