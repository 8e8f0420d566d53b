//! Small text helpers shared by every track.

use std::borrow::Cow;

/// Escapes a string for use inside a double-quoted YAML scalar.
///
/// Backslashes and double quotes are escaped; line breaks and tabs become
/// their YAML escape sequences so the scalar stays on one line. Characters
/// YAML refuses or folds (other controls, NEL, the Unicode line and
/// paragraph separators, BOM, U+FFFE/U+FFFF) are written as escapes too.
/// Parsing `"<escaped>"` back yields the original string.
pub fn escape_text_field(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            '\u{feff}' | '\u{fffe}' | '\u{ffff}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Replaces the two-character sequence `\n` with a real line break.
///
/// Applied to body, answer, and explanation text before markdown-lite
/// conversion. Metadata fields are never decoded.
pub fn decode_literal_newlines(input: &str) -> Cow<'_, str> {
    if input.contains("\\n") {
        Cow::Owned(input.replace("\\n", "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Escapes text for an HTML text node. `$` is left untouched.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    html_escape::encode_text(input)
}

/// Converts ASCII digits to their full-width forms (`12` → `１２`).
pub fn full_width_digits(n: usize) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32('０' as u32 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}
