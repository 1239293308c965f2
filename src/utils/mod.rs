//! Common utilities and helper functions
//!
//! Text cleanup shared by the enricher, and the Turtle escaping used by the
//! renderer.

pub mod error;
pub mod retry;

use std::fmt::Write;

/// Remove line breaks from free text
pub fn clean_text(text: &str) -> String {
    text.replace('\n', "")
}

/// Escape a value for use inside a double-quoted Turtle string literal
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for use inside `<...>` as a Turtle IRI reference
///
/// Characters forbidden in `IRIREF` are percent-encoded.
pub fn escape_iri(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') {
            percent_encode_char(c, &mut out);
        } else {
            out.push(c);
        }
    }
    out
}

/// Encode a term as the local part of a prefixed name (`:local`)
///
/// Letters, digits and `_` pass through; everything else is percent-encoded
/// byte by byte. A leading `-` is encoded as well.
pub fn local_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        if c.is_alphanumeric() || c == '_' || (c == '-' && i > 0) {
            out.push(c);
        } else {
            percent_encode_char(c, &mut out);
        }
    }
    out
}

fn percent_encode_char(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        let _ = write!(out, "%{byte:02X}");
    }
}
