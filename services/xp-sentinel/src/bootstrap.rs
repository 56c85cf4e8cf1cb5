//! Embedded bootstrap object extraction
//!
//! Profile pages ship their data as a script assignment
//! (`options.bootstrap = {...};`). The object is cut out of the page with a
//! single forward scan that tracks brace depth and string-literal state, then
//! handed to `serde_json`. This is a lexical scan, not a JavaScript parser.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"options\.bootstrap\s*=\s*\{").expect("assignment pattern is a valid regex")
});

const UNDEFINED: &[u8] = b"undefined";

/// Lexical state of the scanner at a given byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    String,
    Escape,
}

impl Lexical {
    fn advance(self, byte: u8) -> Self {
        match (self, byte) {
            (Lexical::Code, b'"') => Lexical::String,
            (Lexical::Code, _) => Lexical::Code,
            (Lexical::String, b'\\') => Lexical::Escape,
            (Lexical::String, b'"') => Lexical::Code,
            (Lexical::String, _) => Lexical::String,
            (Lexical::Escape, _) => Lexical::String,
        }
    }
}

/// Extract and parse the bootstrap object from a profile page.
///
/// Returns `None` when the assignment is missing, the braces never balance,
/// or the text is not valid JSON. Only the first assignment is considered.
pub fn extract_embedded_object(document: &str) -> Option<Value> {
    let Some(assignment) = ASSIGNMENT.find(document) else {
        tracing::debug!("No bootstrap assignment in document");
        return None;
    };

    // The match ends right after the opening brace
    let open = assignment.end() - 1;
    let Some(span) = find_object_span(document, open) else {
        tracing::debug!("Bootstrap object at byte {} is not closed", open);
        return None;
    };

    let text = replace_undefined(&document[span]);
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Bootstrap object is not valid JSON: {}", e);
            None
        }
    }
}

/// Find the byte range of the object starting at `open`, closing brace included.
///
/// Braces inside double-quoted strings are ignored; escaped quotes do not end
/// a string.
pub fn find_object_span(document: &str, open: usize) -> Option<Range<usize>> {
    let bytes = document.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut state = Lexical::Code;
    for (index, &byte) in bytes.iter().enumerate().skip(open) {
        if state == Lexical::Code {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open..index + 1);
                    }
                }
                _ => {}
            }
        }
        state = state.advance(byte);
    }

    None
}

/// Rewrite bare `undefined` tokens to `null`, leaving string contents alone
fn replace_undefined(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut state = Lexical::Code;
    let mut copied = 0;
    let mut index = 0;

    while index < bytes.len() {
        let end = index + UNDEFINED.len();
        if state == Lexical::Code
            && bytes[index..].starts_with(UNDEFINED)
            && is_token_boundary(bytes, index, end)
        {
            out.push_str(&text[copied..index]);
            out.push_str("null");
            index = end;
            copied = end;
            continue;
        }
        state = state.advance(bytes[index]);
        index += 1;
    }

    out.push_str(&text[copied..]);
    out
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

fn is_token_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before = start.checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(end).copied();
    !before.is_some_and(is_identifier_byte) && !after.is_some_and(is_identifier_byte)
}
