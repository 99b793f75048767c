//! Best-effort extraction of a JSON value from raw model output.
//!
//! Models wrap JSON in code fences, prepend "Here is the analysis:", or
//! trail off with commentary. [`parse_response`] tries, in order:
//!
//! 1. strip a code fence (with optional language tag),
//! 2. parse the remaining text directly,
//! 3. parse the first balanced `{...}` / `[...]` span that is valid JSON.
//!
//! If all three fail the caller gets a [`ParseError`] holding the raw text,
//! never an empty value.

use pipeline::ParseError;
use serde_json::Value;

const FENCE: &str = "```";

/// Extracts one JSON value from `raw`.
pub fn parse_response(raw: &str) -> Result<Value, ParseError> {
    let text = strip_code_fence(raw);

    let direct = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(value) = first_parsable_span(text) {
        return Ok(value);
    }

    Err(ParseError {
        raw: raw.to_owned(),
        reason: if text.is_empty() {
            "response is empty".to_owned()
        } else {
            direct.to_string()
        },
    })
}

/// Returns the body of a fenced code block, or the trimmed input when there
/// is no fence to strip.
///
/// A fence is recognised when the text starts with one, or when it appears
/// after leading prose. Text that already starts with `{` or `[` is left
/// alone so fences quoted inside JSON strings survive.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    let Some(start) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let mut body = &trimmed[start + FENCE.len()..];

    // Skip a language tag such as `json` on the opening line.
    let first_line_end = body.find('\n').unwrap_or(body.len());
    let tag = body[..first_line_end].trim();
    if is_language_tag(tag) {
        body = &body[first_line_end..];
    }

    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn is_language_tag(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}

/// Tries every opening bracket left to right and returns the first balanced
/// span that parses.
///
/// An opener that never closes, or whose span is not JSON, is skipped and the
/// scan resumes just after it, so a stray bracket in prose does not hide a
/// valid object further on.
fn first_parsable_span(text: &str) -> Option<Value> {
    let mut offset = 0;
    while let Some(rel) = text[offset..].find(|c: char| c == '{' || c == '[') {
        let start = offset + rel;
        if let Some(len) = balanced_end(&text[start..]) {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..start + len]) {
                return Some(value);
            }
        }
        offset = start + 1;
    }
    None
}

/// Length in bytes of the balanced span starting at `text[0]`, which must be
/// `{` or `[`. Brackets inside string literals are ignored.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
