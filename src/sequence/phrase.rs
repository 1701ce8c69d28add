//! Splitting phrases into literal text and parameter slots.
//!
//! Definitions declare parameters as `<name>`; invocations supply values as
//! double-quoted strings. Both forms reduce to the same key by replacing each
//! slot with [`SLOT`] while leaving every other character untouched.

use std::borrow::Cow;

use super::SequenceError;

/// Marker standing in for a parameter in a registry key.
pub(super) const SLOT: &str = "<>";

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Segment<'a> {
    Literal(&'a str),
    Slot(Cow<'a, str>),
}

/// Split a definition phrase or template on `<name>` placeholders.
pub(super) fn placeholder_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(['<', '>']) else {
            break;
        };
        if after.as_bytes()[close] == b'<' {
            // a stray '<' is literal text
            segments.push(Segment::Literal(&rest[..=open]));
            rest = after;
            continue;
        }
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        segments.push(Segment::Slot(Cow::Borrowed(&after[..close])));
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// Split invocation text on double-quoted values, unescaping `\"` and `\\`.
///
/// An unterminated quote is kept as literal text.
pub(super) fn quoted_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut chars = text.char_indices();
    while let Some((start, c)) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut value = String::new();
        let mut end = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, '"')) => value.push('"'),
                    Some((_, '\\')) => value.push('\\'),
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => value.push('\\'),
                },
                '"' => {
                    end = Some(i);
                    break;
                }
                other => value.push(other),
            }
        }
        let Some(end) = end else {
            break;
        };
        if start > literal_start {
            segments.push(Segment::Literal(&text[literal_start..start]));
        }
        segments.push(Segment::Slot(Cow::Owned(value)));
        literal_start = end + 1;
    }
    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    segments
}

/// Registry key for a list of segments.
pub(super) fn key_of(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text,
            Segment::Slot(_) => SLOT,
        })
        .collect()
}

/// Why invocation text could never reduce to the key of `phrase`, if so.
///
/// Invocations only produce slots from quoted values, so a phrase may not
/// contain quotes, and every `<` or `>` must belong to a `<name>` placeholder
/// whose name has no whitespace.
pub(super) fn unreachable_reason(phrase: &str) -> Option<&'static str> {
    if phrase.contains('"') {
        return Some("double quotes are reserved for parameter values");
    }
    placeholder_segments(phrase)
        .iter()
        .find_map(|segment| match segment {
            Segment::Literal(text) if text.contains(['<', '>']) => {
                Some("'<' and '>' may only enclose a placeholder name")
            }
            Segment::Slot(name) if name.contains(char::is_whitespace) => {
                Some("placeholder names may not contain whitespace")
            }
            _ => None,
        })
}

/// Parameter names declared by a definition phrase.
///
/// # Errors
///
/// Returns [`SequenceError::EmptyParameter`] if a placeholder is blank.
pub(super) fn declared_parameters(phrase: &str) -> Result<Vec<String>, SequenceError> {
    slot_values(&placeholder_segments(phrase), phrase)
}

/// Parameter values supplied by invocation text.
///
/// # Errors
///
/// Returns [`SequenceError::EmptyParameter`] if any value is empty or only
/// whitespace; no values are returned in that case.
pub fn parse_parameters(text: &str) -> Result<Vec<String>, SequenceError> {
    slot_values(&quoted_segments(text), text)
}

fn slot_values(segments: &[Segment<'_>], text: &str) -> Result<Vec<String>, SequenceError> {
    segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Slot(value) if value.trim().is_empty() => {
                Some(Err(SequenceError::EmptyParameter(text.to_owned())))
            }
            Segment::Slot(value) => Some(Ok(value.clone().into_owned())),
            Segment::Literal(_) => None,
        })
        .collect()
}
