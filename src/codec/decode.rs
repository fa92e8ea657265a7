//! Flat JSON decoding into raw string pairs.

use crate::error::DecodeError;
use std::collections::HashMap;

/// Decoded object: key -> raw value text with one layer of quotes removed.
pub type FlatMap = HashMap<String, String>;

/// A bare `null` decodes to this literal text, not to a missing entry.
pub const NULL_SENTINEL: &str = "null";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Outside,
    InString,
    AfterEscape,
}

/// Tracks whether the scan position is inside a string literal.
struct Scanner {
    state: ScanState,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: ScanState::Outside,
        }
    }

    /// Consume `c`; true when `c` is outside every string literal and may be structural.
    fn advance(&mut self, c: char) -> bool {
        let (next, structural) = match (self.state, c) {
            (ScanState::AfterEscape, _) => (ScanState::InString, false),
            (ScanState::InString, '\\') => (ScanState::AfterEscape, false),
            (ScanState::InString, '"') => (ScanState::Outside, false),
            (ScanState::InString, _) => (ScanState::InString, false),
            (ScanState::Outside, '"') => (ScanState::InString, false),
            (ScanState::Outside, _) => (ScanState::Outside, true),
        };
        self.state = next;
        structural
    }

    fn in_string(&self) -> bool {
        self.state != ScanState::Outside
    }
}

/// Decode `{...}` into a [`FlatMap`].
///
/// Blank input and the literal `null` yield an empty map. Pairs without a
/// colon are dropped. Missing braces, unterminated strings and nested
/// objects or arrays are rejected.
pub fn decode(text: &str) -> Result<FlatMap, DecodeError> {
    let trimmed = text.trim();
    let mut map = FlatMap::new();
    if trimmed.is_empty() || trimmed == NULL_SENTINEL {
        return Ok(map);
    }
    let body = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or(DecodeError::NotAnObject)?;
    for pair in split_pairs(body)? {
        if let Some((key, value)) = split_key_value(pair) {
            map.insert(unquote(key), unquote(value));
        }
    }
    Ok(map)
}

/// Split the object body on top-level commas. Offsets in errors count from the opening brace.
fn split_pairs(body: &str) -> Result<Vec<&str>, DecodeError> {
    let mut pairs = Vec::new();
    let mut scanner = Scanner::new();
    let mut start = 0;
    let mut string_start = 0;
    for (i, c) in body.char_indices() {
        let was_in_string = scanner.in_string();
        if !scanner.advance(c) {
            if !was_in_string {
                string_start = i;
            }
            continue;
        }
        match c {
            ',' => {
                pairs.push(&body[start..i]);
                start = i + 1;
            }
            '{' | '}' | '[' | ']' => {
                return Err(DecodeError::UnexpectedStructure { found: c, at: i + 1 });
            }
            _ => {}
        }
    }
    if scanner.in_string() {
        return Err(DecodeError::UnterminatedString(string_start + 1));
    }
    pairs.push(&body[start..]);
    Ok(pairs.into_iter().filter(|p| !p.trim().is_empty()).collect())
}

/// Split on the first colon outside a string literal.
fn split_key_value(pair: &str) -> Option<(&str, &str)> {
    let mut scanner = Scanner::new();
    let (i, _) = pair
        .char_indices()
        .find(|&(_, c)| scanner.advance(c) && c == ':')?;
    Some((pair[..i].trim(), pair[i + 1..].trim()))
}

/// Strip one layer of surrounding quotes and resolve escapes inside them.
/// Unquoted text (numbers, booleans, `null`) is returned as written.
fn unquote(text: &str) -> String {
    match text.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) if text.len() >= 2 => unescape(inner),
        _ => text.to_string(),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = match code_unit(&hex) {
                    Some(high @ 0xD800..=0xDBFF) => {
                        let mut ahead = chars.clone();
                        let low = match (ahead.next(), ahead.next()) {
                            (Some('\\'), Some('u')) => code_unit(&ahead.by_ref().take(4).collect::<String>()),
                            _ => None,
                        };
                        match low {
                            Some(low @ 0xDC00..=0xDFFF) => {
                                chars = ahead;
                                char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
                            }
                            _ => None,
                        }
                    }
                    Some(unit) => char::from_u32(unit),
                    None => None,
                };
                match decoded {
                    Some(c) => out.push(c),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Four hex digits as one UTF-16 code unit.
fn code_unit(hex: &str) -> Option<u32> {
    if hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}
