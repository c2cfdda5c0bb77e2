//! Lenient parser for `{ key: value, ... }` attribute literals
//!
//! The producer of these fragments is usually an AI model, so the policy is
//! deliberate leniency: a malformed block yields an empty map and an
//! unparseable pair is dropped. Nothing in here returns an error.

use super::ast::{AttrValue, AttributeMap};
use super::lexer::{lex, AttrToken, Span};

/// Parse an attribute literal into a typed map.
///
/// The fragment must be empty/whitespace or delimited by a single leading
/// `{` and trailing `}`; anything else yields an empty map. Commas inside
/// quoted spans do not split pairs, and each pair splits on its first colon
/// only, so bare values may contain colons (URLs, time strings).
pub fn parse_attributes(fragment: &str) -> AttributeMap {
    let mut map = AttributeMap::new();
    let trimmed = fragment.trim();
    if trimmed.is_empty() {
        return map;
    }
    let Some(interior) = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return map;
    };

    let tokens: Vec<(AttrToken, Span)> = lex(interior).collect();
    let mut start = 0;
    for i in 0..=tokens.len() {
        let at_boundary = i == tokens.len() || matches!(tokens[i].0, AttrToken::Comma);
        if at_boundary {
            parse_pair(interior, &tokens[start..i], &mut map);
            start = i + 1;
        }
    }
    map
}

/// Parse one comma-delimited `key: value` pair into the map, or drop it.
fn parse_pair(interior: &str, tokens: &[(AttrToken, Span)], map: &mut AttributeMap) {
    let Some(colon) = tokens
        .iter()
        .position(|(t, _)| matches!(t, AttrToken::Colon))
    else {
        return;
    };
    if colon == 0 || colon + 1 >= tokens.len() {
        return;
    }

    let key_span = tokens[0].1.start..tokens[colon - 1].1.end;
    let key = strip_quotes(interior[key_span].trim());
    if key.is_empty() {
        return;
    }

    // Everything after the first colon is the value, reassembled from the
    // source slice so embedded colons survive.
    let value_span = tokens[colon + 1].1.start..tokens[tokens.len() - 1].1.end;
    map.insert(key.to_string(), coerce_scalar(&interior[value_span]));
}

/// Coerce raw value text into a typed scalar.
///
/// Order: quoted string (unescaped) -> number -> boolean -> raw string.
pub(crate) fn coerce_scalar(raw: &str) -> AttrValue {
    let t = raw.trim();
    if is_quoted(t) {
        return AttrValue::String(unescape(&t[1..t.len() - 1]));
    }
    if let Ok(n) = t.parse::<f64>() {
        if n.is_finite() {
            return AttrValue::Number(n);
        }
    }
    match t {
        "true" => AttrValue::Bool(true),
        "false" => AttrValue::Bool(false),
        _ => AttrValue::String(t.to_string()),
    }
}

fn is_quoted(t: &str) -> bool {
    t.len() >= 2
        && ((t.starts_with('"') && t.ends_with('"')) || (t.starts_with('\'') && t.ends_with('\'')))
}

/// Strip one layer of matching quotes, without unescaping.
pub(crate) fn strip_quotes(t: &str) -> &str {
    if is_quoted(t) {
        &t[1..t.len() - 1]
    } else {
        t
    }
}

/// Resolve backslash escapes inside a quoted span. `\n` becomes a real
/// newline; an unknown escape keeps the escaped character.
pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
