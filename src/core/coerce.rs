//! Purpose: Interpret any `Node` as a bool, integer, float, string or timestamp.
//! Exports: `boolean`, `int64`, `uint64`, `float64`, `text`, `timestamp`, `parse_int_literal`.
//! Role: Single coercion engine behind every typed getter in the api layer.
//! Invariants: Coercion never fails; unparseable input degrades to the zero value.
//! Invariants: Floating point sources truncate toward zero when read as integers.
//! Invariants: `text(Null)` is the empty string, never "null".

use std::borrow::Cow;
use std::num::IntErrorKind;

use time::OffsetDateTime;

use super::node::Node;
use super::timeparse::{ZERO_TIME, parse_time};

/// True iff the integer coercion is non-zero.
pub fn boolean(node: &Node) -> bool {
    int64(node) != 0
}

pub fn int64(node: &Node) -> i64 {
    match node {
        Node::Null => 0,
        Node::Bool(v) => i64::from(*v),
        Node::Int(v) => *v,
        Node::Uint(v) => *v as i64,
        Node::Float(v) => *v as i64,
        Node::String(s) => int64_from_str(s),
        Node::Bytes(b) => int64_from_str(&String::from_utf8_lossy(b)),
        Node::Array(_) | Node::Object(_) | Node::Text(_) | Node::Error(_) => {
            int64_from_str(&text(node))
        }
    }
}

/// Reinterprets the signed coercion, so `-1` reads as `u64::MAX`.
pub fn uint64(node: &Node) -> u64 {
    int64(node) as u64
}

pub fn float64(node: &Node) -> f64 {
    match node {
        Node::Null => 0.0,
        Node::Int(v) => *v as f64,
        Node::Uint(v) => *v as f64,
        Node::Float(v) => *v,
        Node::String(s) => s.parse().unwrap_or(0.0),
        Node::Bytes(b) => String::from_utf8_lossy(b).parse().unwrap_or(0.0),
        // Booleans have no textual number form: `true` parses as 0.0 here.
        Node::Bool(_) | Node::Array(_) | Node::Object(_) | Node::Text(_) | Node::Error(_) => {
            text(node).parse().unwrap_or(0.0)
        }
    }
}

pub fn text(node: &Node) -> Cow<'_, str> {
    match node {
        Node::Null => Cow::Borrowed(""),
        Node::String(s) => Cow::Borrowed(s.as_str()),
        Node::Bytes(b) => String::from_utf8_lossy(b),
        Node::Int(v) => Cow::Owned(v.to_string()),
        Node::Uint(v) => Cow::Owned(v.to_string()),
        Node::Float(v) => Cow::Owned(format_float(*v)),
        Node::Text(v) => Cow::Owned(v.to_string()),
        Node::Error(v) => Cow::Owned(v.to_string()),
        Node::Bool(_) | Node::Array(_) | Node::Object(_) => {
            Cow::Owned(serde_json::to_string(node).unwrap_or_default())
        }
    }
}

/// Numbers are Unix seconds; everything else goes through `parse_time` and an
/// unrecognized format yields `ZERO_TIME`.
pub fn timestamp(node: &Node) -> OffsetDateTime {
    if node.is_num() {
        return OffsetDateTime::from_unix_timestamp(int64(node)).unwrap_or(ZERO_TIME);
    }
    parse_time(&text(node)).unwrap_or(ZERO_TIME)
}

/// Shortest decimal form with no exponent and no trailing `.0`.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        v.to_string()
    }
}

fn int64_from_str(s: &str) -> i64 {
    if s.contains('.') {
        let v: f64 = s.parse().unwrap_or(0.0);
        return v as i64;
    }
    parse_int_literal(s).unwrap_or(0)
}

/// Parses a decimal or base-prefixed (`0x`, `0o`, `0b`, leading `0`) integer
/// with an optional sign and `_` digit separators. Out-of-range values
/// saturate; malformed input is `None`.
pub fn parse_int_literal(s: &str) -> Option<i64> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits, prefixed) = split_radix(body);
    let digits = strip_separators(digits, prefixed)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = match u64::from_str_radix(&digits, radix) {
        Ok(v) => v,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => return None,
    };
    Some(if negative {
        if magnitude > i64::MAX as u64 {
            i64::MIN
        } else {
            -(magnitude as i64)
        }
    } else {
        i64::try_from(magnitude).unwrap_or(i64::MAX)
    })
}

fn split_radix(body: &str) -> (u32, &str, bool) {
    let lower = body.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &body[2..], true),
        Some("0o") => (8, &body[2..], true),
        Some("0b") => (2, &body[2..], true),
        _ if body.len() > 1 && body.starts_with('0') => (8, &body[1..], true),
        _ => (10, body, false),
    }
}

/// Drops `_` separators, which must sit between digits (or directly after a
/// base prefix).
fn strip_separators(digits: &str, prefixed: bool) -> Option<String> {
    if !digits.contains('_') {
        return Some(digits.to_string());
    }
    let mut out = String::with_capacity(digits.len());
    let mut prev_digit = prefixed;
    for c in digits.chars() {
        if c == '_' {
            if !prev_digit {
                return None;
            }
            prev_digit = false;
        } else {
            out.push(c);
            prev_digit = true;
        }
    }
    if !prev_digit {
        return None;
    }
    Some(out)
}
