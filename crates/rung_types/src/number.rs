//! Lenient number parsing with the same prefix rules extension authors know
//! from `parseInt(s, 10)` and `parseFloat(s)`: leading whitespace is skipped,
//! the longest numeric prefix wins and trailing garbage is ignored.

use serde_json::{Number, Value};

/// Parses the leading base-10 integer of `input`.
pub fn parse_int(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let (negative, rest) = split_sign(s);
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: f64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses the leading decimal literal of `input`, `Infinity` included.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let (negative, rest) = split_sign(s);
    if rest.starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let bytes = rest.as_bytes();
    let mut end = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    let mut mantissa_digits = end;
    if bytes.get(end) == Some(&b'.') {
        let fraction = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        mantissa_digits += fraction;
        end += 1 + fraction;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    let literal = rest[..end].trim_end_matches('.');
    let magnitude: f64 = literal.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

/// Formats a number the way it prints in JS: integral values carry no `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.abs() >= 1e21 {
        format!("{n:e}").replacen('e', "e+", 1)
    } else {
        // adding zero turns -0 into 0
        format!("{}", n + 0.0)
    }
}

/// JSON form of a parsed number; non-finite results become `null`.
pub(crate) fn to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Numeric view of a JSON value, accepting numeric strings like `Number(s)`.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}
