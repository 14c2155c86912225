use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::TypeDescriptor;
use crate::filter::parse_date;
use crate::number::as_number;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("invalid hex color pattern")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("invalid email pattern")
});

/// Whether an (already filtered) value is acceptable for `ty`.
///
/// Types without a rule accept any value.
pub fn validate(ty: &TypeDescriptor, value: &Value) -> bool {
    match ty {
        TypeDescriptor::Integer | TypeDescriptor::Double | TypeDescriptor::Money => {
            finite(value).is_some()
        }
        TypeDescriptor::Natural => finite(value).is_some_and(|n| n >= 0.0),
        TypeDescriptor::IntegerRange { from, to } => {
            finite(value).is_some_and(|n| (*from as f64..=*to as f64).contains(&n))
        }
        TypeDescriptor::DoubleRange { from, to } => {
            finite(value).is_some_and(|n| (*from..=*to).contains(&n))
        }
        TypeDescriptor::IntegerMultiRange { from, to } => {
            let Some([left, right]) = value.as_array().map(Vec::as_slice).and_then(|s| {
                match s {
                    [l, r] => Some([finite(l)?, finite(r)?]),
                    _ => None,
                }
            }) else {
                return false;
            };
            let bounds = *from as f64..=*to as f64;
            bounds.contains(&left) && bounds.contains(&right) && left <= right
        }
        TypeDescriptor::Char { length } => value
            .as_str()
            .is_some_and(|s| s.chars().count() <= *length),
        TypeDescriptor::Color => value.as_str().is_some_and(|s| HEX_COLOR.is_match(s)),
        TypeDescriptor::Email => value.as_str().is_some_and(|s| EMAIL.is_match(s)),
        TypeDescriptor::Url => value.as_str().is_some_and(is_url),
        TypeDescriptor::Checkbox => value.is_boolean(),
        TypeDescriptor::Calendar | TypeDescriptor::DateTime => {
            value.as_str().and_then(parse_date).is_some()
        }
        TypeDescriptor::OneOf { values } => values.contains(value),
        TypeDescriptor::SelectBox { values } => {
            value.as_str().is_some_and(|key| values.contains_key(key))
        }
        TypeDescriptor::MultiSelectBox { values } => value.as_array().is_some_and(|keys| {
            keys.iter()
                .all(|k| k.as_str().is_some_and(|key| values.contains_key(key)))
        }),
        TypeDescriptor::String
        | TypeDescriptor::AutoComplete
        | TypeDescriptor::Location
        | TypeDescriptor::File
        | TypeDescriptor::Unknown(_) => true,
    }
}

fn finite(value: &Value) -> Option<f64> {
    as_number(value).filter(|n| n.is_finite())
}

// Scheme-less input like "example.com/path" is accepted as http
fn is_url(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() || input.contains(char::is_whitespace) {
        return false;
    }
    let parsed = url::Url::parse(input).or_else(|_| url::Url::parse(&format!("http://{input}")));
    parsed.is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https" | "ftp")
            && url.host_str().is_some_and(|host| host.contains('.') || host == "localhost")
    })
}
