use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::TypeDescriptor;
use crate::number::{parse_float, parse_int, to_json};

/// Casts a raw answer into the value the extension receives for `ty`.
///
/// Answers that already carry a typed value (a confirm prompt's boolean, a
/// multi-select's array) pass through untouched. A cast that cannot produce a
/// value yields `Value::Null`; the caller decides between default and reprompt.
pub fn filter(ty: &TypeDescriptor, raw: &Value) -> Value {
    let Value::String(input) = raw else {
        return raw.clone();
    };

    match ty {
        TypeDescriptor::Integer | TypeDescriptor::Natural | TypeDescriptor::IntegerRange { .. } => {
            number(parse_int(input))
        }
        TypeDescriptor::Double | TypeDescriptor::DoubleRange { .. } => number(parse_float(input)),
        TypeDescriptor::Money => number(parse_money(input)),
        TypeDescriptor::Char { length } => Value::String(input.chars().take(*length).collect()),
        TypeDescriptor::IntegerMultiRange { .. } => Value::Array(
            input
                .split_whitespace()
                .map(|part| number(parse_int(part)))
                .collect(),
        ),
        TypeDescriptor::Calendar | TypeDescriptor::DateTime => {
            parse_date(input).map_or(Value::Null, |d| {
                Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))
            })
        }
        TypeDescriptor::Checkbox => match input.trim().to_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Value::Bool(true),
            "n" | "no" | "false" | "0" => Value::Bool(false),
            _ => Value::Null,
        },
        _ => raw.clone(),
    }
}

fn number(parsed: Option<f64>) -> Value {
    parsed.map_or(Value::Null, to_json)
}

// "1.234,56" reads as 1234.56: once a comma is present it is the decimal mark
fn parse_money(input: &str) -> Option<f64> {
    if input.contains(',') {
        let normalized = input.replace('.', "").replacen(',', ".", 1);
        parse_float(&normalized)
    } else {
        parse_float(input)
    }
}

pub(crate) fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multi_range_round_trip() {
        let ty = TypeDescriptor::IntegerMultiRange { from: 0, to: 100 };
        let filtered = filter(&ty, &json!("10 20"));
        assert_eq!(filtered, json!([10, 20]));

        let restringified = filtered
            .as_array()
            .expect("filtered value should be an array")
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(restringified, "10 20");
    }

    #[test]
    fn test_money_uses_comma_as_decimal_separator() {
        assert_eq!(filter(&TypeDescriptor::Money, &json!("12,50")), json!(12.5));
        assert_eq!(
            filter(&TypeDescriptor::Money, &json!("1.234,56")),
            json!(1234.56)
        );
        assert_eq!(filter(&TypeDescriptor::Money, &json!("7.25")), json!(7.25));
        assert_eq!(filter(&TypeDescriptor::Money, &json!("R$")), Value::Null);
    }

    #[test]
    fn test_char_truncates() {
        let ty = TypeDescriptor::Char { length: 3 };
        assert_eq!(filter(&ty, &json!("abcdef")), json!("abc"));
        assert_eq!(filter(&ty, &json!("ãéí!")), json!("ãéí"));
    }

    #[test]
    fn test_failed_casts_yield_null() {
        assert_eq!(filter(&TypeDescriptor::Integer, &json!("twelve")), Value::Null);
        assert_eq!(filter(&TypeDescriptor::Double, &json!("")), Value::Null);
        assert_eq!(filter(&TypeDescriptor::Calendar, &json!("someday")), Value::Null);
    }

    #[test]
    fn test_calendar_normalizes_to_iso() {
        assert_eq!(
            filter(&TypeDescriptor::Calendar, &json!("2017-03-01")),
            json!("2017-03-01T00:00:00.000Z")
        );
        assert_eq!(
            filter(&TypeDescriptor::Calendar, &json!("03/01/2017")),
            json!("2017-03-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_typed_answers_pass_through() {
        assert_eq!(filter(&TypeDescriptor::Checkbox, &json!(true)), json!(true));
        assert_eq!(filter(&TypeDescriptor::Checkbox, &json!("no")), json!(false));
        assert_eq!(filter(&TypeDescriptor::Integer, &json!(3)), json!(3));
        assert_eq!(filter(&TypeDescriptor::String, &json!(" x ")), json!(" x "));
    }
}
