use std::sync::LazyLock;

use regex::{Captures, Regex};
use rung_config::LocaleStrings;
use rung_types::format_number;
use serde_json::Value;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("invalid placeholder pattern"));

/// Looks `text` up in the locale table and fills its `{{ name }}` placeholders
/// from `vars`. Untranslated text is used as is and placeholders without a
/// matching variable are left in place.
pub fn translate(strings: &LocaleStrings, text: &str, vars: Option<&Value>) -> String {
    let translated = strings.get(text).unwrap_or(text);
    let Some(Value::Object(vars)) = vars else {
        return translated.to_string();
    };

    PLACEHOLDER
        .replace_all(translated, |caps: &Captures<'_>| match vars.get(&caps[1]) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.as_f64().map_or_else(|| n.to_string(), format_number),
            Some(Value::Null) | None => caps[0].to_string(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings() -> LocaleStrings {
        [("Hello {{name}}".to_string(), "Olá {{ name }}!".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_translates_and_interpolates() {
        let text = translate(&strings(), "Hello {{name}}", Some(&json!({"name": "Ana"})));
        assert_eq!(text, "Olá Ana!");
    }

    #[test]
    fn test_missing_translation_is_identity() {
        assert_eq!(translate(&strings(), "Welcome", None), "Welcome");
        assert_eq!(
            translate(&LocaleStrings::default(), "{{count}} items", Some(&json!({"count": 3}))),
            "3 items"
        );
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let text = translate(&strings(), "Hello {{name}}", Some(&json!({"other": 1})));
        assert_eq!(text, "Olá {{ name }}!");
    }
}
