//! Markup produced by JSX inside extensions
//!
//! `<div className="box">Hi</div>` compiles to `render("div", {className: "box"}, "Hi")`,
//! which ends up here and renders `<div class="box">Hi</div>`. Text children
//! are emitted as they are so nested elements compose.

use heck::ToKebabCase;
use rung_types::format_number;
use serde_json::{Map, Value};

/// Elements rendered as `<tag />`, whatever their children
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tags that could execute or restyle the host page
const INERT_REPLACED: &[&str] = &["script", "style"];

/// Renders one element. A `None` tag is a fragment: only its children are rendered.
pub fn compile_markup(tag: Option<&str>, props: &Map<String, Value>, children: &[Value]) -> String {
    let mut inner = String::new();
    for child in children {
        render_child(&mut inner, child);
    }

    let Some(tag) = tag else {
        return inner;
    };
    let tag = if INERT_REPLACED.contains(&tag) {
        "span"
    } else {
        tag
    };

    let attributes = compile_props(props);
    if VOID_ELEMENTS.contains(&tag) {
        format!("<{tag}{attributes} />")
    } else {
        format!("<{tag}{attributes}>{inner}</{tag}>")
    }
}

fn render_child(out: &mut String, child: &Value) {
    match child {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Array(items) => items.iter().for_each(|item| render_child(out, item)),
        other => out.push_str(&to_literal(other)),
    }
}

fn compile_props(props: &Map<String, Value>) -> String {
    props
        .iter()
        .map(|(key, value)| {
            let key = if key == "className" {
                "class".to_string()
            } else {
                key.to_kebab_case()
            };
            let value = match value {
                Value::Object(style) => quoted(&compile_css(style)),
                other => to_literal(other),
            };
            format!(" {key}={value}")
        })
        .collect()
}

fn compile_css(style: &Map<String, Value>) -> String {
    style
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => to_literal(other),
            };
            format!("{}:{value}", key.to_kebab_case())
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn quoted(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

// JSON text with numbers printed as JS prints them
fn to_literal(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        other => other.to_string(),
    }
}
