use camino::Utf8Path;
use log::debug;
use rung_compiler::{CompileError, compile, compile_modules_from_source};
use rung_config::LocaleStrings;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Result, isolate, run_in_sandbox};

/// What an autocomplete handler receives
#[derive(Debug, Serialize)]
struct AutocompleteContext {
    params: Map<String, Value>,
    input: String,
}

/// Suggestions for `param` from `<dir>/autocomplete/<param>.js`, or `None`
/// when the extension has no such source.
///
/// The source's export is invoked like an extension handler with
/// `{params, input}`, where `params` holds the answers given so far. Local
/// modules resolve relative to the `autocomplete` folder.
///
/// # Errors
///
/// Fails when the source does not compile or the handler fails.
pub async fn complete(
    name: &str,
    dir: &Utf8Path,
    param: &str,
    params: &Map<String, Value>,
    input: &str,
    strings: LocaleStrings,
) -> Result<Option<Vec<String>>> {
    let folder = dir.join("autocomplete");
    let path = folder.join(format!("{param}.js"));
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(CompileError::Io { path, source }.into()),
    };

    let source = compile(&raw)?;
    let modules = compile_modules_from_source(&source, &folder).await?;
    debug!("Autocompleting {param} of {name} with {input:?}");

    let sandbox_name = format!("{name}/autocomplete/{param}");
    let context = AutocompleteContext {
        params: params.clone(),
        input: input.to_string(),
    };
    let result = isolate::run_isolated(move || async move {
        let mut module = run_in_sandbox(&sandbox_name, &source, strings, modules)?;
        module.invoke(&context).await
    })
    .await?;

    Ok(Some(suggestions(result.alerts)))
}

fn suggestions(value: Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => vec![],
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suggestions() {
        assert_eq!(suggestions(json!(["a", 1])), vec!["a", "1"]);
        assert_eq!(suggestions(json!("only")), vec!["only"]);
        assert!(suggestions(Value::Null).is_empty());
    }
}
