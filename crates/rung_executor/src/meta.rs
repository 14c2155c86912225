//! Translated metadata of an extension across every locale it ships

use camino::Utf8Path;
use futures::future::try_join_all;
use log::debug;
use rung_compiler::CompiledModule;
use rung_config::LocaleStrings;
use rung_config::locale::available_locales;
use serde_json::{Map, Value};

use crate::{Result, get_properties};

/// Locale key of the run without translations
const DEFAULT_LOCALE: &str = "default";

/// Keeps the translatable fields of `config`, each keyed by `locale`:
/// `{title: {locale: …}, description: {…}, preview: {…}, params: {name: {…, description: {…}}}}`.
pub fn project_properties(locale: &str, config: &Value) -> Value {
    let localized = |value: Option<&Value>| {
        let mut map = Map::new();
        if let Some(value) = value.filter(|v| !v.is_null()) {
            map.insert(locale.to_string(), value.clone());
        }
        Value::Object(map)
    };

    let params = config
        .get("params")
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .map(|(name, param)| {
                    let mut param = param.as_object().cloned().unwrap_or_default();
                    let description = localized(param.get("description"));
                    param.insert("description".to_string(), description);
                    (name.clone(), Value::Object(param))
                })
                .collect::<Map<_, _>>()
        })
        .unwrap_or_default();

    let mut projection = Map::new();
    for field in ["title", "description", "preview"] {
        projection.insert(field.to_string(), localized(config.get(field)));
    }
    projection.insert("params".to_string(), Value::Object(params));
    Value::Object(projection)
}

/// Merges `other` into `target`: objects recursively, anything else replaced
pub fn deep_merge(target: &mut Value, other: Value) {
    match (target, other) {
        (Value::Object(target), Value::Object(other)) => {
            for (key, value) in other {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, other) => *target = other,
    }
}

/// Runs [`get_properties`] once without translations and once per
/// `locales/*.json` in `dir`, concurrently, and merges the projections.
///
/// # Errors
///
/// Fails when the locales folder cannot be listed or any run fails.
pub async fn precompile_locales(
    name: &str,
    dir: &Utf8Path,
    compiled_source: &str,
    modules: Vec<CompiledModule>,
) -> Result<Value> {
    let mut tables = vec![(DEFAULT_LOCALE.to_string(), LocaleStrings::default())];
    for locale in available_locales(dir).await? {
        let strings = LocaleStrings::load(dir, &locale).await;
        tables.push((locale, strings));
    }
    debug!("Precompiling {name} in {} locales", tables.len());

    let runs = tables.into_iter().map(|(locale, strings)| {
        let modules = modules.clone();
        async move {
            let config = get_properties(
                &format!("precompile-{locale}"),
                compiled_source,
                strings,
                modules,
            )
            .await?;
            Ok::<_, crate::ExecutorError>(project_properties(&locale, &config))
        }
    });

    let mut meta = Value::Object(Map::new());
    for projection in try_join_all(runs).await? {
        deep_merge(&mut meta, projection);
    }
    Ok(meta)
}
