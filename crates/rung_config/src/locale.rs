use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConfigError, Result};

const DEFAULT_LOCALE: &str = "en";

/// Locale forced through `$RUNG_LOCALE`, otherwise the one the OS reports.
pub fn detect_locale() -> String {
    if let Some(forced) = env_non_empty("RUNG_LOCALE") {
        return forced;
    }

    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(env_non_empty)
        .find_map(|raw| normalize_locale(&raw))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `pt_BR.UTF-8` and `pt-BR` both become `pt_BR`; `C` and `POSIX` carry no locale.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('-', "_"))
}

/// Translated strings for one locale, keyed by the literal source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleStrings(HashMap<String, String>);

impl LocaleStrings {
    pub fn get(&self, text: &str) -> Option<&str> {
        self.0.get(text).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a table from a parsed locale file, dropping non-string entries.
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        map.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    /// Strings for `locale` from `<dir>/locales`, falling back to the
    /// language-only file (`pt` for `pt_BR`) and then to an empty table.
    pub async fn load(dir: &Utf8Path, locale: &str) -> Self {
        let mut candidates = vec![locale.to_string()];
        if let Some((language, _)) = locale.split_once('_') {
            candidates.push(language.to_string());
        }

        for candidate in candidates {
            let path = locale_file(dir, &candidate);
            match read_locale_file(&path).await {
                Ok(Some(strings)) => {
                    debug!("Loaded {} strings from {path}", strings.0.len());
                    return strings;
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring locale file: {e}"),
            }
        }
        Self::default()
    }
}

impl FromIterator<(String, String)> for LocaleStrings {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn locale_file(dir: &Utf8Path, locale: &str) -> Utf8PathBuf {
    dir.join("locales").join(format!("{locale}.json"))
}

async fn read_locale_file(path: &Utf8Path) -> Result<Option<LocaleStrings>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::io(path, e)),
    };
    let value: Value = serde_json::from_str(&contents).map_err(|e| ConfigError::json(path, e))?;
    Ok(Some(LocaleStrings::from_json(&value)))
}

/// Locales with a strings file under `<dir>/locales`, sorted.
///
/// # Errors
///
/// Fails when an existing `locales` folder cannot be listed
pub async fn available_locales(dir: &Utf8Path) -> Result<Vec<String>> {
    let folder = dir.join("locales");
    let mut entries = match tokio::fs::read_dir(&folder).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(ConfigError::io(&folder, e)),
    };

    let mut locales = vec![];
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::io(&folder, e))?
    {
        let file_name = entry.file_name();
        if let Some(locale) = file_name.to_str().and_then(|f| f.strip_suffix(".json")) {
            locales.push(locale.to_string());
        }
    }
    locales.sort();
    Ok(locales)
}
