//! Host side state of an extension: where the per-user Rung folder lives,
//! the persisted `db` store, the extension manifest and locale string tables.

pub mod db;
pub mod locale;
pub mod manifest;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

pub use db::Store;
pub use locale::{LocaleStrings, detect_locale};
pub use manifest::Manifest;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to determine home directory")]
    NoHomeDir,

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

impl ConfigError {
    pub(crate) fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Utf8Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Per-user Rung folder, `$RUNG_HOME` or `~/.rung`
///
/// # Errors
///
/// Fails when no home directory can be determined or it is not valid UTF-8
pub fn rung_home() -> Result<Utf8PathBuf> {
    if let Some(home) = std::env::var_os("RUNG_HOME").filter(|h| !h.is_empty()) {
        return Utf8PathBuf::from_path_buf(home.into())
            .map_err(|p| ConfigError::NonUtf8Path(p.display().to_string()));
    }

    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    let home = Utf8PathBuf::from_path_buf(home)
        .map_err(|p| ConfigError::NonUtf8Path(p.display().to_string()))?;
    Ok(home.join(".rung"))
}
