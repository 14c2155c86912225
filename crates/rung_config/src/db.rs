//! Persisted extension state
//!
//! One JSON file per extension name (`<rung home>/<name>.db`) holding exactly
//! the last `db` value the extension returned. There is no locking: two runs
//! of the same extension racing on the file resolve as last writer wins.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde_json::Value;

use crate::{ConfigError, Result};

#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

impl Store {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the per-user Rung folder
    ///
    /// # Errors
    ///
    /// Fails when the Rung folder cannot be resolved
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(crate::rung_home()?))
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn location(&self, name: &str) -> Utf8PathBuf {
        self.root.join(format!("{name}.db"))
    }

    /// Last persisted value, `None` when absent or unreadable
    pub async fn read(&self, name: &str) -> Option<Value> {
        let path = self.location(name);
        let contents = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring unreadable store {path}: {e}");
                None
            }
        }
    }

    /// Replaces the persisted value, `None` drops the file.
    ///
    /// # Errors
    ///
    /// Fails when the Rung folder or the store file cannot be written
    pub async fn upsert(&self, name: &str, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            return self.clear(name).await;
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ConfigError::io(&self.root, e))?;

        let path = self.location(name);
        let contents = serde_json::to_string(value).map_err(|e| ConfigError::json(&path, e))?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| ConfigError::io(&path, e))?;
        debug!("Persisted state for {name} at {path}");
        Ok(())
    }

    /// Removes the persisted value if there is one.
    ///
    /// # Errors
    ///
    /// Fails when an existing store file cannot be removed
    pub async fn clear(&self, name: &str) -> Result<()> {
        let path = self.location(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Cleared state for {name}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConfigError::io(&path, e)),
        }
    }
}
