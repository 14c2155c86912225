pub mod db;
pub mod meta;
pub mod run;

use anyhow::{Context, Result};
use camino::Utf8Path;
use rung_config::Manifest;

pub(crate) const USER_CANCELLED: &str = "User cancelled";

/// The extension found in a working directory, entry already compiled
pub(crate) struct Extension {
    pub(crate) name: String,
    pub(crate) source: String,
}

impl Extension {
    pub(crate) async fn load(dir: &Utf8Path) -> Result<Self> {
        let manifest = Manifest::load(dir).await?;
        let entry = dir.join("index.js");
        let raw = tokio::fs::read_to_string(&entry)
            .await
            .with_context(|| format!("Failed to read {entry}"))?;
        let source = rung_compiler::compile(&raw)?;

        Ok(Self {
            name: manifest.name,
            source,
        })
    }
}
