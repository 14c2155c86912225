use camino::Utf8Path;
use serde::Deserialize;

use crate::{ConfigError, Result};

/// The parts of an extension's `package.json` the host cares about
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Keys the persisted store
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl Manifest {
    /// Reads `<dir>/package.json`.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, is not JSON or has no `name`
    pub async fn load(dir: &Utf8Path) -> Result<Self> {
        let path = dir.join("package.json");
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::io(&path, e))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::json(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[tokio::test]
    async fn test_load_manifest() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        std::fs::write(
            root.join("package.json"),
            r#"{"name": "hello-world", "version": "1.0.0", "dependencies": {}}"#,
        )
        .expect("write");

        let manifest = Manifest::load(&root).await.expect("manifest should load");
        assert_eq!(manifest.name, "hello-world");
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn test_missing_name_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        std::fs::write(root.join("package.json"), "{}").expect("write");

        let err = Manifest::load(&root).await.unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}
