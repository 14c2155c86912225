use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Parser;
use log::info;
use rung_compiler::find_and_compile_modules;
use rung_executor::precompile_locales;

use crate::commands::Extension;
use crate::utils::{
    spinner::Spinner,
    styles::{fmt_bold, fmt_dimmed, fmt_success},
};

const META_FILE: &str = ".meta";

#[derive(Debug, Clone, Parser)]
pub struct MetaCmd;

impl MetaCmd {
    pub(crate) async fn handle(&self, dir: &Utf8Path) -> Result<()> {
        let extension = Extension::load(dir).await?;

        let mut sp = Spinner::new("Compiling modules...");
        let modules = find_and_compile_modules(dir).await?;
        sp.update_text(format!("Precompiling {} locales...", fmt_bold(&extension.name)));
        let meta = match precompile_locales(&extension.name, dir, &extension.source, modules).await
        {
            Ok(meta) => meta,
            Err(e) => {
                sp.stop_error("Precompilation failed");
                return Err(e.into());
            }
        };

        sp.stop_and_persist("📦", "Precompiled metadata");

        let path = dir.join(META_FILE);
        tokio::fs::write(&path, serde_json::to_string(&meta)?)
            .await
            .with_context(|| format!("Failed to write {path}"))?;

        info!(
            "{}",
            fmt_success(&format!(
                "Metadata of {name} written to {path}",
                name = fmt_bold(&extension.name),
                path = fmt_dimmed(path.as_str()),
            ))
        );
        Ok(())
    }
}
