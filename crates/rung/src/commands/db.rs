use anyhow::Result;
use camino::Utf8Path;
use clap::{Parser, Subcommand};
use log::info;
use rung_config::{Manifest, Store};

use crate::utils::styles::{fmt_bold, fmt_dimmed, fmt_success};

#[derive(Debug, Clone, Parser)]
pub struct DbCmd {
    #[command(subcommand)]
    pub action: DbAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DbAction {
    /// Print the persisted state
    Read,

    /// Remove the persisted state
    Clear,
}

impl DbCmd {
    pub(crate) async fn handle(&self, dir: &Utf8Path) -> Result<()> {
        let manifest = Manifest::load(dir).await?;
        let store = Store::from_env()?;

        match self.action {
            DbAction::Read => {
                let Some(value) = store.read(&manifest.name).await else {
                    anyhow::bail!("Unable to read database");
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            DbAction::Clear => {
                store.clear(&manifest.name).await?;
                info!(
                    "{}",
                    fmt_success(&format!(
                        "Cleared database of {name} at {path}",
                        name = fmt_bold(&manifest.name),
                        path = fmt_dimmed(store.location(&manifest.name).as_str()),
                    ))
                );
            }
        }

        Ok(())
    }
}
