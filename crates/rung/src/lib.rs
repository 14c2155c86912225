pub mod commands;
pub mod utils;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::commands::{db::DbCmd, meta::MetaCmd, run::RunCmd};

#[derive(Parser)]
#[command(name = "rung")]
#[command(version)]
#[command(about = "Rung - sandboxed extensions")]
#[command(
    long_about = "Rung compiles extension scripts and runs them inside an isolated JavaScript sandbox, \
asking for the parameters they declare and keeping the state they persist between runs."
)]
#[command(after_help = "EXAMPLES:\n  \
    rung run\n  \
    rung run --raw -d ./my-extension\n  \
    rung db read\n  \
    rung meta\n\
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extension working directory
    #[arg(long, short = 'd', global = true, default_value = ".")]
    pub dir: Utf8PathBuf,

    /// No logging except for errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verbose logging (-v) or trace logging (-vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    #[allow(clippy::missing_errors_doc)]
    pub async fn handle(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Run(cmd) => cmd.handle(&self.dir).await?,
            Commands::Db(cmd) => cmd.handle(&self.dir).await?,
            Commands::Meta(cmd) => cmd.handle(&self.dir).await?,
        }

        Ok(())
    }
}

#[derive(Debug, Subcommand)]
#[command(styles=utils::styles::get_styles())]
pub enum Commands {
    /// Run the extension
    #[command(
        long_about = "Asks for the extension parameters, runs it in a sandbox and prints its alerts."
    )]
    Run(RunCmd),

    /// Read or clear the persisted state
    #[command(long_about = "Reads or clears the state the extension persisted in its last run.")]
    Db(DbCmd),

    /// Precompile translated metadata
    #[command(
        long_about = "Collects the title, description, preview and parameter descriptions of the \
extension in every locale it ships and writes them to .meta."
    )]
    Meta(MetaCmd),
}
