//! # Rung Executor
//!
//! Runs compiled Rung extensions inside [`rung_runtime`] sandboxes.
//!
//! Every public entry point builds a brand-new realm on a dedicated thread
//! (see [`SandboxBuilder`] for the single-threaded building blocks), so calls
//! can run concurrently without sharing any state:
//!
//! - [`get_properties`] evaluates an extension and returns its `config`
//! - [`run_and_get_alerts`] invokes the handler and reconciles the persisted `db`
//! - [`precompile_locales`] collects translated metadata across all locales
//! - [`complete`] runs an `autocomplete/<param>.js` source
//!
//! ```rust,no_run
//! use rung_config::{LocaleStrings, Store};
//! use rung_executor::{InvocationContext, run_and_get_alerts};
//!
//! # async fn example() -> rung_executor::Result<()> {
//! let source = rung_compiler::compile("export default { extension: ctx => ['Hello'] };")?;
//! let store = Store::from_env()?;
//! let result = run_and_get_alerts(
//!     "hello",
//!     &source,
//!     InvocationContext::default(),
//!     LocaleStrings::default(),
//!     vec![],
//!     &store,
//! )
//! .await?;
//! assert_eq!(result.alerts, serde_json::json!(["Hello"]));
//! # Ok(())
//! # }
//! ```

mod autocomplete;
mod isolate;
mod meta;
mod protocol;
mod sandbox;

#[cfg(test)]
mod tests;

pub use autocomplete::complete;
pub use meta::{deep_merge, precompile_locales, project_properties};
pub use protocol::{ExtensionResult, InvocationContext, InvocationMode, User};
pub use rung_runtime::{Capabilities, SandboxError};
pub use sandbox::{ExportedModule, Sandbox, SandboxBuilder, run_in_sandbox};

use log::{debug, info};
use rung_compiler::{CompileError, CompiledModule};
use rung_config::{ConfigError, LocaleStrings, Store};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExecutorError>;

/// An exception raised by extension code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionError {
    pub message: String,
    pub stack: Option<String>,
}

impl ExecutionError {
    /// Splits a formatted JavaScript error into its message and stack
    pub(crate) fn from_js(error: &str) -> Self {
        let (first, rest) = error.split_once('\n').unwrap_or((error, ""));
        let message = first
            .trim_start_matches("Uncaught ")
            .trim_start_matches("(in promise) ")
            .to_string();
        let stack = Some(rest.trim_end())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { message, stack }
    }
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Compilation failed: {0}")]
    Compilation(#[from] CompileError),

    #[error("{0}")]
    Sandbox(#[from] SandboxError),

    #[error("Expected default exported expression to be a function")]
    InvocationType,

    #[error("{0}")]
    Runtime(ExecutionError),

    #[error("Unsupported type {0}")]
    Persistence(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal sandbox error: {0}")]
    Internal(String),
}

/// The `config` an extension exports, evaluated in its own sandbox.
///
/// # Errors
///
/// Fails when the entry throws or requires something the sandbox refuses.
pub async fn get_properties(
    name: &str,
    compiled_source: &str,
    strings: LocaleStrings,
    modules: Vec<CompiledModule>,
) -> Result<Value> {
    let (name, source) = (name.to_string(), compiled_source.to_string());
    isolate::run_isolated(move || async move {
        run_in_sandbox(&name, &source, strings, modules)?.config()
    })
    .await
}

/// Runs an extension with `context` and persists the `db` it returned.
///
/// A result without `db` clears the extension's persisted state. Nothing is
/// written when the run fails.
///
/// # Errors
///
/// Fails for refused modules, a non-callable handler, exceptions in the
/// extension, unsupported `db` values and store write failures.
pub async fn run_and_get_alerts(
    name: &str,
    compiled_source: &str,
    context: InvocationContext,
    strings: LocaleStrings,
    modules: Vec<CompiledModule>,
    store: &Store,
) -> Result<ExtensionResult> {
    let (owned_name, source) = (name.to_string(), compiled_source.to_string());
    let result = isolate::run_isolated(move || async move {
        let mut module = run_in_sandbox(&owned_name, &source, strings, modules)?;
        module.invoke(&context).await
    })
    .await?;

    store.upsert(name, result.db.as_ref()).await?;
    match &result.db {
        Some(_) => debug!("Persisted state of {name}"),
        None => debug!("Cleared state of {name}"),
    }
    info!("Extension {name} finished");
    Ok(result)
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
