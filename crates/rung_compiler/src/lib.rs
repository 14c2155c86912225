//! Compiles extension sources from the authoring dialect (ES modules + JSX)
//! into sandbox-ready script code, and gathers the local modules an entry
//! source depends on.
//!
//! ```no_run
//! # async fn example() -> rung_compiler::Result<()> {
//! let entry = std::fs::read_to_string("index.js").unwrap_or_default();
//! let compiled = rung_compiler::compile(&entry)?;
//! let modules = rung_compiler::compile_modules_from_source(&entry, camino::Utf8Path::new(".")).await?;
//! # Ok(())
//! # }
//! ```

mod dialect;
mod modules;

use camino::Utf8PathBuf;
use thiserror::Error;

pub use dialect::{compile, inspect};
pub use modules::{
    CompiledModule, Loader, compile_module, compile_modules_from_source,
    find_and_compile_modules, normalize_specifier,
};

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Transpilation failed: {0}")]
    Transpile(String),

    #[error("Unknown module loader for file {0}")]
    UnknownLoader(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON module {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
