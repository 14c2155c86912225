//! # Rung parameter input
//!
//! Turns the `params` an extension declares in its `config` into the concrete
//! values passed to its handler.
//!
//! Each parameter is asked through a [`Prompter`] using the [`Component`] its
//! type maps to. Raw answers are cast with [`rung_types::filter`], checked
//! with [`rung_types::validate`] and fall back to the declared `default`.
//! Required parameters are asked again until they resolve.
//!
//! ```rust,no_run
//! use rung_input::{Prompter, parse_schema, resolve_params};
//!
//! # async fn example(prompter: &mut impl Prompter) -> rung_input::Result<()> {
//! let config = serde_json::json!({
//!     "params": { "name": { "type": { "name": "String" }, "description": "Your name" } }
//! });
//! let schema = parse_schema(&config)?;
//! let params = resolve_params(&schema, prompter).await?;
//! # Ok(())
//! # }
//! ```

mod component;
mod pipeline;
mod schema;

pub use component::{Choice, Component, Question};
pub use pipeline::{MAX_ATTEMPTS, Prompter, resolve_answer, resolve_params};
pub use schema::{ParamSpec, Schema, parse_schema};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InputError>;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("No valid value given for required parameter `{0}'")]
    Unanswered(String),

    #[error("Invalid declaration of parameter `{name}': {message}")]
    Schema { name: String, message: String },
}
