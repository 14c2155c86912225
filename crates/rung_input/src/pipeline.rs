use async_trait::async_trait;
use log::{debug, warn};
use rung_types::{filter, validate};
use serde_json::{Map, Value};

use crate::{InputError, ParamSpec, Question, Result, Schema};

/// Times a required parameter is asked before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Source of raw answers, usually an interactive terminal
#[async_trait]
pub trait Prompter: Send {
    /// Asks `question`, given the answers resolved so far.
    ///
    /// `None` means the question was skipped.
    async fn ask(
        &mut self,
        question: &Question,
        answers: &Map<String, Value>,
    ) -> Result<Option<Value>>;
}

/// Casts and checks a raw answer, falling back to the declared default.
///
/// Returns `None` when neither the answer nor a default resolves.
pub fn resolve_answer(param: &ParamSpec, raw: Option<Value>) -> Option<Value> {
    let given = raw
        .filter(|raw| !is_blank(raw))
        .map(|raw| filter(&param.ty, &raw))
        .filter(|value| !value.is_null());

    match given {
        Some(value) if validate(&param.ty, &value) => Some(value),
        Some(value) => {
            debug!("Rejected {value} for `{}' ({})", param.name, param.ty);
            param.default.clone()
        }
        None => param.default.clone(),
    }
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Asks every parameter of `schema` in declaration order.
///
/// Optional parameters resolve to their default, or `null`, after a single
/// unusable answer. Required ones are asked up to [`MAX_ATTEMPTS`] times.
///
/// # Errors
///
/// Fails when the prompter fails or a required parameter never resolves.
pub async fn resolve_params<P>(schema: &Schema, prompter: &mut P) -> Result<Map<String, Value>>
where
    P: Prompter + ?Sized,
{
    let mut answers = Map::new();

    for param in schema.values() {
        let mut question = Question::new(param);
        let attempts = if param.required { MAX_ATTEMPTS } else { 1 };

        let mut resolved = None;
        while question.attempt <= attempts {
            let raw = prompter.ask(&question, &answers).await?;
            resolved = resolve_answer(param, raw);
            if resolved.is_some() {
                break;
            }
            if param.required {
                warn!(
                    "`{}' requires a valid {} ({}/{attempts})",
                    param.name, question.type_name, question.attempt
                );
            }
            question.attempt += 1;
        }

        let value = match resolved {
            Some(value) => value,
            None if param.required => return Err(InputError::Unanswered(param.name.clone())),
            None => Value::Null,
        };
        answers.insert(param.name.clone(), value);
    }

    Ok(answers)
}
