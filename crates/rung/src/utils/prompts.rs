use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use inquire::autocompletion::{Autocomplete, Replacement};
use inquire::{Confirm, CustomUserError, InquireError, MultiSelect, Select, Text};
use log::warn;
use rung_config::LocaleStrings;
use rung_input::{Choice, Component, InputError, Prompter, Question};
use serde_json::{Map, Value};
use tokio::runtime::Handle;

use crate::commands::USER_CANCELLED;
use crate::utils::styles::fmt_dimmed;

/// Asks parameters on the terminal
pub(crate) struct InquirePrompter {
    name: String,
    dir: Utf8PathBuf,
    strings: LocaleStrings,
}

impl InquirePrompter {
    pub(crate) fn new(name: &str, dir: &Utf8Path, strings: LocaleStrings) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            strings,
        }
    }

    async fn completer(
        &self,
        question: &Question,
        answers: &Map<String, Value>,
    ) -> Option<SourceCompleter> {
        let source = self
            .dir
            .join("autocomplete")
            .join(format!("{}.js", question.name));
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            warn!("missing autocomplete source for parameter `{}'", question.name);
            return None;
        }

        Some(SourceCompleter {
            name: self.name.clone(),
            dir: self.dir.clone(),
            param: question.name.clone(),
            params: answers.clone(),
            strings: self.strings.clone(),
            handle: Handle::current(),
        })
    }
}

#[async_trait]
impl Prompter for InquirePrompter {
    async fn ask(
        &mut self,
        question: &Question,
        answers: &Map<String, Value>,
    ) -> rung_input::Result<Option<Value>> {
        let message = prompt_message(question);
        let help = help_message(question);

        let answer = match &question.component {
            Component::Confirm => Confirm::new(&message)
                .with_default(
                    question
                        .default
                        .as_ref()
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                )
                .prompt_skippable()
                .map(|answer| answer.map(Value::Bool)),
            Component::Select { choices } => {
                let cursor = question
                    .default
                    .as_ref()
                    .and_then(|default| choices.iter().position(|c| &c.value == default))
                    .unwrap_or(0);
                Select::new(&message, labels(choices))
                    .with_starting_cursor(cursor)
                    .raw_prompt_skippable()
                    .map(|answer| answer.map(|option| choices[option.index].value.clone()))
            }
            Component::MultiSelect { choices } => MultiSelect::new(&message, labels(choices))
                .raw_prompt_skippable()
                .map(|answer| {
                    answer.map(|options| {
                        options
                            .iter()
                            .map(|option| choices[option.index].value.clone())
                            .collect::<Value>()
                    })
                }),
            Component::Autocomplete => {
                let completer = self.completer(question, answers).await;
                let mut text = Text::new(&message).with_help_message(&help);
                if let Some(completer) = completer {
                    text = text.with_autocomplete(completer);
                }
                text.prompt_skippable().map(|answer| answer.map(Value::String))
            }
            Component::Input | Component::Date | Component::Color => {
                let default = question.default.as_ref().map(display_default);
                let mut text = Text::new(&message).with_help_message(&help);
                if let Some(default) = &default {
                    text = text.with_default(default);
                }
                text.prompt_skippable().map(|answer| answer.map(Value::String))
            }
        };

        answer.map_err(|e| match e {
            InquireError::OperationInterrupted => InputError::Prompt(USER_CANCELLED.to_string()),
            e => InputError::Prompt(e.to_string()),
        })
    }
}

fn prompt_message(question: &Question) -> String {
    if question.attempt > 1 {
        let attempt = format!("(attempt {})", question.attempt);
        format!("{} {}", question.message, fmt_dimmed(&attempt))
    } else {
        question.message.clone()
    }
}

fn help_message(question: &Question) -> String {
    let hint = match question.component {
        Component::Date => " as YYYY-MM-DD",
        Component::Color => " as a hex color, e.g. #ff8800",
        _ => "",
    };
    let required = if question.required { ", required" } else { "" };
    format!("{}{hint}{required}", question.type_name)
}

fn labels(choices: &[Choice]) -> Vec<String> {
    choices.iter().map(|choice| choice.label.clone()).collect()
}

fn display_default(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_default)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// Suggestions from the extension's `autocomplete/<param>.js` source
#[derive(Clone)]
struct SourceCompleter {
    name: String,
    dir: Utf8PathBuf,
    param: String,
    params: Map<String, Value>,
    strings: LocaleStrings,
    handle: Handle,
}

impl Autocomplete for SourceCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        // inquire asks synchronously, the source runs on the sandbox thread
        let suggestions = tokio::task::block_in_place(|| {
            self.handle.block_on(rung_executor::complete(
                &self.name,
                &self.dir,
                &self.param,
                &self.params,
                input,
                self.strings.clone(),
            ))
        })?;
        Ok(suggestions.unwrap_or_default())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}
