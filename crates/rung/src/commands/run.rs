use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;
use log::debug;
use rung_compiler::compile_modules_from_source;
use rung_config::{LocaleStrings, Store, detect_locale};
use rung_executor::{InvocationContext, get_properties, run_and_get_alerts};
use rung_input::{parse_schema, resolve_params};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::{Style, Width, object::Columns};

use crate::commands::Extension;
use crate::utils::{
    prompts::InquirePrompter,
    spinner::Spinner,
    styles::fmt_bold,
};

/// Share of the terminal width taken by each column
const COLUMN_PERCENTS: [usize; 4] = [10, 20, 35, 26];
const FALLBACK_WIDTH: usize = 100;

#[derive(Debug, Clone, Parser)]
pub struct RunCmd {
    /// Print the alerts as JSON instead of a table
    #[arg(long)]
    pub raw: bool,
}

impl RunCmd {
    pub(crate) async fn handle(&self, dir: &Utf8Path) -> Result<()> {
        let extension = Extension::load(dir).await?;
        let modules = compile_modules_from_source(&extension.source, dir).await?;
        let store = Store::from_env()?;
        let locale = detect_locale();
        let (db, strings) = tokio::join!(
            store.read(&extension.name),
            LocaleStrings::load(dir, &locale)
        );
        debug!(
            "Loaded {} with {} local modules in locale {locale}",
            extension.name,
            modules.len()
        );

        let config = get_properties(
            &extension.name,
            &extension.source,
            strings.clone(),
            modules.clone(),
        )
        .await?;
        let schema = parse_schema(&config)?;
        let mut prompter = InquirePrompter::new(&extension.name, dir, strings.clone());
        let params = resolve_params(&schema, &mut prompter).await?;

        let mut context = InvocationContext::new(params)
            .with_db(db)
            .with_locale(locale);
        if let Some(user) = current_user() {
            context = context.with_user(user);
        }

        let mut sp = Spinner::new(format!("Running {}...", fmt_bold(&extension.name)));
        let result = match run_and_get_alerts(
            &extension.name,
            &extension.source,
            context,
            strings,
            modules,
            &store,
        )
        .await
        {
            Ok(result) => {
                sp.stop_success("Done");
                result
            }
            Err(e) => {
                sp.stop_error("Extension failed");
                return Err(e.into());
            }
        };

        if self.raw {
            println!("{}", serde_json::to_string_pretty(&result.alerts)?);
        } else {
            println!("{}", alerts_table(&result.alerts, terminal_width()));
        }

        Ok(())
    }
}

fn current_user() -> Option<String> {
    ["USER", "USERNAME"]
        .into_iter()
        .find_map(|var| std::env::var(var).ok().filter(|user| !user.is_empty()))
}

fn terminal_width() -> usize {
    terminal_size::terminal_size().map_or(FALLBACK_WIDTH, |(width, _)| usize::from(width.0))
}

/// `[key, title, content, comment]` per alert. Alerts keyed by object key,
/// or by index when the extension returned a list.
fn alert_rows(alerts: &Value) -> Vec<[String; 4]> {
    let entries: Vec<(String, &Value)> = match alerts {
        Value::Object(map) => map.iter().map(|(key, v)| (key.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null => vec![],
        other => vec![("0".to_string(), other)],
    };

    entries
        .into_iter()
        .map(|(key, alert)| match alert {
            Value::Object(fields) => {
                let field = |name: &str| fields.get(name).map(text).unwrap_or_default();
                [key, field("title"), field("content"), field("comment")]
            }
            other => [key, text(other), String::new(), String::new()],
        })
        .collect()
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn alerts_table(alerts: &Value, width: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Key", "Title", "Content", "Comment"]);
    for row in alert_rows(alerts) {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    for (i, percent) in COLUMN_PERCENTS.into_iter().enumerate() {
        let column = (width * percent / 100).max(4);
        table.modify(Columns::single(i), Width::wrap(column));
    }
    table.to_string()
}
