//! Host functions reachable from inside the sandbox

use deno_core::OpState;
use deno_core::op2;
use log::{debug, error, info, trace, warn};
use rung_config::LocaleStrings;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::capabilities::{BUILTIN_MODULES, Capabilities};
use crate::error::{SandboxError, Violations};
use crate::module_table::ModuleTable;

/// Name of the extension a sandbox runs, used to tag its console output
#[derive(Debug, Clone)]
pub struct ExtensionName(pub String);

/// Where a `require` call is served from
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum Resolution {
    Builtin { key: String },
    Local { key: String },
}

/// Resolves a `require(specifier)` made by the module at `referrer`
#[op2]
#[serde]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn op_require(
    state: &mut OpState,
    #[string] specifier: String,
    #[string] referrer: String,
) -> Result<Resolution, SandboxError> {
    let resolution = resolve(state, &specifier, &referrer);
    if let Err(e) = &resolution {
        debug!("Refused require('{specifier}') from {referrer}: {e}");
        state.borrow_mut::<Violations>().record(e.clone());
    }
    resolution
}

fn resolve(state: &OpState, specifier: &str, referrer: &str) -> Result<Resolution, SandboxError> {
    if specifier.starts_with("./") || specifier.starts_with("../") {
        let module = state
            .borrow::<ModuleTable>()
            .resolve(specifier, referrer)
            .ok_or_else(|| SandboxError::UnknownModule(specifier.to_string()))?;
        return Ok(Resolution::Local { key: module.key() });
    }

    state.borrow::<Capabilities>().check(specifier)?;
    if BUILTIN_MODULES.contains(&specifier) {
        Ok(Resolution::Builtin {
            key: specifier.to_string(),
        })
    } else {
        Err(SandboxError::UnknownModule(specifier.to_string()))
    }
}

/// Renders a JSX element, `tag` is null for fragments
#[op2]
#[string]
pub(crate) fn op_render_markup(
    #[serde] tag: Option<String>,
    #[serde] props: Option<Map<String, Value>>,
    #[serde] children: Vec<Value>,
) -> String {
    crate::markup::compile_markup(tag.as_deref(), &props.unwrap_or_default(), &children)
}

/// Translates `text` with the sandbox's locale strings
#[op2]
#[string]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn op_translate(
    state: &mut OpState,
    #[string] text: String,
    #[serde] vars: Option<Value>,
) -> String {
    let strings = state.borrow::<LocaleStrings>();
    crate::i18n::translate(strings, &text, vars.as_ref())
}

/// Console output of the extension
#[op2(fast)]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn op_log(state: &mut OpState, #[string] level: String, #[string] message: String) {
    let name = &state.borrow::<ExtensionName>().0;
    match level.as_str() {
        "error" => error!("ext [{name}]: {message}"),
        "warn" => warn!("ext [{name}]: {message}"),
        "debug" => debug!("ext [{name}]: {message}"),
        "trace" => trace!("ext [{name}]: {message}"),
        _ => info!("ext [{name}]: {message}"),
    }
}

/// Resolves after `millis`, backs the sandbox timers
#[op2(async)]
pub(crate) async fn op_sleep(millis: u32) {
    tokio::time::sleep(std::time::Duration::from_millis(u64::from(millis))).await;
}
