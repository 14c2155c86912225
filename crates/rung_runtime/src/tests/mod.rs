//! Tests for the Rung runtime
//!
//! Integration tests that spin up a JavaScript runtime with the extension and
//! drive it the way the executor does.

mod runtime_integration;
mod sandbox_controller;

use deno_core::{JsRuntime, PollEventLoopOptions, RuntimeOptions};
use rung_compiler::{CompiledModule, Loader};
use rung_config::LocaleStrings;

use crate::{Capabilities, ModuleTable};

fn js_module(identifier: &str, source: &str) -> CompiledModule {
    CompiledModule {
        identifier: identifier.to_string(),
        source: source.to_string(),
        loader: Loader::JavaScript,
    }
}

fn json_module(identifier: &str, source: &str) -> CompiledModule {
    CompiledModule {
        identifier: identifier.to_string(),
        source: source.to_string(),
        loader: Loader::Json,
    }
}

/// Runtime with the `rung_runtime` extension and `modules` already registered
fn create_test_runtime(modules: Vec<CompiledModule>, strings: LocaleStrings) -> JsRuntime {
    let scripts = modules.iter().map(crate::module_script).collect::<Vec<_>>();
    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![crate::rung_runtime::init(
            "test-extension".to_string(),
            ModuleTable::new(modules),
            strings,
            Capabilities::sdk(),
        )],
        ..Default::default()
    });
    for script in scripts {
        runtime
            .execute_script("<module>", script)
            .expect("module should register");
    }
    runtime
}

/// Runs `code` as the body of an async function and returns its result as JSON
async fn execute_js(runtime: &mut JsRuntime, code: &str) -> Result<serde_json::Value, String> {
    let wrapped_code = format!(
        r"
        (async () => {{
            {code}
        }})();
        "
    );

    let promise = runtime
        .execute_script("<test>", wrapped_code)
        .map_err(|e| format!("Script execution failed: {e}"))?;

    let resolve_future = runtime.resolve(promise);
    let resolved = runtime
        .with_event_loop_promise(resolve_future, PollEventLoopOptions::default())
        .await
        .map_err(|e| format!("Failed to resolve promise: {e}"))?;

    let json_value = {
        deno_core::scope!(scope, runtime);
        let local = deno_core::v8::Local::new(scope, resolved);
        deno_core::serde_v8::from_v8::<serde_json::Value>(scope, local)
            .map_err(|e| format!("Failed to convert result to JSON: {e}"))?
    };

    Ok(json_value)
}
