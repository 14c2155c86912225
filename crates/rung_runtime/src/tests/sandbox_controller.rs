//! The host controller: evaluating entries, probing and invoking handlers

use rung_config::LocaleStrings;
use serde_json::json;

use super::{create_test_runtime, execute_js, js_module};
use crate::entry_script;

async fn run_entry(entry: &str, code: &str) -> Result<serde_json::Value, String> {
    let mut runtime = create_test_runtime(
        vec![js_module("format.js", "module.exports = s => s.toUpperCase();")],
        LocaleStrings::default(),
    );
    runtime
        .execute_script("<entry>", entry_script(entry))
        .map_err(|e| format!("Entry evaluation failed: {e}"))?;
    execute_js(
        &mut runtime,
        &format!(r#"const sandbox = globalThis[Symbol.for("rung.sandbox")]; {code}"#),
    )
    .await
}

#[tokio::test]
async fn test_evaluate_unwraps_default_export() {
    let entry = r#"
        Object.defineProperty(exports, "__esModule", { value: true });
        exports.default = { config: { title: "Hi", params: {} }, extension: (ctx) => [] };
    "#;
    let result = run_entry(entry, "return [sandbox.config(), sandbox.probe()];")
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!([{ "title": "Hi", "params": {} }, { "callable": true, "arity": 1 }])
    );
}

#[tokio::test]
async fn test_probe_non_function_extension() {
    let entry = "module.exports = { extension: 42 };";
    let result = run_entry(entry, "return [sandbox.config(), sandbox.probe()];")
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!([{}, { "callable": false, "arity": 0 }]));
}

#[tokio::test]
async fn test_invoke_sync_handler() {
    let entry = r#"
        const format = require("./format");
        module.exports = { extension: ctx => [format("Hello, " + ctx.params.name + "!")] };
    "#;
    let result = run_entry(entry, r#"return sandbox.invoke({ params: { name: "Ana" } }, "sync");"#)
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!({ "alerts": ["HELLO, ANA!"], "hasDb": false, "db": null, "unsupported": null })
    );
}

#[tokio::test]
async fn test_invoke_sync_adopts_promises() {
    let entry = "module.exports = { extension: async ctx => ({ alerts: ['later'], db: { n: 1 } }) };";
    let result = run_entry(entry, r#"return sandbox.invoke({ params: {} }, "sync");"#)
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!({ "alerts": ["later"], "hasDb": true, "db": { "n": 1 }, "unsupported": null })
    );
}

#[tokio::test]
async fn test_invoke_callback_ignores_return_value() {
    let entry = r#"
        module.exports = {
            extension(ctx, done) {
                setTimeout(() => done(["ok"]), 10);
                return ["ignored"];
            },
        };
    "#;
    let result = run_entry(entry, r#"return sandbox.invoke({ params: {} }, "callback");"#)
        .await
        .expect("Should execute successfully");
    assert_eq!(result["alerts"], json!(["ok"]));
}

#[tokio::test]
async fn test_invoke_callback_rejected_promise() {
    let entry = r#"
        module.exports = {
            extension: async (ctx, done) => { throw new Error("exploded"); },
        };
    "#;
    let result = run_entry(
        entry,
        r#"
        try {
            await sandbox.invoke({ params: {} }, "callback");
            return "resolved";
        } catch (e) {
            return e.message;
        }
        "#,
    )
    .await
    .expect("Should execute successfully");
    assert_eq!(result, json!("exploded"));
}

#[tokio::test]
async fn test_invoke_reports_unsupported_db() {
    let entry = "module.exports = { extension: () => ({ alerts: [], db: () => 1 }) };";
    let result = run_entry(entry, r#"return sandbox.invoke({ params: {} }, "sync");"#)
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!({ "alerts": [], "hasDb": true, "db": null, "unsupported": "Function" })
    );
}

#[tokio::test]
async fn test_array_results_are_alerts() {
    let entry = "module.exports = { extension: () => [{ alerts: 'not an envelope' }] };";
    let result = run_entry(entry, r#"return sandbox.invoke({ params: {} }, "sync");"#)
        .await
        .expect("Should execute successfully");
    assert_eq!(result["alerts"], json!([{ "alerts": "not an envelope" }]));
    assert_eq!(result["hasDb"], json!(false));
}

#[tokio::test]
async fn test_controller_is_sealed_after_evaluate() {
    let entry = "module.exports = { extension: () => [] };";
    let result = run_entry(
        entry,
        r#"
        const attempts = [
            () => sandbox.define("./late.js", (module) => {}),
            () => sandbox.defineValue("./late.json", {}),
            () => sandbox.evaluate((module) => {}),
        ];
        return attempts.map((attempt) => {
            try {
                attempt();
                return "accepted";
            } catch (e) {
                return e.message;
            }
        });
        "#,
    )
    .await
    .expect("Should execute successfully");
    assert_eq!(
        result,
        json!([
            "Sandbox modules are sealed",
            "Sandbox modules are sealed",
            "Sandbox modules are sealed"
        ])
    );
}
