//! What extension code can and cannot reach

use rung_config::LocaleStrings;
use serde_json::json;

use super::{compile, temp_store};
use crate::{
    Capabilities, ExecutorError, InvocationContext, SandboxBuilder, SandboxError, get_properties,
    run_and_get_alerts,
};

#[tokio::test]
async fn test_require_fs_is_denied() {
    let (_guard, store) = temp_store();
    let source = compile(
        r#"
        const fs = require("fs");
        export default { extension: () => [fs.readFileSync("/etc/passwd", "utf8")] };
        "#,
    );

    let err = run_and_get_alerts(
        "reader",
        &source,
        InvocationContext::default(),
        LocaleStrings::default(),
        vec![],
        &store,
    )
    .await
    .expect_err("require('fs') should be refused");

    assert!(
        matches!(&err, ExecutorError::Sandbox(SandboxError::DisallowedDependency(name)) if name == "fs"),
        "got {err:?}"
    );
    assert_eq!(
        err.to_string(),
        "Access denied to require 'fs': disallowed dependency"
    );
    assert!(!store.location("reader").exists());
}

#[tokio::test]
async fn test_require_inside_handler_is_denied() {
    let (_guard, store) = temp_store();
    let source = compile(
        r#"export default { extension: () => [require("node:child_process").execSync("id")] };"#,
    );

    let err = run_and_get_alerts(
        "spawner",
        &source,
        InvocationContext::default(),
        LocaleStrings::default(),
        vec![],
        &store,
    )
    .await
    .expect_err("require('node:child_process') should be refused");

    assert!(
        matches!(err, ExecutorError::Sandbox(SandboxError::DisallowedDependency(_))),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_unknown_local_module() {
    let source = compile(r#"const missing = require("./missing"); export default {};"#);
    let err = get_properties("lost", &source, LocaleStrings::default(), vec![])
        .await
        .expect_err("unknown module should fail");

    assert!(
        matches!(&err, ExecutorError::Sandbox(SandboxError::UnknownModule(name)) if name == "./missing"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_sdk_can_be_revoked() {
    let source = compile(r#"import { create } from "rung-sdk"; export default create(() => [], {});"#);
    let result = SandboxBuilder::new("revoked")
        .with_capabilities(Capabilities::deny_all())
        .build()
        .expect("sandbox should build")
        .evaluate(&source);

    assert!(
        matches!(result, Err(ExecutorError::Sandbox(SandboxError::DisallowedDependency(_)))),
        "the SDK is refused once revoked"
    );
}

#[tokio::test]
async fn test_host_globals_are_unreachable() {
    let source = compile(
        r"
        export default {
            config: {
                deno: typeof Deno,
                globalDeno: typeof globalThis.Deno,
                functionDeno: typeof Function("return this")().Deno,
                process: typeof process,
                fetch: typeof fetch,
            },
            extension: () => [],
        };
        ",
    );
    let config = get_properties("curious", &source, LocaleStrings::default(), vec![])
        .await
        .expect("properties should load");

    assert_eq!(
        config,
        json!({
            "deno": "undefined",
            "globalDeno": "undefined",
            "functionDeno": "undefined",
            "process": "undefined",
            "fetch": "undefined"
        })
    );
}

#[tokio::test]
async fn test_core_ops_are_unreachable() {
    let (_guard, store) = temp_store();
    let source = compile(
        r#"export default { extension: () => globalThis.Deno.core.ops.op_panic("x") };"#,
    );

    let err = run_and_get_alerts(
        "panicker",
        &source,
        InvocationContext::default(),
        LocaleStrings::default(),
        vec![],
        &store,
    )
    .await
    .expect_err("core ops should be out of reach");

    assert!(matches!(err, ExecutorError::Runtime(_)), "got {err:?}");
    assert!(!store.location("panicker").exists());
}

#[tokio::test]
async fn test_entry_cannot_define_modules() {
    let source = compile(
        r#"
        const sandbox = globalThis[Symbol.for("rung.sandbox")];
        let defined;
        try {
            sandbox.define("./evil.js", (module) => { module.exports = 1; });
            defined = "defined";
        } catch (e) {
            defined = e.message;
        }
        export default { config: { defined }, extension: () => [] };
        "#,
    );
    let config = get_properties("sealed", &source, LocaleStrings::default(), vec![])
        .await
        .expect("properties should load");

    assert_eq!(config, json!({ "defined": "Sandbox modules are sealed" }));
}

#[tokio::test]
async fn test_dynamic_import_is_rejected() {
    let (_guard, store) = temp_store();
    let source = compile(
        r#"
        export default {
            extension: async () => {
                try {
                    await import("data:text/javascript,export default 1");
                    return ["imported"];
                } catch {
                    return ["rejected"];
                }
            },
        };
        "#,
    );

    let result = run_and_get_alerts(
        "importer",
        &source,
        InvocationContext::default(),
        LocaleStrings::default(),
        vec![],
        &store,
    )
    .await
    .expect("extension should run");

    assert_eq!(result.alerts, json!(["rejected"]));
}
