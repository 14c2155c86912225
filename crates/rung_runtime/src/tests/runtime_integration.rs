//! Globals injected into the sandbox, exercised from JavaScript

use rung_config::LocaleStrings;
use serde_json::json;

use super::{create_test_runtime, execute_js, js_module, json_module};
use crate::{SandboxError, Violations};

#[tokio::test]
async fn test_runtime_installs_globals() {
    let mut runtime = create_test_runtime(vec![], LocaleStrings::default());
    let result = execute_js(
        &mut runtime,
        "return [typeof render, typeof _, typeof console.log, typeof setTimeout, typeof render.Fragment];",
    )
    .await
    .expect("Should execute successfully");
    assert_eq!(
        result,
        json!(["function", "function", "function", "function", "symbol"])
    );
}

#[tokio::test]
async fn test_runtime_require_sdk() {
    let mut runtime = create_test_runtime(
        vec![js_module(
            "app.js",
            r#"
            const { create, types } = require("rung-sdk");
            const { IntegerRange } = require("rung-cli/dist/types");
            module.exports = create(() => [], {
                params: { age: { type: IntegerRange(10, 20) }, size: { type: types.Char(3) } },
            });
            "#,
        )],
        LocaleStrings::default(),
    );

    let code = r#"
        let captured;
        globalThis[Symbol.for("rung.sandbox")].evaluate((module, exports, require) => {
            captured = require("./app");
        });
        return captured.config.params;
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!({
            "age": { "type": { "name": "IntegerRange", "from": 10, "to": 20 } },
            "size": { "type": { "name": "Char", "length": 3 } }
        })
    );
}

#[tokio::test]
async fn test_runtime_denies_host_modules() {
    let mut runtime = create_test_runtime(
        vec![js_module("reader.js", r#"module.exports = require("fs");"#)],
        LocaleStrings::default(),
    );

    let code = r#"
        try {
            globalThis[Symbol.for("rung.sandbox")].evaluate((module, exports, require) => {
                require("./reader");
            });
            return "loaded";
        } catch (e) {
            return e.message;
        }
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!("Access denied to require 'fs': disallowed dependency")
    );

    let violations = runtime.op_state().borrow().borrow::<Violations>().clone();
    assert_eq!(
        violations.iter().collect::<Vec<_>>(),
        vec![&SandboxError::DisallowedDependency("fs".into())]
    );
}

#[tokio::test]
async fn test_runtime_unknown_local_module() {
    let mut runtime = create_test_runtime(vec![], LocaleStrings::default());
    let code = r#"
        try {
            globalThis[Symbol.for("rung.sandbox")].evaluate((module, exports, require) => {
                require("./missing");
            });
        } catch (e) {
            return e.message;
        }
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!("Cannot find module './missing': unknown module"));
}

#[tokio::test]
async fn test_runtime_modules_are_cached_and_relative() {
    let mut runtime = create_test_runtime(
        vec![
            js_module(
                "lib/counter.js",
                "globalThis.loads = (globalThis.loads ?? 0) + 1; module.exports = require('../data.json');",
            ),
            json_module("data.json", r#"{"answer":42}"#),
        ],
        LocaleStrings::default(),
    );

    let code = r#"
        let first;
        let second;
        globalThis[Symbol.for("rung.sandbox")].evaluate((module, exports, require) => {
            first = require("./lib/counter");
            second = require("./lib/counter.js");
        });
        return [first.answer, first === second, globalThis.loads];
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!([42, true, 1]));
}

#[tokio::test]
async fn test_runtime_host_globals_are_shadowed() {
    let mut runtime = create_test_runtime(
        vec![js_module(
            "probe.js",
            "module.exports = [typeof Deno, typeof process, typeof global];",
        )],
        LocaleStrings::default(),
    );

    let code = r#"
        let probed;
        globalThis[Symbol.for("rung.sandbox")].evaluate((module, exports, require) => {
            probed = require("./probe");
        });
        return probed;
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!(["undefined", "undefined", "undefined"]));
}

#[tokio::test]
async fn test_runtime_removes_host_namespace() {
    let mut runtime = create_test_runtime(vec![], LocaleStrings::default());
    let result = execute_js(
        &mut runtime,
        r#"return [typeof globalThis.Deno, typeof Function("return this")().Deno, "Deno" in globalThis];"#,
    )
    .await
    .expect("Should execute successfully");
    assert_eq!(result, json!(["undefined", "undefined", false]));
}

#[tokio::test]
async fn test_runtime_render() {
    let mut runtime = create_test_runtime(vec![], LocaleStrings::default());
    let code = r#"
        const Badge = ({ label, children }) => render("b", { title: label }, ...children);
        return render(
            render.Fragment,
            null,
            render("div", { className: "card", onClick: () => 1, hidden: undefined, style: { marginTop: 4 } },
                render(Badge, { label: "new" }, "Hi"),
                render("script", null, "alert(1)"),
                render("hr", null),
            ),
            [1, 2].map(n => render("i", null, n)),
        );
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(
        result,
        json!(
            r#"<div class="card" style="margin-top:4"><b title="new">Hi</b><span>alert(1)</span><hr /></div><i>1</i><i>2</i>"#
        )
    );
}

#[tokio::test]
async fn test_runtime_translate() {
    let strings: LocaleStrings = [("Hello, {{name}}".to_string(), "Olá, {{name}}".to_string())]
        .into_iter()
        .collect();
    let mut runtime = create_test_runtime(vec![], strings);

    let code = r#"
        return [_("Hello, {{name}}", { name: "Ana" }), _("Bye")];
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!(["Olá, Ana", "Bye"]));
}

#[tokio::test]
async fn test_runtime_timers() {
    let mut runtime = create_test_runtime(vec![], LocaleStrings::default());
    let code = r#"
        const order = [];
        const cancelled = setTimeout(() => order.push("cancelled"), 1);
        clearTimeout(cancelled);
        await new Promise(resolve => {
            setTimeout(() => { order.push("late"); resolve(); }, 10);
            setImmediate(() => order.push("soon"));
        });
        return order;
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!(["soon", "late"]));
}

#[tokio::test]
async fn test_runtime_console_accepts_any_value() {
    let mut runtime = create_test_runtime(vec![], LocaleStrings::default());
    let code = r#"
        const cyclic = {};
        cyclic.self = cyclic;
        console.log("plain", 1, { foo: "bar" });
        console.warn(cyclic);
        console.error(new Error("boom"));
        return true;
    "#;
    let result = execute_js(&mut runtime, code)
        .await
        .expect("Should execute successfully");
    assert_eq!(result, json!(true));
}
