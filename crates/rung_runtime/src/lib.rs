//! # Rung Runtime
//!
//! A Deno extension that turns a bare V8 realm into the sandbox Rung
//! extensions run in.
//!
//! ## Overview
//!
//! The extension installs, on every realm it is initialised in:
//! - **`require`**: resolves local modules from a [`ModuleTable`] and the
//!   bundled SDK, gated by [`Capabilities`]. Anything else throws.
//! - **`render`**: the JSX pragma, backed by [`compile_markup`]
//! - **`_`**: the translator, backed by [`translate`] and the realm's locale strings
//! - **`console`** and timers (`setTimeout`, `clearTimeout`, `setImmediate`)
//!
//! Host code drives the realm through a controller stored under
//! `Symbol.for("rung.sandbox")`; [`module_script`] and [`entry_script`] build
//! the scripts that feed it compiled sources.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deno_core::{JsRuntime, RuntimeOptions};
//! use rung_config::LocaleStrings;
//! use rung_runtime::{Capabilities, ModuleTable, entry_script, rung_runtime};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut runtime = JsRuntime::new(RuntimeOptions {
//!     extensions: vec![rung_runtime::init(
//!         "hello".to_string(),
//!         ModuleTable::default(),
//!         LocaleStrings::default(),
//!         Capabilities::sdk(),
//!     )],
//!     ..Default::default()
//! });
//!
//! runtime.execute_script(
//!     "<entry>",
//!     entry_script("module.exports = { extension: ctx => ['Hello'] };"),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! - Package specifiers are denied unless [`Capabilities`] grants them and the
//!   sandbox bundles them, local ones must be in the [`ModuleTable`]
//! - Every refused request is recorded in the realm's [`Violations`]
//! - Module sources see `Deno`, `process` and `global` as `undefined`, and
//!   `globalThis.Deno` is deleted once the ops are bound
//! - The controller accepts no new modules after the entry starts evaluating
//! - No op reaches the filesystem, processes or the network

mod capabilities;
mod error;
mod i18n;
mod js_error_impl;
mod markup;
mod module_table;
pub mod ops;

#[cfg(test)]
mod tests;

pub use capabilities::{BUILTIN_MODULES, Capabilities};
pub use error::{SandboxError, Violations};
pub use i18n::translate;
pub use markup::{VOID_ELEMENTS, compile_markup};
pub use module_table::{ENTRY_KEY, ModuleTable};
pub use ops::ExtensionName;

use rung_compiler::{CompiledModule, Loader};
use rung_config::LocaleStrings;

/// Registry key of the host controller, `Symbol.for(SANDBOX_KEY)` in JS
pub const SANDBOX_KEY: &str = "rung.sandbox";

// Parameters after `require` are never passed, shadowing host globals
const FACTORY_PARAMS: &str = "module, exports, require, Deno, process, global";

fn controller() -> String {
    format!("globalThis[Symbol.for({SANDBOX_KEY:?})]")
}

/// Script registering `module` in the realm's module registry.
///
/// JavaScript modules are wrapped in a factory evaluated on first `require`,
/// JSON modules are injected as values.
pub fn module_script(module: &CompiledModule) -> String {
    let key = serde_json::Value::String(module.key()).to_string();
    match module.loader {
        Loader::JavaScript => format!(
            "{}.define({key}, function ({FACTORY_PARAMS}) {{\n{}\n}});\n//# sourceURL=rung:{}",
            controller(),
            module.source,
            module.key(),
        ),
        Loader::Json => format!("{}.defineValue({key}, {});", controller(), module.source),
    }
}

/// Script evaluating the compiled entry source, see [`ENTRY_KEY`]
pub fn entry_script(source: &str) -> String {
    format!(
        "{}.evaluate(function ({FACTORY_PARAMS}) {{\n{source}\n}});\n//# sourceURL=rung:{ENTRY_KEY}",
        controller(),
    )
}

// Sandbox globals for Rung extensions.
// Initialize with the extension name, its module table, locale strings and
// the packages it may require.
deno_core::extension!(
    rung_runtime,
    ops = [
        ops::op_require,
        ops::op_render_markup,
        ops::op_translate,
        ops::op_log,
        ops::op_sleep,
    ],
    esm_entry_point = "ext:rung_runtime/runtime.js",
    esm = [ dir "src", "runtime.js" ],
    options = {
        name: String,
        modules: ModuleTable,
        strings: LocaleStrings,
        capabilities: Capabilities,
    },
    state = |state, options| {
        state.put(ExtensionName(options.name));
        state.put(options.modules);
        state.put(options.strings);
        state.put(options.capabilities);
        state.put(Violations::default());
    },
);
