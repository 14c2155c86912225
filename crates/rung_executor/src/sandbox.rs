use std::rc::Rc;
use std::sync::LazyLock;

use deno_core::error::ModuleLoaderError;
use deno_core::{
    JsRuntime, ModuleLoadResponse, ModuleSpecifier, PollEventLoopOptions, RequestedModuleType,
    ResolutionKind, RuntimeOptions, serde_v8, v8,
};
use log::debug;
use rung_compiler::CompiledModule;
use rung_config::LocaleStrings;
use rung_runtime::{Capabilities, ModuleTable, SANDBOX_KEY, Violations};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::protocol::{ExtensionResult, InvocationMode, Probe, Settled};
use crate::{ExecutionError, ExecutorError, Result};

// Initialize V8 platform once
static V8_PLATFORM: LazyLock<()> = LazyLock::new(|| JsRuntime::init_platform(None, false));

// Reported by deno_core when the awaited promise can no longer settle
const PENDING_PROMISE: &str = "still pending";

/// Module loader that refuses every ES module request, dynamic `import()` included.
/// Local modules and the SDK are served by the sandbox's `require` instead.
struct DenyAllModuleLoader;

impl deno_core::ModuleLoader for DenyAllModuleLoader {
    fn resolve(
        &self,
        specifier: &str,
        _referrer: &str,
        _kind: ResolutionKind,
    ) -> std::result::Result<ModuleSpecifier, ModuleLoaderError> {
        Err(ModuleLoaderError::generic(format!(
            "Access denied to import '{specifier}': use require instead"
        )))
    }

    fn load(
        &self,
        module_specifier: &ModuleSpecifier,
        _maybe_referrer: Option<&deno_core::ModuleLoadReferrer>,
        _is_dyn_import: bool,
        _requested_module_type: RequestedModuleType,
    ) -> ModuleLoadResponse {
        let error = ModuleLoaderError::generic(format!("Module not found: {module_specifier}"));
        ModuleLoadResponse::Sync(Err(error))
    }
}

fn controller_call(call: &str) -> String {
    format!("globalThis[Symbol.for({SANDBOX_KEY:?})].{call}")
}

/// Configures a fresh sandbox.
///
/// ```rust,no_run
/// use rung_executor::SandboxBuilder;
///
/// # fn example() -> rung_executor::Result<()> {
/// let mut module = SandboxBuilder::new("hello")
///     .build()?
///     .evaluate("module.exports = { extension: ctx => ['Hello'] };")?;
/// let config = module.config()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SandboxBuilder {
    name: String,
    strings: LocaleStrings,
    modules: Vec<CompiledModule>,
    capabilities: Capabilities,
}

impl SandboxBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strings: LocaleStrings::default(),
            modules: vec![],
            capabilities: Capabilities::sdk(),
        }
    }

    #[must_use]
    pub fn with_strings(mut self, strings: LocaleStrings) -> Self {
        self.strings = strings;
        self
    }

    #[must_use]
    pub fn with_modules(mut self, modules: Vec<CompiledModule>) -> Self {
        self.modules = modules;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Creates the realm and registers the local modules in it.
    ///
    /// # Errors
    ///
    /// Fails when the JavaScript runtime cannot be created or a JSON module
    /// does not evaluate.
    pub fn build(self) -> Result<Sandbox> {
        LazyLock::force(&V8_PLATFORM);

        let scripts = self
            .modules
            .iter()
            .map(rung_runtime::module_script)
            .collect::<Vec<_>>();

        let runtime = JsRuntime::try_new(RuntimeOptions {
            module_loader: Some(Rc::new(DenyAllModuleLoader)),
            extensions: vec![rung_runtime::rung_runtime::init(
                self.name.clone(),
                ModuleTable::new(self.modules),
                self.strings,
                self.capabilities,
            )],
            ..Default::default()
        })
        .map_err(|e| ExecutorError::Internal(format!("Failed to create sandbox: {e}")))?;

        let mut sandbox = Sandbox {
            runtime,
            name: self.name,
        };
        for script in scripts {
            sandbox.execute(script)?;
        }
        debug!("Created sandbox for {}", sandbox.name);
        Ok(sandbox)
    }
}

/// An isolated realm with the Rung globals and an extension's local modules
pub struct Sandbox {
    runtime: JsRuntime,
    name: String,
}

impl Sandbox {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the compiled entry source once and keeps its export.
    ///
    /// # Errors
    ///
    /// Any exception thrown while evaluating, including refused `require` calls.
    pub fn evaluate(mut self, compiled_source: &str) -> Result<ExportedModule> {
        self.execute(rung_runtime::entry_script(compiled_source))?;
        Ok(ExportedModule { sandbox: self })
    }

    fn execute(&mut self, script: String) -> Result<v8::Global<v8::Value>> {
        self.runtime
            .execute_script("<rung>", script)
            .map_err(|e| self.classify(&e.to_string()))
    }

    async fn settle(&mut self, value: v8::Global<v8::Value>) -> Result<v8::Global<v8::Value>> {
        let resolve_future = self.runtime.resolve(value);
        let resolved = self
            .runtime
            .with_event_loop_promise(resolve_future, PollEventLoopOptions::default())
            .await;
        resolved.map_err(|e| self.classify(&e.to_string()))
    }

    fn to_json<T: DeserializeOwned>(&mut self, value: v8::Global<v8::Value>) -> Result<T> {
        let json_value = {
            deno_core::scope!(scope, &mut self.runtime);
            let local = v8::Local::new(scope, value);
            serde_v8::from_v8::<Value>(scope, local).map_err(|e| {
                ExecutorError::Internal(format!("Failed to convert result to JSON: {e}"))
            })?
        };

        serde_json::from_value(json_value)
            .map_err(|e| ExecutorError::Internal(format!("Unexpected sandbox value: {e}")))
    }

    // A refused require surfaces as an ordinary exception, match it back
    fn classify(&self, error: &str) -> ExecutorError {
        let op_state = self.runtime.op_state();
        let op_state = op_state.borrow();
        let violation = op_state
            .borrow::<Violations>()
            .iter()
            .rev()
            .find(|violation| error.contains(&violation.to_string()))
            .cloned();

        match violation {
            Some(violation) => ExecutorError::Sandbox(violation),
            None => ExecutorError::Runtime(ExecutionError::from_js(error)),
        }
    }
}

/// The evaluated entry of an extension, ready to be introspected or invoked
pub struct ExportedModule {
    sandbox: Sandbox,
}

impl ExportedModule {
    pub fn name(&self) -> &str {
        self.sandbox.name()
    }

    /// The exported `config`, `{}` when there is none.
    ///
    /// # Errors
    ///
    /// Fails when reading the config throws.
    pub fn config(&mut self) -> Result<Value> {
        let value = self.sandbox.execute(controller_call("config()"))?;
        self.sandbox.to_json(value)
    }

    /// Calling convention of the exported handler.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvocationType`] when the handler is not callable.
    pub fn invocation_mode(&mut self) -> Result<InvocationMode> {
        let value = self.sandbox.execute(controller_call("probe()"))?;
        let probe: Probe = self.sandbox.to_json(value)?;
        if !probe.callable {
            return Err(ExecutorError::InvocationType);
        }
        Ok(InvocationMode::from_arity(probe.arity))
    }

    /// Invokes the handler with `context`, usually an
    /// [`InvocationContext`](crate::InvocationContext), and waits for its result.
    ///
    /// # Errors
    ///
    /// Fails when the handler is not callable, throws or rejects, never calls
    /// `done`, or returns a `db` that cannot be persisted.
    pub async fn invoke<C: Serialize>(&mut self, context: &C) -> Result<ExtensionResult> {
        let mode = self.invocation_mode()?;
        debug!("Invoking {} in {} mode", self.name(), mode.as_str());

        let context = serde_json::to_string(context)
            .map_err(|e| ExecutorError::Internal(format!("Invalid invocation context: {e}")))?;
        let promise = self.sandbox.execute(controller_call(&format!(
            "invoke({context}, {:?})",
            mode.as_str()
        )))?;

        let settled = match self.sandbox.settle(promise).await {
            Ok(settled) => settled,
            Err(ExecutorError::Runtime(e)) if e.message.contains(PENDING_PROMISE) => {
                let message = match mode {
                    InvocationMode::Callback => "Extension finished without calling done",
                    InvocationMode::Sync => "Extension finished without resolving its result",
                };
                return Err(ExecutorError::Runtime(ExecutionError {
                    message: message.to_string(),
                    stack: None,
                }));
            }
            Err(e) => return Err(e),
        };

        let settled: Settled = self.sandbox.to_json(settled)?;
        if let Some(type_name) = settled.unsupported {
            return Err(ExecutorError::Persistence(type_name));
        }

        Ok(ExtensionResult {
            alerts: settled.alerts,
            db: settled.has_db.then_some(settled.db),
        })
    }
}

/// Evaluates `compiled_source` in a new sandbox, see [`SandboxBuilder`].
///
/// # Errors
///
/// Fails when the sandbox cannot be created or the entry throws.
pub fn run_in_sandbox(
    name: &str,
    compiled_source: &str,
    strings: LocaleStrings,
    modules: Vec<CompiledModule>,
) -> Result<ExportedModule> {
    SandboxBuilder::new(name)
        .with_strings(strings)
        .with_modules(modules)
        .build()?
        .evaluate(compiled_source)
}
