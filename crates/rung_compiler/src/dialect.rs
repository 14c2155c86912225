use deno_ast::swc::ast::{CallExpr, Callee, ExportAll, Expr, ImportDecl, Lit, NamedExport, Str};
use deno_ast::swc::ecma_visit::{Visit, VisitWith};
use deno_ast::{
    EmitOptions, JsxClassicOptions, JsxRuntime, MediaType, ModuleKind, ModuleSpecifier,
    ParseParams, ParsedSource, SourceMapOption, TranspileModuleOptions, TranspileOptions,
};

use crate::{CompileError, Result};

/// JSX elements compile to calls of the sandbox's markup helper
const JSX_FACTORY: &str = "render";
const JSX_FRAGMENT_FACTORY: &str = "render.Fragment";

fn parse(source: &str) -> Result<ParsedSource> {
    let specifier = ModuleSpecifier::parse("file:///extension.jsx")
        .map_err(|e| CompileError::Transpile(e.to_string()))?;
    deno_ast::parse_module(ParseParams {
        specifier,
        text: source.into(),
        media_type: MediaType::Jsx,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| CompileError::Syntax(e.to_string()))
}

/// Compiles an extension module into plain script code.
///
/// `import`/`export` declarations become `require` calls and assignments on
/// `exports`, and JSX becomes `render(tag, props, ...children)` calls.
///
/// # Errors
///
/// Returns [`CompileError::Syntax`] when the source does not parse and
/// [`CompileError::Transpile`] when it cannot be emitted.
pub fn compile(source: &str) -> Result<String> {
    let parsed = parse(source)?;

    let transpiled = parsed
        .transpile(
            &TranspileOptions {
                jsx: Some(JsxRuntime::Classic(JsxClassicOptions {
                    factory: JSX_FACTORY.to_string(),
                    fragment_factory: JSX_FRAGMENT_FACTORY.to_string(),
                })),
                ..Default::default()
            },
            &TranspileModuleOptions {
                module_kind: Some(ModuleKind::Cjs),
            },
            &EmitOptions {
                source_map: SourceMapOption::None,
                inline_sources: false,
                ..Default::default()
            },
        )
        .map_err(|e| CompileError::Transpile(e.to_string()))?;

    Ok(transpiled.into_source().text)
}

/// Module specifiers an entry source depends on, in order of appearance.
///
/// Covers `import` declarations, re-exports and literal `require("...")` calls.
///
/// # Errors
///
/// Returns [`CompileError::Syntax`] when the source does not parse.
pub fn inspect(source: &str) -> Result<Vec<String>> {
    let parsed = parse(source)?;
    let mut collector = DependencyCollector::default();
    parsed.program().visit_with(&mut collector);
    Ok(collector.specifiers)
}

#[derive(Default)]
struct DependencyCollector {
    specifiers: Vec<String>,
}

impl DependencyCollector {
    fn push(&mut self, literal: &Str) {
        self.specifiers.push(literal.value.to_string());
    }
}

impl Visit for DependencyCollector {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        self.push(&node.src);
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        if let Some(src) = &node.src {
            self.push(src);
        }
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        self.push(&node.src);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee
            && let Expr::Ident(ident) = &**callee
            && &*ident.sym == "require"
            && let [arg] = node.args.as_slice()
            && arg.spread.is_none()
            && let Expr::Lit(Lit::Str(literal)) = &*arg.expr
        {
            self.push(literal);
        }
        node.visit_children_with(self);
    }
}
