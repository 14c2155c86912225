//! Local module discovery
//!
//! Only specifiers starting with `./` or `../` are inlined; package names are
//! left for the sandbox to allow or deny. Resolution is one level deep: the
//! modules found here are not scanned for further local dependencies.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{CompileError, Result, compile, inspect};

/// How a module's source is evaluated inside the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    JavaScript,
    Json,
}

impl Loader {
    /// Loader for a module path, chosen by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownLoader`] for anything but `.js` and `.json`.
    pub fn from_path(path: &str) -> Result<Self> {
        match Utf8Path::new(path).extension() {
            Some("js") => Ok(Self::JavaScript),
            Some("json") => Ok(Self::Json),
            _ => Err(CompileError::UnknownLoader(path.to_string())),
        }
    }
}

/// A local module ready for the sandbox's module table.
///
/// `identifier` is the module path relative to the extension directory
/// (`lib/util.js`, `../shared/strings.json`). JSON sources are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledModule {
    pub identifier: String,
    pub source: String,
    pub loader: Loader,
}

fn is_local(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Lexically resolves `.` and `..` in a relative specifier, dropping the
/// leading `./`. Leading `..` segments that escape the base are kept.
pub fn normalize_specifier(specifier: &str) -> String {
    let mut parts: Vec<&str> = vec![];
    for component in Utf8Path::new(specifier).components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            Utf8Component::Normal(part) => parts.push(part),
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

/// Compiles the local modules `source` refers to, relative to `dir`.
///
/// # Errors
///
/// Fails when the entry source does not parse, a module has an unsupported
/// extension, cannot be read or does not compile.
pub async fn compile_modules_from_source(
    source: &str,
    dir: &Utf8Path,
) -> Result<Vec<CompiledModule>> {
    let specifiers = inspect(source)?
        .into_iter()
        .filter(|s| is_local(s))
        .map(|s| normalize_specifier(&s));

    let mut seen = std::collections::HashSet::new();
    let mut modules = vec![];
    for specifier in specifiers {
        let identifier = resolve_identifier(dir, &specifier).await?;
        if seen.insert(identifier.clone()) {
            modules.push(compile_module(dir, &identifier).await?);
        }
    }
    Ok(modules)
}

// Specifiers without an extension probe `.js`, then `.json`
async fn resolve_identifier(dir: &Utf8Path, specifier: &str) -> Result<String> {
    if Utf8Path::new(specifier).extension().is_some() {
        Loader::from_path(specifier)?;
        return Ok(specifier.to_string());
    }

    for extension in ["js", "json"] {
        let candidate = format!("{specifier}.{extension}");
        if tokio::fs::try_exists(dir.join(&candidate))
            .await
            .unwrap_or(false)
        {
            return Ok(candidate);
        }
    }
    Ok(format!("{specifier}.js"))
}

/// Reads and compiles a single module at `identifier` relative to `dir`.
///
/// # Errors
///
/// Fails for unsupported extensions, unreadable files and invalid sources.
pub async fn compile_module(dir: &Utf8Path, identifier: &str) -> Result<CompiledModule> {
    let loader = Loader::from_path(identifier)?;
    let path = dir.join(identifier);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CompileError::Io {
            path: path.clone(),
            source,
        })?;

    let source = match loader {
        Loader::JavaScript => compile(&contents)?,
        Loader::Json => {
            let value: serde_json::Value =
                serde_json::from_str(&contents).map_err(|source| CompileError::Json {
                    path: path.clone(),
                    source,
                })?;
            value.to_string()
        }
    };
    debug!("Compiled module {identifier}");

    Ok(CompiledModule {
        identifier: identifier.to_string(),
        source,
        loader,
    })
}

/// Compiles every `.js`/`.json` file one or two levels below `dir`, except
/// the entry `index.js`, `node_modules` and hidden folders.
///
/// # Errors
///
/// Fails when `dir` cannot be listed or any module fails to compile.
pub async fn find_and_compile_modules(dir: &Utf8Path) -> Result<Vec<CompiledModule>> {
    let mut identifiers = vec![];
    for (name, is_dir) in list_dir(dir).await? {
        if is_dir {
            if name == "node_modules" || name.starts_with('.') {
                continue;
            }
            for (nested, nested_is_dir) in list_dir(&dir.join(&name)).await? {
                if !nested_is_dir && is_module_file(&nested) {
                    identifiers.push(format!("{name}/{nested}"));
                }
            }
        } else if is_module_file(&name) && name != "index.js" {
            identifiers.push(name);
        }
    }
    identifiers.sort();

    let compiled = identifiers
        .iter()
        .map(|identifier| compile_module(dir, identifier));
    futures::future::try_join_all(compiled).await
}

fn is_module_file(name: &str) -> bool {
    Loader::from_path(name).is_ok()
}

async fn list_dir(dir: &Utf8Path) -> Result<Vec<(String, bool)>> {
    let io_err = |source| CompileError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut listed = vec![];
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_dir = entry.file_type().await.map_err(io_err)?.is_dir();
        listed.push((name, is_dir));
    }
    Ok(listed)
}

impl CompiledModule {
    /// Path of the module relative to the extension, as written in a `require`
    pub fn key(&self) -> String {
        if self.identifier.starts_with("../") {
            self.identifier.clone()
        } else {
            format!("./{}", self.identifier)
        }
    }

    /// Same as [`Self::key`] without the file extension
    pub fn partial_key(&self) -> String {
        let key = self.key();
        match Utf8Path::new(&key).extension() {
            Some(extension) => key[..key.len() - extension.len() - 1].to_string(),
            None => key,
        }
    }
}
