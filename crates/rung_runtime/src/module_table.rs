//! Keys under which compiled local modules can be required

use std::collections::HashMap;

use rung_compiler::{CompiledModule, normalize_specifier};

/// Referrer used for `require` calls made by the entry source
pub const ENTRY_KEY: &str = "./index.js";

/// Compiled local modules of one extension.
///
/// Each module answers to its full key (`./lib/util.js`) and to the key
/// without extension (`./lib/util`). When two modules share the partial key
/// the first one registered keeps it.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: Vec<CompiledModule>,
    aliases: HashMap<String, usize>,
}

impl ModuleTable {
    pub fn new(modules: Vec<CompiledModule>) -> Self {
        let mut aliases = HashMap::new();
        for (index, module) in modules.iter().enumerate() {
            aliases.entry(module.key()).or_insert(index);
        }
        for (index, module) in modules.iter().enumerate() {
            aliases.entry(module.partial_key()).or_insert(index);
        }
        Self { modules, aliases }
    }

    /// Module a local `specifier` names when required from `referrer`.
    pub fn resolve(&self, specifier: &str, referrer: &str) -> Option<&CompiledModule> {
        let base = match referrer.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => ".",
        };
        let relative = normalize_specifier(&format!("{base}/{specifier}"));
        let key = if relative.starts_with("../") {
            relative
        } else {
            format!("./{relative}")
        };
        self.aliases.get(&key).map(|&index| &self.modules[index])
    }
}

impl From<Vec<CompiledModule>> for ModuleTable {
    fn from(modules: Vec<CompiledModule>) -> Self {
        Self::new(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rung_compiler::Loader;

    fn module(identifier: &str, loader: Loader) -> CompiledModule {
        CompiledModule {
            identifier: identifier.into(),
            source: String::new(),
            loader,
        }
    }

    fn table() -> ModuleTable {
        ModuleTable::new(vec![
            module("foo.js", Loader::JavaScript),
            module("foo.json", Loader::Json),
            module("lib/util.js", Loader::JavaScript),
            module("../shared/strings.json", Loader::Json),
        ])
    }

    fn resolved(table: &ModuleTable, specifier: &str, referrer: &str) -> Option<String> {
        table
            .resolve(specifier, referrer)
            .map(|m| m.identifier.clone())
    }

    #[test]
    fn test_full_and_partial_keys() {
        let table = table();
        assert_eq!(resolved(&table, "./foo", ENTRY_KEY).as_deref(), Some("foo.js"));
        assert_eq!(resolved(&table, "./foo.js", ENTRY_KEY).as_deref(), Some("foo.js"));
        assert_eq!(resolved(&table, "./foo.json", ENTRY_KEY).as_deref(), Some("foo.json"));
        assert_eq!(resolved(&table, "./bar", ENTRY_KEY), None);
    }

    #[test]
    fn test_relative_to_referrer() {
        let table = table();
        assert_eq!(
            resolved(&table, "../foo", "./lib/util.js").as_deref(),
            Some("foo.js")
        );
        assert_eq!(
            resolved(&table, "./lib/../lib/util", ENTRY_KEY).as_deref(),
            Some("lib/util.js")
        );
        assert_eq!(
            resolved(&table, "../shared/strings.json", ENTRY_KEY).as_deref(),
            Some("../shared/strings.json")
        );
    }
}
