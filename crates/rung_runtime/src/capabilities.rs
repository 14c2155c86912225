//! Which package specifiers an extension may `require`

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::SandboxError;

/// Modules bundled with the sandbox itself
pub const BUILTIN_MODULES: &[&str] = &["rung-sdk", "rung-sdk/dist/types", "rung-cli/dist/types"];

/// Packages shipping the builtin modules
const SDK_PACKAGES: &[&str] = &["rung-sdk", "rung-cli"];

/// Package names an extension may require.
///
/// A name grants itself and every path below it (`rung-sdk` grants
/// `rung-sdk/dist/types`), so scoped packages need a single entry. Local
/// paths are never checked here.
#[derive(Debug, Clone)]
pub struct Capabilities {
    packages: Arc<HashSet<String>>,
}

impl Capabilities {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: Arc::new(packages.into_iter().map(Into::into).collect()),
        }
    }

    /// Only the bundled SDK
    pub fn sdk() -> Self {
        Self::new(SDK_PACKAGES.iter().copied())
    }

    pub fn deny_all() -> Self {
        Self::new(std::iter::empty::<String>())
    }

    pub fn allows(&self, specifier: &str) -> bool {
        if self.packages.contains(specifier) {
            return true;
        }
        // `@scope/pkg/sub` is checked against `@scope/pkg`, then `@scope`
        specifier
            .match_indices('/')
            .any(|(i, _)| self.packages.contains(&specifier[..i]))
    }

    /// # Errors
    ///
    /// Returns [`SandboxError::DisallowedDependency`] when `specifier` is not granted
    pub fn check(&self, specifier: &str) -> Result<(), SandboxError> {
        if self.allows(specifier) {
            Ok(())
        } else {
            Err(SandboxError::DisallowedDependency(specifier.to_string()))
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::sdk()
    }
}
