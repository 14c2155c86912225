//! Errors raised by the sandbox while an extension runs

/// A module request the sandbox refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// A package outside the capability table
    #[error("Access denied to require '{0}': disallowed dependency")]
    DisallowedDependency(String),
    /// A local path with no entry in the module table
    #[error("Cannot find module '{0}': unknown module")]
    UnknownModule(String),
}

crate::impl_js_error_class!(SandboxError);

/// Every refused module request of one sandbox, in order
#[derive(Debug, Clone, Default)]
pub struct Violations(Vec<SandboxError>);

impl Violations {
    pub(crate) fn record(&mut self, error: SandboxError) {
        self.0.push(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SandboxError> {
        self.0.iter()
    }
}
