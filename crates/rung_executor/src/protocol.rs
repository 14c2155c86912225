use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How an extension's handler delivers its result, decided by its declared arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    /// `extension(context)`: the return value, or the value of the returned promise
    Sync,
    /// `extension(context, done)`: the value passed to `done`, the return value is ignored
    Callback,
}

impl InvocationMode {
    pub fn from_arity(arity: u32) -> Self {
        if arity > 1 { Self::Callback } else { Self::Sync }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Callback => "callback",
        }
    }
}

/// Who runs the extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

/// The first argument every extension receives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationContext {
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl InvocationContext {
    pub fn new(params: Map<String, Value>) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_db(mut self, db: Option<Value>) -> Self {
        self.db = db;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, name: impl Into<String>) -> Self {
        self.user = Some(User { name: name.into() });
        self
    }
}

/// What a successful run produced.
///
/// `db` is `None` when the extension did not return one, which clears the
/// persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionResult {
    pub alerts: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<Value>,
}

/// Handler shape reported by the sandbox
#[derive(Debug, Deserialize)]
pub(crate) struct Probe {
    pub(crate) callable: bool,
    pub(crate) arity: u32,
}

/// Settled handler value reported by the sandbox
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Settled {
    pub(crate) alerts: Value,
    pub(crate) has_db: bool,
    pub(crate) db: Value,
    pub(crate) unsupported: Option<String>,
}
