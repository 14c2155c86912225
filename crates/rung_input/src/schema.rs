use indexmap::IndexMap;
use log::warn;
use rung_types::TypeDescriptor;
use serde::Deserialize;
use serde_json::Value;

use crate::{InputError, Result};

/// Declared parameters by name, in prompt order
pub type Schema = IndexMap<String, ParamSpec>;

/// One entry of `config.params`
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: TypeDescriptor,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Text shown when asking for the parameter
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(rename = "type")]
    ty: Value,
    description: Option<String>,
    // Older extensions label their params with `message`
    message: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Value,
}

/// Reads `config.params` into a [`Schema`].
///
/// Warns about parameters declared with the deprecated `message` field and
/// about parameters that are both `required` and carry a `default`.
///
/// # Errors
///
/// Returns [`InputError::Schema`] when a parameter is not an object or its
/// `type` is not a type descriptor.
pub fn parse_schema(config: &Value) -> Result<Schema> {
    let Some(params) = config.get("params").filter(|p| !p.is_null()) else {
        return Ok(Schema::new());
    };
    let Value::Object(params) = params else {
        return Err(InputError::Schema {
            name: "params".to_string(),
            message: format!("expected an object, found {params}"),
        });
    };

    let mut schema = Schema::with_capacity(params.len());
    for (name, param) in params {
        let raw = RawParam::deserialize(param).map_err(|e| InputError::Schema {
            name: name.clone(),
            message: e.to_string(),
        })?;
        let ty = TypeDescriptor::try_from(raw.ty).map_err(|e| InputError::Schema {
            name: name.clone(),
            message: e.to_string(),
        })?;

        let description = match (raw.description, raw.message) {
            (Some(description), _) => Some(description),
            (None, Some(message)) => {
                warn!("Parameter `{name}' uses the deprecated field `message', use `description' instead");
                Some(message)
            }
            (None, None) => None,
        };
        let default = Some(raw.default).filter(|d| !d.is_null());
        if raw.required && default.is_some() {
            warn!("Parameter `{name}' is required and has a default value, the default makes it optional");
        }

        schema.insert(
            name.clone(),
            ParamSpec {
                name: name.clone(),
                ty,
                description,
                required: raw.required,
                default,
            },
        );
    }
    Ok(schema)
}
