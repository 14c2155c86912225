use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::number::format_number;

#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("Type descriptor must be an object with a `name`, got {0}")]
    NotADescriptor(String),

    #[error("Type `{name}` requires field `{field}`")]
    MissingField { name: String, field: &'static str },

    #[error("Type `{name}` has an invalid `{field}`: {value}")]
    InvalidField {
        name: String,
        field: &'static str,
        value: String,
    },
}

/// Parameter type declared by an extension.
///
/// Names the host does not know are kept as [`TypeDescriptor::Unknown`] so the
/// input pipeline can fall back to free text instead of rejecting the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum TypeDescriptor {
    Integer,
    Double,
    Natural,
    DateTime,
    Calendar,
    Char { length: usize },
    IntegerRange { from: i64, to: i64 },
    DoubleRange { from: f64, to: f64 },
    IntegerMultiRange { from: i64, to: i64 },
    Money,
    String,
    Color,
    Email,
    Checkbox,
    OneOf { values: Vec<Value> },
    Url,
    SelectBox { values: IndexMap<String, Value> },
    MultiSelectBox { values: IndexMap<String, Value> },
    AutoComplete,
    Location,
    File,
    Unknown(String),
}

impl TypeDescriptor {
    /// Tag carried in the `name` field of the JSON form
    pub fn name(&self) -> &str {
        match self {
            Self::Integer => "Integer",
            Self::Double => "Double",
            Self::Natural => "Natural",
            Self::DateTime => "DateTime",
            Self::Calendar => "Calendar",
            Self::Char { .. } => "Char",
            Self::IntegerRange { .. } => "IntegerRange",
            Self::DoubleRange { .. } => "DoubleRange",
            Self::IntegerMultiRange { .. } => "IntegerMultiRange",
            Self::Money => "Money",
            Self::String => "String",
            Self::Color => "Color",
            Self::Email => "Email",
            Self::Checkbox => "Checkbox",
            Self::OneOf { .. } => "OneOf",
            Self::Url => "Url",
            Self::SelectBox { .. } => "SelectBox",
            Self::MultiSelectBox { .. } => "MultiSelectBox",
            Self::AutoComplete => "AutoComplete",
            Self::Location => "Location",
            Self::File => "File",
            Self::Unknown(name) => name,
        }
    }

    /// Human readable label including the type's parameters
    pub fn type_name(&self) -> String {
        match self {
            Self::Char { length } => format!("Char({length})"),
            Self::IntegerRange { from, to } => format!("IntegerRange({from}, {to})"),
            Self::DoubleRange { from, to } => format!(
                "DoubleRange({}, {})",
                format_number(*from),
                format_number(*to)
            ),
            Self::IntegerMultiRange { from, to } => format!("IntegerMultiRange({from}, {to})"),
            Self::OneOf { values } => {
                let joined = values.iter().map(join_item).collect::<Vec<_>>().join(", ");
                format!("OneOf([{joined}])")
            }
            Self::SelectBox { values } => format!("SelectBox({})", compact_json(values)),
            Self::MultiSelectBox { values } => {
                format!("MultiSelectBox({})", compact_json(values))
            }
            other => other.name().to_string(),
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

// Array.prototype.join formatting: strings bare, null empty, numbers in JS notation
fn join_item(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        other => other.to_string(),
    }
}

fn compact_json(values: &IndexMap<String, Value>) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

impl TryFrom<Value> for TypeDescriptor {
    type Error = DescriptorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(obj) = value else {
            return Err(DescriptorError::NotADescriptor(value.to_string()));
        };
        let Some(name) = obj.get("name").and_then(Value::as_str) else {
            return Err(DescriptorError::NotADescriptor(
                Value::Object(obj).to_string(),
            ));
        };
        let name = name.to_string();

        Ok(match name.as_str() {
            "Integer" => Self::Integer,
            "Double" => Self::Double,
            "Natural" => Self::Natural,
            "DateTime" => Self::DateTime,
            "Calendar" => Self::Calendar,
            "Money" => Self::Money,
            "String" => Self::String,
            "Color" => Self::Color,
            "Email" => Self::Email,
            "Checkbox" => Self::Checkbox,
            "Url" => Self::Url,
            "AutoComplete" => Self::AutoComplete,
            "Location" => Self::Location,
            "File" => Self::File,
            "Char" => {
                let length = field(&obj, &name, "length")?;
                let length = length
                    .as_u64()
                    .and_then(|l| usize::try_from(l).ok())
                    .ok_or_else(|| invalid(&name, "length", length))?;
                Self::Char { length }
            }
            "IntegerRange" => {
                let (from, to) = integer_bounds(&obj, &name)?;
                Self::IntegerRange { from, to }
            }
            "IntegerMultiRange" => {
                let (from, to) = integer_bounds(&obj, &name)?;
                Self::IntegerMultiRange { from, to }
            }
            "DoubleRange" => {
                let from = field(&obj, &name, "from")?;
                let to = field(&obj, &name, "to")?;
                Self::DoubleRange {
                    from: from.as_f64().ok_or_else(|| invalid(&name, "from", from))?,
                    to: to.as_f64().ok_or_else(|| invalid(&name, "to", to))?,
                }
            }
            "OneOf" => {
                let values = field(&obj, &name, "values")?;
                let Value::Array(items) = values else {
                    return Err(invalid(&name, "values", values));
                };
                Self::OneOf {
                    values: items.clone(),
                }
            }
            "SelectBox" | "MultiSelectBox" => {
                let values = field(&obj, &name, "values")?;
                let Value::Object(map) = values else {
                    return Err(invalid(&name, "values", values));
                };
                let values = map
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<IndexMap<_, _>>();
                if name == "SelectBox" {
                    Self::SelectBox { values }
                } else {
                    Self::MultiSelectBox { values }
                }
            }
            _ => Self::Unknown(name),
        })
    }
}

fn field<'a>(
    obj: &'a Map<String, Value>,
    name: &str,
    field: &'static str,
) -> Result<&'a Value, DescriptorError> {
    obj.get(field).ok_or_else(|| DescriptorError::MissingField {
        name: name.to_string(),
        field,
    })
}

fn invalid(name: &str, field: &'static str, value: &Value) -> DescriptorError {
    DescriptorError::InvalidField {
        name: name.to_string(),
        field,
        value: value.to_string(),
    }
}

fn integer_bounds(obj: &Map<String, Value>, name: &str) -> Result<(i64, i64), DescriptorError> {
    let from = field(obj, name, "from")?;
    let to = field(obj, name, "to")?;
    Ok((
        as_integer(from).ok_or_else(|| invalid(name, "from", from))?,
        as_integer(to).ok_or_else(|| invalid(name, "to", to))?,
    ))
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

impl From<TypeDescriptor> for Value {
    fn from(descriptor: TypeDescriptor) -> Self {
        let name = descriptor.name().to_string();
        match descriptor {
            TypeDescriptor::Char { length } => json!({ "name": name, "length": length }),
            TypeDescriptor::IntegerRange { from, to }
            | TypeDescriptor::IntegerMultiRange { from, to } => {
                json!({ "name": name, "from": from, "to": to })
            }
            TypeDescriptor::DoubleRange { from, to } => {
                json!({ "name": name, "from": from, "to": to })
            }
            TypeDescriptor::OneOf { values } => json!({ "name": name, "values": values }),
            TypeDescriptor::SelectBox { values } | TypeDescriptor::MultiSelectBox { values } => {
                json!({ "name": name, "values": values })
            }
            _ => json!({ "name": name }),
        }
    }
}
