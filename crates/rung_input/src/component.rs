use rung_types::{TypeDescriptor, format_number};
use serde_json::Value;

use crate::ParamSpec;

/// How a parameter is asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Free text, the fallback for types without a dedicated prompt
    Input,
    Confirm,
    Select { choices: Vec<Choice> },
    MultiSelect { choices: Vec<Choice> },
    Date,
    Color,
    /// Free text with suggestions from an `autocomplete/<param>.js` source
    Autocomplete,
}

/// An entry of a list prompt: what is shown and what is answered
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub value: Value,
}

impl Component {
    pub fn for_type(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Checkbox => Self::Confirm,
            TypeDescriptor::Calendar | TypeDescriptor::DateTime => Self::Date,
            TypeDescriptor::Color => Self::Color,
            TypeDescriptor::AutoComplete => Self::Autocomplete,
            TypeDescriptor::OneOf { values } => Self::Select {
                choices: values
                    .iter()
                    .map(|value| Choice {
                        label: display(value),
                        value: value.clone(),
                    })
                    .collect(),
            },
            TypeDescriptor::SelectBox { values } => Self::Select {
                choices: keyed_choices(values),
            },
            TypeDescriptor::MultiSelectBox { values } => Self::MultiSelect {
                choices: keyed_choices(values),
            },
            _ => Self::Input,
        }
    }
}

fn keyed_choices(values: &indexmap::IndexMap<String, Value>) -> Vec<Choice> {
    values
        .iter()
        .map(|(key, label)| Choice {
            label: display(label),
            value: Value::String(key.clone()),
        })
        .collect()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        other => other.to_string(),
    }
}

/// Everything a [`Prompter`](crate::Prompter) needs to ask for one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub name: String,
    pub message: String,
    /// Human label of the parameter type, e.g. `IntegerRange(1, 5)`
    pub type_name: String,
    pub component: Component,
    pub default: Option<Value>,
    pub required: bool,
    /// 1 on the first ask, incremented on every reprompt
    pub attempt: u32,
}

impl Question {
    pub fn new(param: &ParamSpec) -> Self {
        Self {
            name: param.name.clone(),
            message: param.label().to_string(),
            type_name: param.ty.type_name(),
            component: Component::for_type(&param.ty),
            default: param.default.clone(),
            required: param.required,
            attempt: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn test_component_mapping() {
        assert_eq!(Component::for_type(&TypeDescriptor::Checkbox), Component::Confirm);
        assert_eq!(Component::for_type(&TypeDescriptor::Calendar), Component::Date);
        assert_eq!(Component::for_type(&TypeDescriptor::Color), Component::Color);
        assert_eq!(
            Component::for_type(&TypeDescriptor::AutoComplete),
            Component::Autocomplete
        );
        assert_eq!(Component::for_type(&TypeDescriptor::Money), Component::Input);
        assert_eq!(
            Component::for_type(&TypeDescriptor::Unknown("Hologram".into())),
            Component::Input
        );
    }

    #[test]
    fn test_select_choices() {
        let one_of = TypeDescriptor::OneOf {
            values: vec![json!("A"), json!(2)],
        };
        assert_eq!(
            Component::for_type(&one_of),
            Component::Select {
                choices: vec![
                    Choice { label: "A".into(), value: json!("A") },
                    Choice { label: "2".into(), value: json!(2) },
                ]
            }
        );

        let values = IndexMap::from([
            ("br".to_string(), json!("Brazil")),
            ("pt".to_string(), json!("Portugal")),
        ]);
        let Component::MultiSelect { choices } =
            Component::for_type(&TypeDescriptor::MultiSelectBox { values })
        else {
            panic!("expected a multi select");
        };
        assert_eq!(choices[1], Choice { label: "Portugal".into(), value: json!("pt") });
    }

    #[test]
    fn test_question_from_param() {
        let param = ParamSpec {
            name: "size".into(),
            ty: TypeDescriptor::Char { length: 10 },
            description: None,
            required: true,
            default: None,
        };
        let question = Question::new(&param);
        assert_eq!(question.message, "size");
        assert_eq!(question.type_name, "Char(10)");
        assert_eq!(question.component, Component::Input);
        assert_eq!(question.attempt, 1);
    }
}
