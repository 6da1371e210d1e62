use std::collections::BTreeMap;

use crate::expr::Expr;
use crate::transform::{BlurAction, InputMask};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported field data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Enum,
    File,
    List,
}

/// Base constraints checked after type coercion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Constraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

/// Named predicates evaluated last, once every base constraint has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    Email,
    Positive,
    Accepted,
    MediaType { allow: Vec<String> },
}

/// When a field re-validates after its value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidateOn {
    #[default]
    Change,
    Blur,
}

/// User-facing messages, one per validation stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FieldMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
}

/// Definition of a repeatable sub-record whose entries share field definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
}

/// Definition of a single field inside a form record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_if: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<Check>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<InputMask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_blur: Option<BlurAction>,
    #[serde(default)]
    pub validate_on: ValidateOn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListSpec>,
    #[serde(default)]
    pub messages: FieldMessages,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            section: None,
            required: false,
            choices: None,
            choice_labels: None,
            default_value: None,
            active_if: None,
            constraint: None,
            check: None,
            mask: None,
            on_blur: None,
            validate_on: ValidateOn::Change,
            list: None,
            messages: FieldMessages::default(),
        }
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.messages.required = Some(message.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(choices.iter().map(|choice| choice.to_string()).collect());
        self
    }

    pub fn choice_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.choice_labels = Some(
            labels
                .iter()
                .map(|(choice, label)| (choice.to_string(), label.to_string()))
                .collect(),
        );
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn active_if(mut self, condition: Expr) -> Self {
        self.active_if = Some(condition);
        self
    }

    pub fn invalid_type(mut self, message: impl Into<String>) -> Self {
        self.messages.invalid_type = Some(message.into());
        self
    }

    pub fn min_len(mut self, min_len: usize, message: impl Into<String>) -> Self {
        self.constraint_mut().min_len = Some(min_len);
        self.messages.length = Some(message.into());
        self
    }

    pub fn min(mut self, min: f64, message: impl Into<String>) -> Self {
        self.constraint_mut().min = Some(min);
        self.messages.range = Some(message.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.constraint_mut().pattern = Some(pattern.into());
        self.messages.pattern = Some(message.into());
        self
    }

    pub fn check(mut self, check: Check, message: impl Into<String>) -> Self {
        self.check = Some(check);
        self.messages.check = Some(message.into());
        self
    }

    pub fn mask(mut self, mask: InputMask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn on_blur(mut self, action: BlurAction) -> Self {
        self.on_blur = Some(action);
        self
    }

    pub fn validate_on_blur(mut self) -> Self {
        self.validate_on = ValidateOn::Blur;
        self
    }

    pub fn list(mut self, list: ListSpec) -> Self {
        self.list = Some(list);
        self
    }

    fn constraint_mut(&mut self) -> &mut Constraint {
        self.constraint.get_or_insert_with(Constraint::default)
    }

    /// Looks up a sub-field definition of a list field.
    pub fn entry_field(&self, id: &str) -> Option<&FieldSpec> {
        self.list
            .as_ref()
            .and_then(|list| list.fields.iter().find(|field| field.id == id))
    }
}
