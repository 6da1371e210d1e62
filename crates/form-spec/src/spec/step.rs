use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier for form steps.
pub type StepId = String;

/// Role a step plays in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Informational step without owned fields.
    Display,
    /// Step collecting the fields it owns.
    Fields,
    /// Read-only summary of the whole record.
    Review,
}

/// Static content shown by display steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayContent {
    pub heading: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
}

/// A single step of a staged form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepSpec {
    pub id: StepId,
    pub title: String,
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<DisplayContent>,
}

impl StepSpec {
    pub fn display(id: &str, title: &str, content: DisplayContent) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: StepKind::Display,
            fields: Vec::new(),
            content: Some(content),
        }
    }

    pub fn fields(id: &str, title: &str, fields: &[&str]) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: StepKind::Fields,
            fields: fields.iter().map(|field| field.to_string()).collect(),
            content: None,
        }
    }

    pub fn review(id: &str, title: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: StepKind::Review,
            fields: Vec::new(),
            content: None,
        }
    }

    pub fn owns_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}
