use std::collections::BTreeSet;

use crate::spec::field::{FieldKind, FieldSpec};
use crate::spec::step::StepSpec;
use crate::spec::validation::CrossFieldValidation;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural problems detected while verifying a form definition.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("form '{0}' declares no steps")]
    NoSteps(String),
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("step '{step}' owns unknown field '{field}'")]
    UnknownStepField { step: String, field: String },
    #[error("validation '{rule}' reads unknown field '{field}'")]
    UnknownRuleField { rule: String, field: String },
    #[error("field '{0}' is a list without entry fields")]
    MissingListDefinition(String),
    #[error("field '{field}' has an invalid pattern")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

/// Top-level record schema: ordered fields, steps and cross-field refinements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<StepSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<CrossFieldValidation>,
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        index.checked_sub(1).and_then(|idx| self.steps.get(idx))
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn field_ids(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.id.clone()).collect()
    }

    /// Checks that steps and validations only reference declared fields and
    /// that every pattern compiles.
    pub fn verify(&self) -> Result<(), SpecError> {
        if self.steps.is_empty() {
            return Err(SpecError::NoSteps(self.id.clone()));
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(SpecError::DuplicateField(field.id.clone()));
            }
            verify_field(field)?;
        }

        for step in &self.steps {
            if let Some(field) = step.fields.iter().find(|id| !seen.contains(id.as_str())) {
                return Err(SpecError::UnknownStepField {
                    step: step.id.clone(),
                    field: field.clone(),
                });
            }
        }

        for rule in &self.validations {
            let unknown = rule
                .reads()
                .into_iter()
                .chain(std::iter::once(root_segment(&rule.path).to_string()))
                .find(|field| !seen.contains(field.as_str()));
            if let Some(field) = unknown {
                return Err(SpecError::UnknownRuleField {
                    rule: rule.id.clone(),
                    field,
                });
            }
        }

        Ok(())
    }
}

fn verify_field(field: &FieldSpec) -> Result<(), SpecError> {
    if let Some(pattern) = field
        .constraint
        .as_ref()
        .and_then(|constraint| constraint.pattern.as_ref())
    {
        Regex::new(pattern).map_err(|source| SpecError::InvalidPattern {
            field: field.id.clone(),
            source,
        })?;
    }

    if matches!(field.kind, FieldKind::List) {
        let list = field
            .list
            .as_ref()
            .filter(|list| !list.fields.is_empty())
            .ok_or_else(|| SpecError::MissingListDefinition(field.id.clone()))?;
        for entry_field in &list.fields {
            verify_field(entry_field)?;
        }
    }

    Ok(())
}

/// First segment of a dotted field path (`bankReferences.0.phone` -> `bankReferences`).
pub(crate) fn root_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}
