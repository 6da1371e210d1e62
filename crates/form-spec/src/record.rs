use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::expr::lookup;
use crate::spec::field::FieldSpec;
use crate::spec::form::FormSpec;
use crate::validate::ScopedValidation;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Single-field rule failure.
    Field,
    /// Raw input could not be converted to the declared type.
    Coercion,
    /// Multi-field refinement failure attached to an anchor path.
    CrossField,
}

/// Validation error metadata reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub path: String,
    pub message: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result of a full-record validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("field '{0}' is not part of the form")]
    UnknownField(String),
    #[error("field '{0}' is not a list")]
    NotAList(String),
    #[error("entry {index} of '{field}' does not exist (length {len})")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },
}

/// Mutable working data of one form session: current values plus the last
/// error seen per field path and per cross-field rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormRecord {
    form_id: String,
    values: Map<String, Value>,
    errors: BTreeMap<String, FieldError>,
    rule_errors: BTreeMap<String, FieldError>,
}

impl FormRecord {
    /// Creates a record seeded with the form's default values.
    pub fn new(spec: &FormSpec) -> Self {
        let values = spec
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .default_value
                    .clone()
                    .map(|value| (field.id.clone(), value))
            })
            .collect();
        Self {
            form_id: spec.id.clone(),
            values,
            errors: BTreeMap::new(),
            rule_errors: BTreeMap::new(),
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Reads a value by dotted path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        lookup(&self.values, path)
    }

    pub fn text(&self, path: &str) -> &str {
        self.value(path).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn set_value(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    pub fn entries(&self, field: &str) -> &[Value] {
        self.values
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set_entry_value(
        &mut self,
        field: &str,
        index: usize,
        sub_field: &str,
        value: Value,
    ) -> Result<(), RecordError> {
        let entries = self.list_mut(field)?;
        let len = entries.len();
        let entry = entries
            .get_mut(index)
            .ok_or_else(|| RecordError::IndexOutOfRange {
                field: field.to_string(),
                index,
                len,
            })?;
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Some(object) = entry.as_object_mut() {
            object.insert(sub_field.to_string(), value);
        }
        Ok(())
    }

    /// Appends an entry with every sub-field empty and returns its index.
    pub fn append_entry(&mut self, field: &FieldSpec) -> Result<usize, RecordError> {
        let list = field
            .list
            .as_ref()
            .ok_or_else(|| RecordError::NotAList(field.id.clone()))?;
        let entry: Map<String, Value> = list
            .fields
            .iter()
            .map(|sub| (sub.id.clone(), Value::String(String::new())))
            .collect();
        let entries = self.list_mut(&field.id)?;
        entries.push(Value::Object(entry));
        Ok(entries.len() - 1)
    }

    /// Removes the entry at `index`, dropping its errors and renumbering the
    /// index-keyed error paths of every later entry.
    pub fn remove_entry(&mut self, field: &str, index: usize) -> Result<Value, RecordError> {
        let entries = self.list_mut(field)?;
        if index >= entries.len() {
            return Err(RecordError::IndexOutOfRange {
                field: field.to_string(),
                index,
                len: entries.len(),
            });
        }
        let removed = entries.remove(index);

        let prefix = format!("{field}.");
        let keys: Vec<String> = self
            .errors
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in keys {
            let Some(mut error) = self.errors.remove(&key) else {
                continue;
            };
            let rest = &key[prefix.len()..];
            let (position, tail) = rest.split_once('.').unwrap_or((rest, ""));
            let Ok(position) = position.parse::<usize>() else {
                self.errors.insert(key, error);
                continue;
            };
            if position == index {
                continue;
            }
            let position = if position > index { position - 1 } else { position };
            let path = if tail.is_empty() {
                format!("{prefix}{position}")
            } else {
                format!("{prefix}{position}.{tail}")
            };
            error.path = path.clone();
            self.errors.insert(path, error);
        }

        Ok(removed)
    }

    fn list_mut(&mut self, field: &str) -> Result<&mut Vec<Value>, RecordError> {
        let slot = self
            .values
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut()
            .ok_or_else(|| RecordError::NotAList(field.to_string()))
    }

    /// Current error for a path: the field-level error first, otherwise a
    /// cross-field error anchored there.
    pub fn error(&self, path: &str) -> Option<&FieldError> {
        self.errors.get(path).or_else(|| {
            self.rule_errors
                .values()
                .find(|error| error.path == path)
        })
    }

    pub fn field_errors(&self) -> &BTreeMap<String, FieldError> {
        &self.errors
    }

    pub fn rule_errors(&self) -> &BTreeMap<String, FieldError> {
        &self.rule_errors
    }

    /// Every outstanding error, field-level first, then cross-field.
    pub fn all_errors(&self) -> Vec<&FieldError> {
        self.errors
            .values()
            .chain(self.rule_errors.values())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.rule_errors.is_empty()
    }

    /// Replaces the stored error state of everything the scoped pass
    /// evaluated. Fields and rules outside the pass keep their prior state.
    pub fn apply(&mut self, scoped: &ScopedValidation) {
        for (field, errors) in &scoped.fields {
            let nested = format!("{field}.");
            self.errors
                .retain(|path, _| path != field && !path.starts_with(&nested));
            for error in errors {
                self.errors.insert(error.path.clone(), error.clone());
            }
        }
        for (rule, error) in &scoped.rules {
            match error {
                Some(error) => {
                    self.rule_errors.insert(rule.clone(), error.clone());
                }
                None => {
                    self.rule_errors.remove(rule);
                }
            }
        }
    }

    /// Read-only copy of the current values.
    pub fn snapshot(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
