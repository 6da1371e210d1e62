use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::file::FileDescriptor;
use crate::record::{ErrorKind, FieldError, FormRecord, ValidationReport};
use crate::spec::field::{Check, FieldKind, FieldSpec};
use crate::spec::form::FormSpec;
use crate::spec::validation::CrossFieldValidation;
use crate::visibility::{condition_values, is_field_active};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Field patterns compiled on first use, keyed by their source.
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(Default::default);

fn compiled_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(regex) = PATTERNS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(pattern)
    {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)?;
    PATTERNS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Outcome of validating a subset of fields and the rules contained in it.
///
/// `fields` maps every evaluated field id to its errors (empty when valid);
/// list fields may carry one error per entry sub-field. `rules` maps every
/// evaluated cross-field rule id to its error, if violated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopedValidation {
    pub fields: BTreeMap<String, Vec<FieldError>>,
    pub rules: BTreeMap<String, Option<FieldError>>,
}

impl ScopedValidation {
    pub fn is_valid(&self) -> bool {
        self.fields.values().all(Vec::is_empty) && self.rules.values().all(Option::is_none)
    }

    /// Errors in declaration order: fields first, then refinements.
    pub fn report(&self, spec: &FormSpec) -> ValidationReport {
        let mut errors: Vec<FieldError> = spec
            .fields
            .iter()
            .filter_map(|field| self.fields.get(&field.id))
            .flatten()
            .cloned()
            .collect();
        errors.extend(
            spec.validations
                .iter()
                .filter_map(|rule| self.rules.get(&rule.id).cloned().flatten()),
        );
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates every field and every cross-field refinement of the form.
pub fn validate_record(spec: &FormSpec, record: &FormRecord) -> ValidationReport {
    validate_all(spec, record).report(spec)
}

/// Full pass in the shape used to update a record's error state.
pub fn validate_all(spec: &FormSpec, record: &FormRecord) -> ScopedValidation {
    let mut scoped = ScopedValidation::default();
    for field in &spec.fields {
        scoped
            .fields
            .insert(field.id.clone(), validate_field(spec, &field.id, record));
    }
    for rule in &spec.validations {
        scoped
            .rules
            .insert(rule.id.clone(), evaluate_rule(spec, rule, record));
    }
    scoped
}

/// Validates exactly the named fields. Refinements run only when every field
/// they read is part of the subset.
pub fn validate_fields<S: AsRef<str>>(
    spec: &FormSpec,
    names: &[S],
    record: &FormRecord,
) -> ScopedValidation {
    let subset: BTreeSet<&str> = names.iter().map(|name| name.as_ref()).collect();
    let mut scoped = ScopedValidation::default();
    for name in &subset {
        scoped
            .fields
            .insert(name.to_string(), validate_field(spec, name, record));
    }
    for rule in &spec.validations {
        if rule
            .reads()
            .iter()
            .all(|field| subset.contains(field.as_str()))
        {
            scoped
                .rules
                .insert(rule.id.clone(), evaluate_rule(spec, rule, record));
        }
    }
    scoped
}

/// Validates one field against the record. Inactive fields are never in
/// error; list fields report one error per failing entry sub-field.
pub fn validate_field(spec: &FormSpec, field_id: &str, record: &FormRecord) -> Vec<FieldError> {
    let Some(field) = spec.field(field_id) else {
        tracing::warn!(form = %spec.id, field = field_id, "validation requested for unknown field");
        return Vec::new();
    };
    if !is_field_active(spec, field_id, record) {
        return Vec::new();
    }
    if matches!(field.kind, FieldKind::List) {
        return validate_list(field, record.value(&field.id));
    }
    validate_value(field, &field.id, record.value(&field.id))
        .into_iter()
        .collect()
}

/// Evaluates one cross-field refinement against the record. Choice and
/// flag fields are compared by their canonical value.
pub fn evaluate_rule(
    spec: &FormSpec,
    rule: &CrossFieldValidation,
    record: &FormRecord,
) -> Option<FieldError> {
    match rule.condition.evaluate_bool(&condition_values(spec, record)) {
        Some(true) => Some(FieldError {
            path: rule.path.clone(),
            message: rule.message.clone(),
            kind: ErrorKind::CrossField,
            code: rule.code.clone().or_else(|| Some(rule.id.clone())),
        }),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Required,
    InvalidType,
    EnumMismatch,
    MinLength,
    MaxLength,
    Min,
    Max,
    Pattern,
    Check,
}

#[derive(Debug, Clone)]
enum Coerced {
    Text(String),
    Number(f64),
    Flag(bool),
    File(FileDescriptor),
}

/// Runs the single-field pipeline: required, type coercion, length/range,
/// pattern, custom check. Stops at the first failure.
pub fn validate_value(field: &FieldSpec, path: &str, value: Option<&Value>) -> Option<FieldError> {
    let Some(value) = value.filter(|value| !is_empty(value)) else {
        return field
            .required
            .then(|| stage_error(field, path, Stage::Required));
    };

    let coerced = match coerce(field, value) {
        Ok(coerced) => coerced,
        Err(stage) => return Some(stage_error(field, path, stage)),
    };

    if let Some(stage) = enforce_constraint(field, &coerced) {
        return Some(stage_error(field, path, stage));
    }

    if let Some(check) = &field.check
        && !passes_check(check, &coerced)
    {
        return Some(stage_error(field, path, Stage::Check));
    }

    None
}

/// The stored form of a choice or flag value: the matched choice without
/// surrounding whitespace, or a JSON boolean. `None` for other kinds and for
/// values that do not coerce.
pub fn canonical_value(field: &FieldSpec, value: &Value) -> Option<Value> {
    match (field.kind, coerce(field, value).ok()?) {
        (FieldKind::Enum, Coerced::Text(text)) => Some(Value::String(text)),
        (FieldKind::Boolean, Coerced::Flag(flag)) => Some(Value::Bool(flag)),
        _ => None,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn coerce(field: &FieldSpec, value: &Value) -> Result<Coerced, Stage> {
    match field.kind {
        FieldKind::String => match value {
            Value::String(text) => Ok(Coerced::Text(text.trim().to_string())),
            Value::Number(number) => Ok(Coerced::Text(number.to_string())),
            _ => Err(Stage::InvalidType),
        },
        FieldKind::Enum => {
            let choices = field.choices.as_deref().unwrap_or_default();
            value
                .as_str()
                .map(str::trim)
                .filter(|text| choices.iter().any(|choice| choice == text))
                .map(|text| Coerced::Text(text.to_string()))
                .ok_or(Stage::EnumMismatch)
        }
        FieldKind::Number => match value {
            Value::Number(number) => number.as_f64().map(Coerced::Number).ok_or(Stage::InvalidType),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(Coerced::Number)
                .ok_or(Stage::InvalidType),
            _ => Err(Stage::InvalidType),
        },
        FieldKind::Boolean => match value {
            Value::Bool(flag) => Ok(Coerced::Flag(*flag)),
            Value::String(text) => match text.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" => Ok(Coerced::Flag(true)),
                "false" | "off" | "no" => Ok(Coerced::Flag(false)),
                _ => Err(Stage::InvalidType),
            },
            _ => Err(Stage::InvalidType),
        },
        FieldKind::File => {
            let first = match value {
                Value::Array(items) => items.first().unwrap_or(&Value::Null),
                other => other,
            };
            FileDescriptor::from_value(first)
                .map(Coerced::File)
                .ok_or(Stage::InvalidType)
        }
        FieldKind::List => Err(Stage::InvalidType),
    }
}

fn enforce_constraint(field: &FieldSpec, value: &Coerced) -> Option<Stage> {
    let constraint = field.constraint.as_ref()?;
    match value {
        Coerced::Text(text) => {
            let len = text.chars().count();
            if let Some(min_len) = constraint.min_len
                && len < min_len
            {
                return Some(Stage::MinLength);
            }
            if let Some(max_len) = constraint.max_len
                && len > max_len
            {
                return Some(Stage::MaxLength);
            }
            if let Some(pattern) = &constraint.pattern {
                match compiled_pattern(pattern) {
                    Ok(regex) if !regex.is_match(text) => return Some(Stage::Pattern),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(field = %field.id, error = %err, "skipping invalid pattern");
                    }
                }
            }
            None
        }
        Coerced::Number(number) => {
            if let Some(min) = constraint.min
                && *number < min
            {
                return Some(Stage::Min);
            }
            if let Some(max) = constraint.max
                && *number > max
            {
                return Some(Stage::Max);
            }
            None
        }
        Coerced::Flag(_) | Coerced::File(_) => None,
    }
}

fn passes_check(check: &Check, value: &Coerced) -> bool {
    match (check, value) {
        (Check::Email, Coerced::Text(text)) => EMAIL.is_match(text),
        (Check::Positive, Coerced::Number(number)) => *number > 0.0,
        (Check::Accepted, Coerced::Flag(flag)) => *flag,
        (Check::MediaType { allow }, Coerced::File(file)) => allow
            .iter()
            .any(|media_type| media_type.eq_ignore_ascii_case(&file.media_type)),
        _ => true,
    }
}

fn stage_error(field: &FieldSpec, path: &str, stage: Stage) -> FieldError {
    let messages = &field.messages;
    let (message, code, kind) = match stage {
        Stage::Required => (messages.required.as_deref(), "required", ErrorKind::Field),
        Stage::InvalidType => (
            messages.invalid_type.as_deref(),
            "type_mismatch",
            ErrorKind::Coercion,
        ),
        Stage::EnumMismatch => (
            messages
                .invalid_type
                .as_deref()
                .or(messages.required.as_deref()),
            "enum_mismatch",
            ErrorKind::Field,
        ),
        Stage::MinLength => (messages.length.as_deref(), "min_length", ErrorKind::Field),
        Stage::MaxLength => (messages.length.as_deref(), "max_length", ErrorKind::Field),
        Stage::Min => (messages.range.as_deref(), "min", ErrorKind::Field),
        Stage::Max => (messages.range.as_deref(), "max", ErrorKind::Field),
        Stage::Pattern => (messages.pattern.as_deref(), "pattern_mismatch", ErrorKind::Field),
        Stage::Check => (messages.check.as_deref(), "check", ErrorKind::Field),
    };
    FieldError {
        path: path.to_string(),
        message: message.unwrap_or(default_message(stage)).to_string(),
        kind,
        code: Some(code.to_string()),
    }
}

fn default_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Required => "Required",
        Stage::InvalidType => "Invalid value",
        Stage::EnumMismatch => "Select an option",
        Stage::MinLength => "Too short",
        Stage::MaxLength => "Too long",
        Stage::Min => "Value below minimum",
        Stage::Max => "Value above maximum",
        Stage::Pattern => "Invalid format",
        Stage::Check => "Invalid value",
    }
}

fn validate_list(field: &FieldSpec, value: Option<&Value>) -> Vec<FieldError> {
    let Some(list) = &field.list else {
        return vec![list_error(
            &field.id,
            "list fields are not defined",
            "missing_list_definition",
        )];
    };
    let items: &[Value] = match value {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(_) => {
            return vec![list_error(&field.id, "list value must be an array", "list_type")];
        }
    };

    if let Some(min_items) = list.min_items
        && items.len() < min_items
    {
        let message = format!("not enough entries (expected {}, got {})", min_items, items.len());
        return vec![count_error(field, message, "min_items")];
    }
    if let Some(max_items) = list.max_items
        && items.len() > max_items
    {
        let message = format!("too many entries (expected {}, got {})", max_items, items.len());
        return vec![count_error(field, message, "max_items")];
    }

    let mut errors = Vec::new();
    for (idx, entry) in items.iter().enumerate() {
        let Some(entry) = entry.as_object() else {
            let path = format!("{}.{}", field.id, idx);
            errors.push(list_error(&path, "list entry must be an object", "entry_type"));
            continue;
        };
        for sub in &list.fields {
            let path = format!("{}.{}.{}", field.id, idx, sub.id);
            if let Some(error) = validate_value(sub, &path, entry.get(&sub.id)) {
                errors.push(error);
            }
        }
    }
    errors
}

fn count_error(field: &FieldSpec, message: String, code: &str) -> FieldError {
    let message = field.messages.length.clone().unwrap_or(message);
    list_error(&field.id, &message, code)
}

fn list_error(path: &str, message: &str, code: &str) -> FieldError {
    FieldError {
        path: path.to_string(),
        message: message.to_string(),
        kind: ErrorKind::Field,
        code: Some(code.into()),
    }
}
