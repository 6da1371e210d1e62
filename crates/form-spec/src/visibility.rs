use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::record::FormRecord;
use crate::spec::form::FormSpec;
use crate::validate::canonical_value;

pub type ActivityMap = std::collections::BTreeMap<String, bool>;

/// Whether a field is currently disclosed. Rendering uses it to decide
/// display, validation uses it to decide whether the field is evaluated at
/// all. Conditions that cannot be resolved leave the field active.
pub fn is_field_active(spec: &FormSpec, field_id: &str, record: &FormRecord) -> bool {
    spec.field(field_id)
        .and_then(|field| field.active_if.as_ref())
        .map(|condition| {
            condition
                .evaluate_bool(&condition_values(spec, record))
                .unwrap_or(true)
        })
        .unwrap_or(true)
}

pub fn resolve_activity(spec: &FormSpec, record: &FormRecord) -> ActivityMap {
    spec.fields
        .iter()
        .map(|field| (field.id.clone(), is_field_active(spec, &field.id, record)))
        .collect()
}

/// Record values as conditions see them: choice and flag fields read as
/// their canonical value, so `" card"` equals `"card"` and `"false"` equals
/// `false`. Borrows the record when nothing needs rewriting.
pub(crate) fn condition_values<'r>(
    spec: &FormSpec,
    record: &'r FormRecord,
) -> Cow<'r, Map<String, Value>> {
    let mut values = Cow::Borrowed(record.values());
    for field in &spec.fields {
        if let Some(current) = record.value(&field.id)
            && let Some(canonical) = canonical_value(field, current)
            && canonical != *current
        {
            values.to_mut().insert(field.id.clone(), canonical);
        }
    }
    values
}
