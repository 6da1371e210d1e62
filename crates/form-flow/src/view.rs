use form_spec::expr::is_filled;
use form_spec::{
    DisplayContent, FieldError, FieldKind, FieldSpec, FileDescriptor, StepKind, is_field_active,
};
use serde::Serialize;
use serde_json::Value;

use crate::session::{FormSession, Phase};

/// Everything a renderer needs to draw the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub form_id: String,
    pub index: usize,
    pub total: usize,
    pub step_id: String,
    pub title: String,
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<DisplayContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldView>,
    pub terminal: bool,
    /// Read-only copy of the whole record, only on the last step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<SummaryLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outstanding_errors: Vec<FieldError>,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub can_submit: bool,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
    /// Errors of individual list entries, keyed by their full path.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry_errors: Vec<FieldError>,
    pub active: bool,
    pub required: bool,
}

/// Human-readable line of the review summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub field: String,
    pub label: String,
    pub value: String,
}

impl StepView {
    pub(crate) fn from_session(session: &FormSession<'_>) -> Self {
        let spec = session.spec();
        let record = session.record();
        let step = session.step();
        let terminal = session.is_terminal();

        let fields = step
            .map(|step| {
                step.fields
                    .iter()
                    .filter_map(|id| spec.field(id))
                    .map(|field| {
                        let nested = format!("{}.", field.id);
                        FieldView {
                            id: field.id.clone(),
                            label: field.label.clone(),
                            kind: field.kind,
                            section: field.section.clone(),
                            value: record.value(&field.id).cloned(),
                            error: record.error(&field.id).cloned(),
                            entry_errors: record
                                .field_errors()
                                .iter()
                                .filter(|(path, _)| path.starts_with(&nested))
                                .map(|(_, error)| error.clone())
                                .collect(),
                            active: is_field_active(spec, &field.id, record),
                            required: field.required,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let summary = if terminal {
            spec.fields
                .iter()
                .filter(|field| is_field_active(spec, &field.id, record))
                .filter_map(|field| {
                    let value = record.value(&field.id).filter(|value| is_filled(value))?;
                    Some(SummaryLine {
                        field: field.id.clone(),
                        label: field.label.clone(),
                        value: display_value(field, value),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            form_id: spec.id.clone(),
            index: session.current_step(),
            total: session.total_steps(),
            step_id: step.map(|step| step.id.clone()).unwrap_or_default(),
            title: step.map(|step| step.title.clone()).unwrap_or_default(),
            kind: step.map(|step| step.kind).unwrap_or(StepKind::Fields),
            content: step.and_then(|step| step.content.clone()),
            fields,
            terminal,
            snapshot: terminal.then(|| record.snapshot()),
            summary,
            outstanding_errors: if terminal {
                record.all_errors().into_iter().cloned().collect()
            } else {
                Vec::new()
            },
            can_advance: session.can_advance(),
            can_retreat: session.can_retreat(),
            can_submit: session.can_submit(),
            phase: session.phase(),
        }
    }
}

fn display_value(field: &FieldSpec, value: &Value) -> String {
    match (field.kind, value) {
        (_, Value::String(text)) => field
            .choice_labels
            .as_ref()
            .and_then(|labels| labels.get(text))
            .cloned()
            .unwrap_or_else(|| text.clone()),
        (_, Value::Bool(flag)) => String::from(if *flag { "Yes" } else { "No" }),
        (FieldKind::File, other) => FileDescriptor::from_value(other)
            .map(|file| file.name)
            .unwrap_or_else(|| other.to_string()),
        (FieldKind::List, Value::Array(entries)) => match entries.len() {
            1 => "1 entry".to_string(),
            count => format!("{count} entries"),
        },
        (_, other) => other.to_string(),
    }
}
