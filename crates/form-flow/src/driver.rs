//! Non-interactive runs: a whole answers object is typed into a session,
//! every step is advanced in turn and the record is submitted at the end.

use form_spec::{FieldError, FieldKind, FileDescriptor, FormSpec, ValidationReport};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::country::CountryContext;
use crate::error::FlowError;
use crate::session::{FormSession, SubmitOutcome, Transition};
use crate::transport::{SubmitReceipt, SubmitTransport};
use crate::view::StepView;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("answers must be a JSON object keyed by field id")]
    NotAnObject,
    #[error("answer for '{field}' is invalid: {reason}")]
    InvalidAnswer { field: String, reason: String },
    #[error(transparent)]
    Flow(#[from] FlowError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DriverOutcome {
    /// A step refused to advance; nothing was submitted.
    Blocked {
        step: usize,
        step_id: String,
        errors: Vec<FieldError>,
    },
    /// Full-record validation failed on the last step.
    Rejected { report: ValidationReport },
    Submitted { receipt: SubmitReceipt },
}

/// Final state of a driver run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverRun {
    pub outcome: DriverOutcome,
    pub record: Value,
    pub view: StepView,
}

impl DriverRun {
    pub fn is_submitted(&self) -> bool {
        matches!(self.outcome, DriverOutcome::Submitted { .. })
    }
}

/// Types every answer into the session the way a user would: text goes
/// through the field's mask, files are selected, list entries are created
/// to match the answer, and each field is blurred afterwards.
pub fn fill_answers(session: &mut FormSession<'_>, answers: &Value) -> Result<(), DriverError> {
    let answers = answers.as_object().ok_or(DriverError::NotAnObject)?;
    let spec = session.spec();
    if let Some(unknown) = answers.keys().find(|key| spec.field(key).is_none()) {
        return Err(FlowError::UnknownField(unknown.clone()).into());
    }

    for field in &spec.fields {
        let Some(answer) = answers.get(&field.id) else {
            continue;
        };
        match field.kind {
            FieldKind::List => fill_entries(session, &field.id, answer)?,
            FieldKind::File => {
                let file = match answer {
                    Value::Null => None,
                    other => Some(FileDescriptor::from_value(other).ok_or_else(|| {
                        DriverError::InvalidAnswer {
                            field: field.id.clone(),
                            reason: "expected an object with name, media_type and size".into(),
                        }
                    })?),
                };
                session.set_file(&field.id, file)?;
            }
            _ => match scalar_text(answer) {
                Some(text) => session.set_text(&field.id, &text)?,
                None => session.set_value(&field.id, answer.clone())?,
            },
        }
        session.blur(&field.id)?;
    }
    Ok(())
}

fn fill_entries(
    session: &mut FormSession<'_>,
    list_id: &str,
    answer: &Value,
) -> Result<(), DriverError> {
    let entries = answer
        .as_array()
        .ok_or_else(|| DriverError::InvalidAnswer {
            field: list_id.to_string(),
            reason: "expected an array of entries".into(),
        })?;

    let mut existing = session.record().entries(list_id).len();
    while existing > entries.len() {
        existing -= 1;
        session.remove_entry(list_id, existing)?;
    }
    while existing < entries.len() {
        session.append_entry(list_id)?;
        existing += 1;
    }

    let empty = Map::new();
    for (index, entry) in entries.iter().enumerate() {
        let entry = match entry {
            Value::Object(entry) => entry,
            Value::Null => &empty,
            _ => {
                return Err(DriverError::InvalidAnswer {
                    field: format!("{list_id}.{index}"),
                    reason: "expected an object".into(),
                });
            }
        };
        for (sub_field, value) in entry {
            let text = scalar_text(value).ok_or_else(|| DriverError::InvalidAnswer {
                field: format!("{list_id}.{index}.{sub_field}"),
                reason: "expected text".into(),
            })?;
            session.set_entry_text(list_id, index, sub_field, &text)?;
        }
    }
    Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Fills a fresh session from `answers`, walks it to the last step and
/// submits. Stops at the first step that refuses to advance.
pub async fn run_non_interactive<T>(
    spec: &FormSpec,
    country: CountryContext,
    answers: &Value,
    transport: &T,
) -> Result<DriverRun, DriverError>
where
    T: SubmitTransport + ?Sized,
{
    let mut session = FormSession::new(spec, country)?;
    fill_answers(&mut session, answers)?;

    while !session.is_terminal() {
        match session.advance()? {
            Transition::Moved { .. } => {}
            Transition::Blocked { step, errors } => {
                let step_id = session
                    .step()
                    .map(|step| step.id.clone())
                    .unwrap_or_default();
                return Ok(finish(&session, DriverOutcome::Blocked {
                    step,
                    step_id,
                    errors,
                }));
            }
            Transition::Stayed => break,
        }
    }

    let outcome = match session.submit(transport).await? {
        SubmitOutcome::Accepted(receipt) => DriverOutcome::Submitted { receipt },
        SubmitOutcome::Rejected(report) => DriverOutcome::Rejected { report },
    };
    Ok(finish(&session, outcome))
}

fn finish(session: &FormSession<'_>, outcome: DriverOutcome) -> DriverRun {
    DriverRun {
        outcome,
        record: session.record().snapshot(),
        view: session.view(),
    }
}
