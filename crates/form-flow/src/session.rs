use std::collections::BTreeSet;

use form_spec::transform::coerce_numeric;
use form_spec::{
    DependencyGraph, FieldError, FieldKind, FieldSpec, FileDescriptor, FormRecord, FormSpec,
    ScopedValidation, StepSpec, ValidateOn, ValidationReport, apply_blur, apply_mask,
    canonical_value, evaluate_rule, validate_all, validate_fields,
};
use serde::Serialize;
use serde_json::Value;

use crate::country::CountryContext;
use crate::error::FlowError;
use crate::transport::{SubmitReceipt, SubmitTransport, TransportError};
use crate::view::StepView;

/// Lifecycle of a session with respect to submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Editing,
    /// A record was handed to the transport and no result has come back.
    Pending,
    Submitted,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    Moved { from: usize, to: usize },
    /// Step-scoped validation failed; the errors are those of `step`.
    Blocked { step: usize, errors: Vec<FieldError> },
    /// Nothing to move to.
    Stayed,
}

/// First half of a submission: either the record snapshot to hand to a
/// transport or the report explaining why it cannot be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitGate {
    Ready(Value),
    Rejected(ValidationReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted(SubmitReceipt),
    Rejected(ValidationReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Change,
    Blur,
}

/// One instance of a form being filled in.
///
/// Owns the record and the current step (1-based). Edits re-validate only
/// what has been validated before, following the form's dependency graph.
/// Forward navigation validates the current step; backward navigation never
/// validates.
#[derive(Debug)]
pub struct FormSession<'a> {
    spec: &'a FormSpec,
    graph: DependencyGraph,
    record: FormRecord,
    current: usize,
    phase: Phase,
    validated: BTreeSet<String>,
    evaluated: BTreeSet<String>,
    country: CountryContext,
}

impl<'a> FormSession<'a> {
    pub fn new(spec: &'a FormSpec, country: CountryContext) -> Result<Self, FlowError> {
        spec.verify()?;
        Ok(Self {
            spec,
            graph: DependencyGraph::build(spec),
            record: FormRecord::new(spec),
            current: 1,
            phase: Phase::Editing,
            validated: BTreeSet::new(),
            evaluated: BTreeSet::new(),
            country,
        })
    }

    pub fn spec(&self) -> &'a FormSpec {
        self.spec
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn country(&self) -> &CountryContext {
        &self.country
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current step index, starting at 1.
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step(&self) -> Option<&'a StepSpec> {
        self.spec.step(self.current)
    }

    pub fn total_steps(&self) -> usize {
        self.spec.step_count()
    }

    pub fn is_terminal(&self) -> bool {
        self.current == self.total_steps()
    }

    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Editing && self.current < self.total_steps()
    }

    pub fn can_retreat(&self) -> bool {
        self.phase == Phase::Editing && self.current > 1
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Editing && self.is_terminal()
    }

    pub fn view(&self) -> StepView {
        StepView::from_session(self)
    }

    /// Stores typed text for a field, passing it through the field's input
    /// mask first.
    pub fn set_text(&mut self, field_id: &str, raw: &str) -> Result<(), FlowError> {
        self.ensure_editable()?;
        let field = self.field_spec(field_id)?;
        if field.kind == FieldKind::List {
            return Err(FlowError::ListField(field_id.to_string()));
        }
        let value = self.text_value(field, self.record.value(field_id), raw);
        self.record.set_value(field_id, value);
        self.on_change(field_id, Trigger::Change);
        Ok(())
    }

    /// Stores an already typed value without any input mask. Choice and
    /// flag values are stored in their canonical form.
    pub fn set_value(&mut self, field_id: &str, value: Value) -> Result<(), FlowError> {
        self.ensure_editable()?;
        let field = self.field_spec(field_id)?;
        let value = canonical_value(field, &value).unwrap_or(value);
        self.record.set_value(field_id, value);
        self.on_change(field_id, Trigger::Change);
        Ok(())
    }

    /// Selects or clears a file. File fields validate on every selection, so
    /// clearing one surfaces its required message right away.
    pub fn set_file(
        &mut self,
        field_id: &str,
        file: Option<FileDescriptor>,
    ) -> Result<(), FlowError> {
        self.ensure_editable()?;
        self.field_spec(field_id)?;
        let value = file.map(|file| file.to_value()).unwrap_or(Value::Null);
        self.record.set_value(field_id, value);
        self.validated.insert(field_id.to_string());
        self.on_change(field_id, Trigger::Change);
        Ok(())
    }

    /// Focus left a field: applies its blur normalization, then validates it
    /// when it defers validation to blur or has been validated before.
    pub fn blur(&mut self, field_id: &str) -> Result<(), FlowError> {
        self.ensure_editable()?;
        let field = self.field_spec(field_id)?;
        if let Some(action) = field.on_blur
            && let Some(current) = self.record.value(field_id)
            && let Some(normalized) = apply_blur(action, current)
        {
            self.record.set_value(field_id, normalized);
        }
        if field.validate_on == ValidateOn::Blur {
            self.validated.insert(field_id.to_string());
        }
        self.on_change(field_id, Trigger::Blur);
        Ok(())
    }

    pub fn set_entry_text(
        &mut self,
        list_id: &str,
        index: usize,
        sub_field: &str,
        raw: &str,
    ) -> Result<(), FlowError> {
        self.ensure_editable()?;
        let list = self.field_spec(list_id)?;
        let sub = list
            .entry_field(sub_field)
            .ok_or_else(|| FlowError::UnknownField(format!("{list_id}.{sub_field}")))?;
        let previous = self.record.value(&format!("{list_id}.{index}.{sub_field}"));
        let value = self.text_value(sub, previous, raw);
        self.record
            .set_entry_value(list_id, index, sub_field, value)?;
        self.on_change(list_id, Trigger::Change);
        Ok(())
    }

    /// Appends an empty entry to a list field and returns its index.
    pub fn append_entry(&mut self, list_id: &str) -> Result<usize, FlowError> {
        self.ensure_editable()?;
        let list = self.field_spec(list_id)?;
        let index = self.record.append_entry(list)?;
        self.on_change(list_id, Trigger::Change);
        Ok(index)
    }

    pub fn remove_entry(&mut self, list_id: &str, index: usize) -> Result<Value, FlowError> {
        self.ensure_editable()?;
        self.field_spec(list_id)?;
        let removed = self.record.remove_entry(list_id, index)?;
        self.on_change(list_id, Trigger::Change);
        Ok(removed)
    }

    /// Moves forward one step. Steps owning fields only let the session
    /// through when every owned field and every rule inside the step is
    /// valid; otherwise the session stays and the step's errors are stored.
    pub fn advance(&mut self) -> Result<Transition, FlowError> {
        self.ensure_editable()?;
        if self.current >= self.total_steps() {
            return Ok(Transition::Stayed);
        }
        let from = self.current;
        if let Some(step) = self.step()
            && step.owns_fields()
        {
            let scoped = validate_fields(self.spec, &step.fields, &self.record);
            self.absorb(&scoped);
            if !scoped.is_valid() {
                let errors = scoped.report(self.spec).errors;
                tracing::debug!(
                    form = %self.spec.id,
                    step = from,
                    errors = errors.len(),
                    "step transition blocked"
                );
                return Ok(Transition::Blocked { step: from, errors });
            }
        }
        self.current += 1;
        tracing::debug!(form = %self.spec.id, from, to = self.current, "advanced");
        Ok(Transition::Moved {
            from,
            to: self.current,
        })
    }

    /// Moves back one step. Values and errors stay as they are.
    pub fn retreat(&mut self) -> Result<Transition, FlowError> {
        self.ensure_editable()?;
        if self.current <= 1 {
            return Ok(Transition::Stayed);
        }
        let from = self.current;
        self.current -= 1;
        tracing::debug!(form = %self.spec.id, from, to = self.current, "retreated");
        Ok(Transition::Moved {
            from,
            to: self.current,
        })
    }

    /// Validates the whole record on the last step. A valid record moves the
    /// session into [`Phase::Pending`] until [`FormSession::finish_submit`]
    /// is called with the transport's answer.
    pub fn begin_submit(&mut self) -> Result<SubmitGate, FlowError> {
        self.ensure_editable()?;
        if !self.is_terminal() {
            return Err(FlowError::NotAtTerminalStep {
                current: self.current,
                total: self.total_steps(),
            });
        }
        let scoped = validate_all(self.spec, &self.record);
        self.absorb(&scoped);
        if !scoped.is_valid() {
            let report = scoped.report(self.spec);
            tracing::info!(
                form = %self.spec.id,
                errors = report.errors.len(),
                "submission rejected by validation"
            );
            return Ok(SubmitGate::Rejected(report));
        }
        self.phase = Phase::Pending;
        tracing::info!(form = %self.spec.id, "submitting record");
        Ok(SubmitGate::Ready(self.record.snapshot()))
    }

    /// Settles a pending submission. A transport failure returns the session
    /// to editing, leaves the record untouched and is passed through as is.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmitReceipt, TransportError>,
    ) -> Result<SubmitReceipt, FlowError> {
        if self.phase != Phase::Pending {
            return Err(FlowError::NotPending);
        }
        match result {
            Ok(receipt) => {
                self.phase = Phase::Submitted;
                tracing::info!(form = %self.spec.id, reference = %receipt.reference, "record submitted");
                Ok(receipt)
            }
            Err(err) => {
                self.phase = Phase::Editing;
                tracing::warn!(form = %self.spec.id, error = %err, "submission failed");
                Err(FlowError::Transport(err))
            }
        }
    }

    /// Validates and, when valid, hands the record to `transport` exactly once.
    ///
    /// Dropping the returned future before the transport answers puts the
    /// session back into [`Phase::Editing`], as a transport failure would.
    pub async fn submit<T>(&mut self, transport: &T) -> Result<SubmitOutcome, FlowError>
    where
        T: SubmitTransport + ?Sized,
    {
        let snapshot = match self.begin_submit()? {
            SubmitGate::Rejected(report) => return Ok(SubmitOutcome::Rejected(report)),
            SubmitGate::Ready(snapshot) => snapshot,
        };
        let spec = self.spec;
        let mut pending = PendingReset {
            form_id: &spec.id,
            phase: &mut self.phase,
            armed: true,
        };
        let result = transport.submit(&spec.id, &snapshot).await;
        pending.armed = false;
        drop(pending);
        self.finish_submit(result).map(SubmitOutcome::Accepted)
    }

    fn ensure_editable(&self) -> Result<(), FlowError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Pending => Err(FlowError::SubmitPending),
            Phase::Submitted => Err(FlowError::AlreadySubmitted),
        }
    }

    fn field_spec(&self, field_id: &str) -> Result<&'a FieldSpec, FlowError> {
        self.spec
            .field(field_id)
            .ok_or_else(|| FlowError::UnknownField(field_id.to_string()))
    }

    fn text_value(&self, field: &FieldSpec, previous: Option<&Value>, raw: &str) -> Value {
        if let Some(mask) = field.mask {
            return apply_mask(mask, previous, raw, self.country.calling_code());
        }
        let typed = match field.kind {
            FieldKind::Number => return coerce_numeric(raw),
            _ => Value::String(raw.to_string()),
        };
        canonical_value(field, &typed).unwrap_or(typed)
    }

    /// Re-validates whatever depends on `field_id` and has been validated
    /// before. Fields deferring to blur wait for their own blur event.
    fn on_change(&mut self, field_id: &str, trigger: Trigger) {
        let Some(dependents) = self.graph.dependents(field_id) else {
            return;
        };
        let fields: Vec<&String> = dependents
            .fields
            .iter()
            .filter(|dependent| self.validated.contains(*dependent))
            .filter(|dependent| {
                dependent.as_str() != field_id
                    || trigger == Trigger::Blur
                    || self
                        .spec
                        .field(dependent)
                        .is_none_or(|field| field.validate_on == ValidateOn::Change)
            })
            .collect();
        let mut scoped = validate_fields(self.spec, &fields, &self.record);
        scoped.rules.clear();
        for rule in &self.spec.validations {
            if dependents.rules.contains(&rule.id) && self.evaluated.contains(&rule.id) {
                scoped
                    .rules
                    .insert(rule.id.clone(), evaluate_rule(self.spec, rule, &self.record));
            }
        }
        self.absorb(&scoped);
    }

    fn absorb(&mut self, scoped: &ScopedValidation) {
        self.record.apply(scoped);
        self.validated.extend(scoped.fields.keys().cloned());
        self.evaluated.extend(scoped.rules.keys().cloned());
    }
}

/// Returns an abandoned submission to editing.
struct PendingReset<'s> {
    form_id: &'s str,
    phase: &'s mut Phase,
    armed: bool,
}

impl Drop for PendingReset<'_> {
    fn drop(&mut self) {
        if self.armed && *self.phase == Phase::Pending {
            *self.phase = Phase::Editing;
            tracing::warn!(form = %self.form_id, "submission abandoned before the transport answered");
        }
    }
}
