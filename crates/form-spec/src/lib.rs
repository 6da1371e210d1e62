#![allow(missing_docs)]

pub mod catalog;
pub mod deps;
pub mod expr;
pub mod file;
pub mod record;
pub mod spec;
pub mod transform;
pub mod validate;
pub mod visibility;

pub use deps::DependencyGraph;
pub use expr::Expr;
pub use file::FileDescriptor;
pub use record::{ErrorKind, FieldError, FormRecord, RecordError, ValidationReport};
pub use spec::{
    Check, Constraint, CrossFieldValidation, DisplayContent, FieldKind, FieldMessages, FieldSpec,
    FormSpec, ListSpec, SpecError, StepId, StepKind, StepSpec, ValidateOn,
};
pub use transform::{BlurAction, InputMask, apply_blur, apply_mask};
pub use validate::{
    ScopedValidation, canonical_value, evaluate_rule, validate_all, validate_field,
    validate_fields, validate_record, validate_value,
};
pub use visibility::{ActivityMap, is_field_active, resolve_activity};
