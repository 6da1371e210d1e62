pub mod field;
pub mod form;
pub mod step;
pub mod validation;

pub use field::{Check, Constraint, FieldKind, FieldMessages, FieldSpec, ListSpec, ValidateOn};
pub use form::{FormSpec, SpecError};
pub use step::{DisplayContent, StepId, StepKind, StepSpec};
pub use validation::CrossFieldValidation;
