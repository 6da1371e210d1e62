//! Step orchestration over [`form_spec`] record schemas.
//!
//! A [`FormSession`] owns the single [`form_spec::FormRecord`] of one form
//! instance, gates forward navigation on step-scoped validation and hands the
//! fully validated record to a [`SubmitTransport`] exactly once.

pub mod country;
pub mod driver;
pub mod error;
pub mod session;
pub mod transport;
pub mod view;

pub use country::CountryContext;
pub use driver::{DriverError, DriverOutcome, DriverRun, fill_answers, run_non_interactive};
pub use error::FlowError;
pub use session::{FormSession, Phase, SubmitGate, SubmitOutcome, Transition};
pub use transport::{SubmitReceipt, SubmitTransport, TransportError};
pub use view::{FieldView, StepView, SummaryLine};
