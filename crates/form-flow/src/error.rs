use form_spec::{RecordError, SpecError};
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid form definition: {0}")]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("field '{0}' is not part of the form")]
    UnknownField(String),
    #[error("field '{0}' holds a list of entries; edit its entries instead")]
    ListField(String),
    #[error("a submission is already in flight")]
    SubmitPending,
    #[error("the form has already been submitted")]
    AlreadySubmitted,
    #[error("submit is only available on the last step (at step {current} of {total})")]
    NotAtTerminalStep { current: usize, total: usize },
    #[error("no submission is in flight")]
    NotPending,
    #[error("unknown country '{0}'")]
    UnknownCountry(String),
    #[error("submission failed: {0}")]
    Transport(#[from] TransportError),
}
