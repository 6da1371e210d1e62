use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a submission transport. It is surfaced to the caller
/// of `submit` as-is and never touches the record or its errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rejected by receiver: {0}")]
    Rejected(String),
    #[error("receiver unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Acknowledgement returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// External collaborator receiving validated records. Timeouts and retries
/// are its own business.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn submit(&self, form_id: &str, record: &Value) -> Result<SubmitReceipt, TransportError>;
}
