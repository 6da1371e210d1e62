use std::path::PathBuf;

use async_trait::async_trait;
use form_flow::{SubmitReceipt, SubmitTransport, TransportError};
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;

/// Delivers submitted records as JSON to a file, or to stdout when no path
/// is configured.
#[derive(Debug, Clone, Default)]
pub struct FileTransport {
    out: Option<PathBuf>,
}

impl FileTransport {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }
}

#[async_trait]
impl SubmitTransport for FileTransport {
    async fn submit(&self, form_id: &str, record: &Value) -> Result<SubmitReceipt, TransportError> {
        let payload = json!({ "form": form_id, "record": record });
        let mut bytes = serde_json::to_vec_pretty(&payload)?;
        bytes.push(b'\n');

        match &self.out {
            Some(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, &bytes).await?;
                tracing::info!(form = form_id, path = %path.display(), "record written");
                Ok(SubmitReceipt {
                    reference: format!("{form_id}:{}", path.display()),
                    message: Some(format!("record written to {}", path.display())),
                })
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&bytes).await?;
                stdout.flush().await?;
                Ok(SubmitReceipt {
                    reference: format!("{form_id}:stdout"),
                    message: None,
                })
            }
        }
    }
}
