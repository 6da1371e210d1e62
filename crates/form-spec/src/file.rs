use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MEDIA_PDF: &str = "application/pdf";
pub const MEDIA_PNG: &str = "image/png";
pub const MEDIA_JPEG: &str = "image/jpeg";

/// Opaque description of a file chosen through an external picker.
///
/// Only presence and `media_type` take part in validation; contents are
/// never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileDescriptor {
    pub name: String,
    pub media_type: String,
    #[serde(default)]
    pub size: u64,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "media_type": self.media_type,
            "size": self.size,
        })
    }
}
