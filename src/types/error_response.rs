use serde::{Deserialize, Deserializer, Serialize};

/// Error body the assistant service sends with a non-success status.
///
/// Only `detail` matters to the client.  Validation failures raised by the
/// service framework carry a structured `detail` instead of a string, so it
/// is kept as raw JSON and interpreted by [`ErrorResponse::detail_message`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Human-readable description of the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,

    /// Always false for an error body.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
}

/// Reads `success` as a bool, treating null or any other shape as false so
/// that a readable `detail` is never lost to it.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

impl ErrorResponse {
    /// Creates an error body with a string detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(serde_json::Value::String(detail.into())),
            success: false,
        }
    }

    /// Returns the detail when it is a non-empty string.
    pub fn detail_message(&self) -> Option<&str> {
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}
