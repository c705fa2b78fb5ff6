use serde::{Deserialize, Serialize};

/// Success body of the `chat` and `ask` operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// The assistant's reply, possibly markdown.
    pub response: String,

    /// The thread the service recorded this turn under.
    pub thread_id: String,

    /// Whether the service considers the request successful.
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

impl ChatResponse {
    /// Creates a successful response.
    pub fn new(response: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            thread_id: thread_id.into(),
            success: true,
        }
    }
}
