use serde::{Deserialize, Serialize};

/// Request body for the `chat` operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,

    /// Conversation thread the service should correlate this turn with.
    ///
    /// When omitted the service falls back to its own default thread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl ChatRequest {
    /// Creates a request that is not bound to any thread.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            thread_id: None,
        }
    }

    /// Binds the request to a thread.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_id_is_omitted_when_absent() {
        let request = ChatRequest::new("hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"message": "hello"}));
    }

    #[test]
    fn thread_id_is_serialized() {
        let request = ChatRequest::new("hello").with_thread_id("thread-abc1234");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "hello", "thread_id": "thread-abc1234"})
        );
    }
}
