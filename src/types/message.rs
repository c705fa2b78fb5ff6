use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Which side of the conversation produced a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Text the user submitted.
    User,

    /// A reply from the assistant, or a local acknowledgment of a failed turn.
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Error returned when parsing an invalid message role string.
#[derive(Debug)]
pub struct MessageRoleParseError {
    /// The invalid string value that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for MessageRoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown message role: {}", self.invalid_value)
    }
}

impl std::error::Error for MessageRoleParseError {}

impl FromStr for MessageRole {
    type Err = MessageRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(MessageRoleParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// One entry in the conversation transcript.
///
/// Messages are created locally; the timestamp is the moment of creation on
/// this side of the wire, never a time reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Locally generated identifier, unique within the session.
    pub id: String,

    /// Message text.  Assistant content may contain markdown.
    pub content: String,

    /// Who produced the message.
    pub role: MessageRole,

    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// Creates a new message.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        role: MessageRole,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role,
            timestamp,
        }
    }

    /// True if the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// True if this message is on the assistant side.
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}
