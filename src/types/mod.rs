// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod connectivity;
pub mod error_response;
pub mod health_response;
pub mod message;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::ChatResponse;
pub use connectivity::Connectivity;
pub use error_response::ErrorResponse;
pub use health_response::{HealthResponse, STATUS_HEALTHY, STATUS_READY};
pub use message::{Message, MessageRole, MessageRoleParseError};
