//! The seam between the conversation core and the assistant service.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse, HealthResponse};

/// The four remote operations the conversation core depends upon.
///
/// Implementations must be stateless with respect to any one session: every
/// call either resolves with the documented shape or fails with an
/// [`crate::Error`] exposing one human-readable message.  [`crate::AssistantClient`]
/// is the HTTP implementation; tests substitute their own.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one conversational turn.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Ask a one-shot question outside of any thread.
    async fn ask(&self, message: &str) -> Result<ChatResponse>;

    /// Check whether the service is up.
    async fn health_check(&self) -> Result<HealthResponse>;

    /// Check whether the service is ready to answer.
    async fn readiness_check(&self) -> Result<HealthResponse>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        (**self).chat(request).await
    }

    async fn ask(&self, message: &str) -> Result<ChatResponse> {
        (**self).ask(message).await
    }

    async fn health_check(&self) -> Result<HealthResponse> {
        (**self).health_check().await
    }

    async fn readiness_check(&self) -> Result<HealthResponse> {
        (**self).readiness_check().await
    }
}
