//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling how the chat connects and renders.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::monitor::DEFAULT_POLL_INTERVAL;

/// Command-line arguments for the colloquy-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the assistant service.
    #[arrrg(optional, "Assistant service URL (default: $COLLOQUY_API_URL)", "URL")]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Seconds between health checks.
    #[arrrg(optional, "Seconds between health checks (default: 30)", "SECONDS")]
    pub health_interval_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the assistant service; `None` defers to the environment.
    pub api_url: Option<String>,

    /// Per-request timeout; `None` uses the client default.
    pub timeout: Option<Duration>,

    /// Period between health checks.
    pub health_interval: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            api_url: None,
            timeout: None,
            health_interval: DEFAULT_POLL_INTERVAL,
            use_color: true,
        }
    }

    /// Sets the service base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the health check period.
    pub fn with_health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            api_url: args.api_url,
            // Zero means "not set" for both durations.
            timeout: args
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            health_interval: args
                .health_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.api_url.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.health_interval, Duration::from_secs(30));
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert!(config.api_url.is_none());
        assert_eq!(config.health_interval, DEFAULT_POLL_INTERVAL);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            api_url: Some("http://assistant.internal:9000".to_string()),
            timeout_secs: Some(5),
            health_interval_secs: Some(10),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(
            config.api_url.as_deref(),
            Some("http://assistant.internal:9000")
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.health_interval, Duration::from_secs(10));
        assert!(!config.use_color);
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        let args = ChatArgs {
            timeout_secs: Some(0),
            health_interval_secs: Some(0),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.timeout, None);
        assert_eq!(config.health_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_api_url("http://localhost:8001")
            .with_timeout(Duration::from_secs(15))
            .with_health_interval(Duration::from_secs(2))
            .without_color();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8001"));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.health_interval, Duration::from_secs(2));
        assert!(!config.use_color);
    }
}
