use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::types::HealthResponse;

/// Best-effort reachability signal for the assistant service.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// No health check has completed yet.
    #[default]
    Unknown,

    /// The last health check reported "healthy".
    Connected,

    /// The last health check failed or reported anything but "healthy".
    Disconnected,
}

impl Connectivity {
    /// Maps the outcome of a health check onto a connectivity value.
    ///
    /// Never yields [`Connectivity::Unknown`].
    pub fn from_health_check(result: &Result<HealthResponse>) -> Self {
        match result {
            Ok(health) if health.is_healthy() => Connectivity::Connected,
            _ => Connectivity::Disconnected,
        }
    }

    /// Short label suitable for a status indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Unknown => "Checking...",
            Connectivity::Connected => "Connected",
            Connectivity::Disconnected => "Disconnected",
        }
    }

    /// True once a health check has reported the service healthy.
    pub fn is_connected(&self) -> bool {
        matches!(self, Connectivity::Connected)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Unknown => write!(f, "unknown"),
            Connectivity::Connected => write!(f, "connected"),
            Connectivity::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn healthy_status_connects() {
        let result = Ok(HealthResponse::new("healthy", true));
        assert_eq!(
            Connectivity::from_health_check(&result),
            Connectivity::Connected
        );
    }

    #[test]
    fn other_status_disconnects() {
        let result = Ok(HealthResponse::new("starting", false));
        assert_eq!(
            Connectivity::from_health_check(&result),
            Connectivity::Disconnected
        );
    }

    #[test]
    fn failure_disconnects() {
        let result = Err(Error::transport("Health check failed", None));
        assert_eq!(
            Connectivity::from_health_check(&result),
            Connectivity::Disconnected
        );
    }

    #[test]
    fn labels() {
        assert_eq!(Connectivity::default(), Connectivity::Unknown);
        assert_eq!(Connectivity::Unknown.label(), "Checking...");
        assert_eq!(Connectivity::Connected.label(), "Connected");
        assert_eq!(Connectivity::Disconnected.label(), "Disconnected");
    }
}
