use serde::{Deserialize, Serialize};

/// Status value the health endpoint reports when the service is up.
pub const STATUS_HEALTHY: &str = "healthy";

/// Status value the readiness endpoint reports once the agent is initialized.
pub const STATUS_READY: &str = "ready";

/// Success body of the `health` and `readiness` operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Service status, e.g. "healthy", "ready" or "not_ready".
    pub status: String,

    /// Whether the service's agent has finished initializing.
    #[serde(default)]
    pub agent_initialized: bool,

    /// Service API version.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl HealthResponse {
    /// Creates a new health response.
    pub fn new(status: impl Into<String>, agent_initialized: bool) -> Self {
        Self {
            status: status.into(),
            agent_initialized,
            version: default_version(),
        }
    }

    /// True iff the status is exactly "healthy".
    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_HEALTHY
    }

    /// True iff the status is exactly "ready".
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_READY
    }
}
