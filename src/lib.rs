// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod monitor;
pub mod observability;
pub mod session;
pub mod transport;
pub mod types;

// Re-exports
pub use client::AssistantClient;
pub use error::{Error, Result};
pub use monitor::{ConnectivityMonitor, MonitorHandle};
pub use observability::register_biometrics;
pub use session::{
    InFlight, Session, SessionSnapshot, SessionState, SessionWatcher, TurnOutcome,
    failure_acknowledgment,
};
pub use transport::Transport;
pub use types::*;
