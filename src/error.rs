//! Error types for Colloquy.
//!
//! Every failure the conversation core can observe collapses into one of a
//! handful of categories.  Each error exposes a single human-readable message
//! through [`Error::message`]; that message is what the session surfaces to
//! the user.

use std::error;
use std::fmt;
use std::sync::Arc;

/// The main error type for Colloquy.
#[derive(Clone, Debug)]
pub enum Error {
    /// A submission was rejected locally before reaching the service.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },

    /// A submission was rejected because a request is already in flight.
    Busy {
        /// Human-readable error message.
        message: String,
    },

    /// The assistant service answered a chat or ask call with a failure.
    Remote {
        /// HTTP status code, if the failure came from a non-success status.
        status_code: Option<u16>,
        /// Human-readable error message, usually the service's `detail`.
        message: String,
    },

    /// The service could not be reached, or a health endpoint failed.
    Transport {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new busy error.
    pub fn busy(message: impl Into<String>) -> Self {
        Error::Busy {
            message: message.into(),
        }
    }

    /// Creates a new remote error.
    pub fn remote(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Error::Remote {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new transport error.
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Transport {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns the bare human-readable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Error::Validation { message, .. }
            | Error::Busy { message }
            | Error::Remote { message, .. }
            | Error::Transport { message, .. }
            | Error::Url { message, .. } => message,
        }
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns true if this error is a busy error.
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Busy { .. })
    }

    /// Returns true if this error came from the assistant service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    /// Returns true if this error is a transport error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Remote { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Busy { message } => {
                write!(f, "Busy: {message}")
            }
            Error::Remote {
                status_code,
                message,
            } => {
                if let Some(status_code) = status_code {
                    write!(f, "Remote error: {message} (status {status_code})")
                } else {
                    write!(f, "Remote error: {message}")
                }
            }
            Error::Transport { message, .. } => {
                write!(f, "Transport error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Transport { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for Colloquy operations.
pub type Result<T> = std::result::Result<T, Error>;
