//! Error types for the logger registry

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Wrapper factory failed for a logger
    #[error("Failed to create wrapper for logger '{logger}': {message}")]
    WrapperCreation { logger: String, message: String },

    /// Factory asked the registry for a wrapper while it was creating one
    #[error("Reentrant wrapper lookup for logger '{logger}' from inside a wrapper factory")]
    ReentrantLookup { logger: String },

    /// Logger has no repository to scope it
    #[error("Logger '{logger}' is not attached to a repository")]
    RepositoryUnavailable { logger: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Appender failure
    #[error("Appender '{appender}' failed: {message}")]
    AppenderError { appender: String, message: String },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a wrapper creation error
    pub fn wrapper_creation(logger: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::WrapperCreation {
            logger: logger.into(),
            message: message.into(),
        }
    }

    /// Create a reentrant lookup error
    pub fn reentrant_lookup(logger: impl Into<String>) -> Self {
        LoggerError::ReentrantLookup {
            logger: logger.into(),
        }
    }

    /// Create a repository unavailable error
    pub fn repository_unavailable(logger: impl Into<String>) -> Self {
        LoggerError::RepositoryUnavailable {
            logger: logger.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an appender error
    pub fn appender(appender: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AppenderError {
            appender: appender.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
