//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while setting up the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The logging system could not be initialized.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// A global subscriber was installed before.
    #[error("A global logging subscriber is already installed")]
    LoggingAlreadyInitialized,

    /// The HTTP binding could not be assembled.
    #[error("Failed to build binding: {0}")]
    Binding(#[from] ecard_binding::BindingError),
}

impl RuntimeError {
    /// Creates a logging error.
    pub fn logging(message: impl std::fmt::Display) -> Self {
        Self::Logging(message.to_string())
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
