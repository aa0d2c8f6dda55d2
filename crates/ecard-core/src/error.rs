//! Error types for the eCard core.
//!
//! Event construction and access cannot fail, so the only errors defined here
//! are contract violations found while interpreting auxiliary data.

use thiserror::Error;

/// Errors raised when auxiliary data does not follow its vocabulary.
///
/// These are contract errors between an add-on and a binding. They are
/// distinct from transport or protocol failures and must be reported to the
/// caller of the reading component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuxDataError {
    /// A well-known key carries a value of the wrong shape.
    #[error("auxiliary data '{key}' has unexpected shape: expected {expected}, found {found}")]
    UnexpectedShape {
        /// The offending key.
        key: String,
        /// Description of the expected shape.
        expected: &'static str,
        /// Kind of the value that was found.
        found: &'static str,
    },

    /// An extension key uses the reserved vocabulary prefix.
    #[error("auxiliary data key '{key}' uses the reserved prefix but is not a known key")]
    ReservedKey {
        /// The offending key.
        key: String,
    },
}

impl AuxDataError {
    /// Creates an unexpected shape error.
    pub fn unexpected_shape(
        key: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::UnexpectedShape {
            key: key.into(),
            expected,
            found,
        }
    }

    /// Returns the key the error is about.
    pub fn key(&self) -> &str {
        match self {
            Self::UnexpectedShape { key, .. } | Self::ReservedKey { key } => key,
        }
    }
}

/// Result type for auxiliary data operations.
pub type AuxDataResult<T> = Result<T, AuxDataError>;
