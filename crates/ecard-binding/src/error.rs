//! Error types for bindings and add-on actions.

use ecard_core::{AuxData, AuxDataError};
use thiserror::Error;

use crate::result::{BindingResult, BindingResultCode};

// =============================================================================
// Binding Errors
// =============================================================================

/// Contract errors found by a binding while shaping a response.
///
/// These describe a mismatch between what an add-on produced and what the
/// binding can express. They never stand for transport or protocol failures.
#[derive(Debug, Clone, Error)]
pub enum BindingError {
    /// The auxiliary data violates its vocabulary.
    #[error(transparent)]
    AuxData(#[from] AuxDataError),

    /// The result asks for a redirect but carries no target.
    #[error("result code REDIRECT without a redirect location")]
    MissingRedirectLocation,

    /// A header name or value cannot be put on the wire.
    #[error("invalid response header '{name}': {reason}")]
    InvalidHeader {
        /// The header name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The response could not be assembled.
    #[error("failed to build response: {0}")]
    Http(String),
}

impl BindingError {
    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<http::Error> for BindingError {
    fn from(err: http::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Result type for binding operations.
pub type BindingOutcome<T> = Result<T, BindingError>;

// =============================================================================
// Add-on Errors
// =============================================================================

/// A failure inside an add-on action.
///
/// The optional minor code is passed on to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppExtensionError {
    minor: Option<String>,
    message: String,
}

impl AppExtensionError {
    /// Creates an error with a minor result code.
    pub fn new(minor: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            minor: Some(minor.into()),
            message: message.into(),
        }
    }

    /// Creates an error without a minor result code.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            minor: None,
            message: message.into(),
        }
    }

    /// Returns the minor result code.
    pub fn minor(&self) -> Option<&str> {
        self.minor.as_deref()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppExtensionError> for BindingResult {
    fn from(err: AppExtensionError) -> Self {
        let mut aux = AuxData::builder();
        if let Some(minor) = err.minor {
            aux = aux.minor_result(minor);
        }
        BindingResult::new(BindingResultCode::InternalError)
            .with_message(err.message)
            .with_aux_data(aux.build())
    }
}

/// A failure after which the caller must be sent to an error location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (redirecting to {location})")]
pub struct RedirectionError {
    location: String,
    message: String,
}

impl RedirectionError {
    /// Creates a redirection error.
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Returns the location the caller is redirected to.
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl From<RedirectionError> for BindingResult {
    fn from(err: RedirectionError) -> Self {
        BindingResult::redirect(err.location).with_message(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PERMISSION: &str =
        "http://www.bsi.bund.de/ecard/api/1.1/resultminor/al/common#noPermission";

    #[test]
    fn test_extension_error_keeps_minor() {
        let result: BindingResult = AppExtensionError::new(NO_PERMISSION, "denied").into();

        assert_eq!(result.code(), BindingResultCode::InternalError);
        assert_eq!(result.message(), Some("denied"));
        assert_eq!(result.aux_data().minor_result(), Some(NO_PERMISSION));
    }

    #[test]
    fn test_unknown_extension_error_has_no_minor() {
        let result: BindingResult = AppExtensionError::unknown("boom").into();
        assert!(result.aux_data().minor_result().is_none());
    }

    #[test]
    fn test_redirection_error_redirects() {
        let err = RedirectionError::new("https://example.org/error", "card removed");
        assert_eq!(
            err.to_string(),
            "card removed (redirecting to https://example.org/error)"
        );

        let result: BindingResult = err.into();
        assert_eq!(result.code(), BindingResultCode::Redirect);
        assert_eq!(
            result.aux_data().redirect_location(),
            Some("https://example.org/error")
        );
    }
}
