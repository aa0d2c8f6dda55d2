//! Binding results.
//!
//! A [`BindingResult`] is what an add-on action hands back to the binding: a
//! coarse [`BindingResultCode`], an optional message and body, and the
//! [`AuxData`] attached while the request was processed.

use std::fmt;

use ecard_core::AuxData;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Outcome classes of an add-on action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingResultCode {
    /// The request was processed successfully.
    Ok,
    /// The caller is redirected to another location.
    Redirect,
    /// A request parameter has an invalid value.
    WrongParameter,
    /// A required request parameter is missing.
    MissingParameter,
    /// The requested resource does not exist.
    ResourceUnavailable,
    /// The requested resource is in use.
    ResourceLocked,
    /// A host the action depends on could not be reached.
    DependingHostUnreachable,
    /// The action failed internally.
    InternalError,
    /// The action was interrupted, e.g. by the user.
    Interrupted,
    /// The action did not finish in time.
    Timeout,
}

impl BindingResultCode {
    /// Returns the HTTP status an HTTP binding answers with.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Redirect => StatusCode::SEE_OTHER,
            Self::WrongParameter | Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::ResourceUnavailable => StatusCode::NOT_FOUND,
            Self::ResourceLocked => StatusCode::LOCKED,
            Self::DependingHostUnreachable => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Interrupted => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Returns `true` for [`BindingResultCode::Ok`].
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Returns the code name as it appears in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Redirect => "REDIRECT",
            Self::WrongParameter => "WRONG_PARAMETER",
            Self::MissingParameter => "MISSING_PARAMETER",
            Self::ResourceUnavailable => "RESOURCE_UNAVAILABLE",
            Self::ResourceLocked => "RESOURCE_LOCKED",
            Self::DependingHostUnreachable => "DEPENDING_HOST_UNREACHABLE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Interrupted => "INTERRUPTED",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for BindingResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a binding result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingBody {
    /// The payload.
    pub content: String,
    /// MIME type of the payload.
    pub mime_type: String,
}

impl BindingBody {
    /// Creates a body with an explicit MIME type.
    pub fn new(content: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Creates a `text/plain` body.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, "text/plain; charset=utf-8")
    }
}

/// The result of one add-on action, consumed by a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingResult {
    code: BindingResultCode,
    message: Option<String>,
    body: Option<BindingBody>,
    aux_data: AuxData,
}

impl BindingResult {
    /// Creates a result with the given code and no further content.
    pub fn new(code: BindingResultCode) -> Self {
        Self {
            code,
            message: None,
            body: None,
            aux_data: AuxData::new(),
        }
    }

    /// Creates a successful result.
    pub fn ok() -> Self {
        Self::new(BindingResultCode::Ok)
    }

    /// Creates a result redirecting the caller to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(BindingResultCode::Redirect)
            .with_aux_data(AuxData::builder().redirect_location(location).build())
    }

    /// Sets the result message (builder pattern).
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the body (builder pattern).
    pub fn with_body(mut self, body: BindingBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces the auxiliary data (builder pattern).
    ///
    /// A redirect target already set, e.g. by [`BindingResult::redirect`], is
    /// kept unless `aux_data` names its own.
    pub fn with_aux_data(mut self, aux_data: AuxData) -> Self {
        let kept = std::mem::take(&mut self.aux_data).redirect_location().map(str::to_owned);
        self.aux_data = match kept {
            Some(location) if aux_data.redirect_location().is_none() => {
                aux_data.into_builder().redirect_location(location).build()
            }
            _ => aux_data,
        };
        self
    }

    /// Returns the result code.
    pub fn code(&self) -> BindingResultCode {
        self.code
    }

    /// Returns the result message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the body.
    pub fn body(&self) -> Option<&BindingBody> {
        self.body.as_ref()
    }

    /// Returns the auxiliary data.
    pub fn aux_data(&self) -> &AuxData {
        &self.aux_data
    }
}

impl Default for BindingResult {
    fn default() -> Self {
        Self::ok()
    }
}
