//! Add-on actions invoked by bindings.
//!
//! An [`AppPluginAction`] handles one request addressed to an add-on and
//! returns a [`BindingResult`]. Async closures are actions too:
//!
//! ```rust,ignore
//! use ecard_binding::{AppExtensionError, BindingRequest, BindingResult};
//!
//! let action = |req: BindingRequest| async move {
//!     let session = req
//!         .parameter("session")
//!         .ok_or_else(|| AppExtensionError::unknown("missing session"))?;
//!     Ok::<_, AppExtensionError>(BindingResult::ok().with_message(session.to_string()))
//! };
//! ```

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use http::HeaderMap;

use crate::result::BindingResult;

/// A request handed from a binding to an add-on action.
#[derive(Debug, Clone, Default)]
pub struct BindingRequest {
    resource: String,
    parameters: HashMap<String, String>,
    headers: HeaderMap,
    body: Option<String>,
}

impl BindingRequest {
    /// Creates a request for the given resource path.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Adds a request parameter (builder pattern).
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Replaces the request headers (builder pattern).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request body (builder pattern).
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the resource path.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns a request parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns all request parameters.
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

// ============================================================================
// IntoBindingResult
// ============================================================================

/// Types an action may return.
///
/// Errors convert into a result through `Into<BindingResult>`, which is how
/// [`AppExtensionError`](crate::AppExtensionError) and
/// [`RedirectionError`](crate::RedirectionError) reach the binding.
pub trait IntoBindingResult: Send + 'static {
    /// Converts into a binding result.
    fn into_binding_result(self) -> BindingResult;
}

impl IntoBindingResult for BindingResult {
    fn into_binding_result(self) -> BindingResult {
        self
    }
}

impl<T, E> IntoBindingResult for Result<T, E>
where
    T: IntoBindingResult,
    E: Into<BindingResult> + Send + 'static,
{
    fn into_binding_result(self) -> BindingResult {
        match self {
            Ok(t) => t.into_binding_result(),
            Err(e) => e.into(),
        }
    }
}

// ============================================================================
// AppPluginAction
// ============================================================================

/// An add-on entry point reachable through a binding.
#[async_trait]
pub trait AppPluginAction: Send + Sync + 'static {
    /// Processes one request.
    async fn execute(&self, request: BindingRequest) -> BindingResult;
}

#[async_trait]
impl<F, Fut, R> AppPluginAction for F
where
    F: Fn(BindingRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoBindingResult,
{
    async fn execute(&self, request: BindingRequest) -> BindingResult {
        self(request).await.into_binding_result()
    }
}
