//! The HTTP binding.
//!
//! [`HttpBindingService`] runs an [`AppPluginAction`] for each request and
//! shapes an `http::Response` from the returned [`BindingResult`](crate::BindingResult)
//! using a [`ResponseRenderer`]. [`HttpBinding`] stacks the configured
//! interceptor layers on top:
//!
//! ```text
//! BindingRequest ──▶ [security headers] ──▶ [cache control] ──▶ HttpBindingService ──▶ action
//! ```
//!
//! Accepting connections and parsing HTTP requests is left to the host; it
//! only has to turn each request into a [`BindingRequest`] and call the
//! service.
//!
//! ```rust,ignore
//! use ecard_binding::{BindingConfig, HttpBinding};
//! use tower::ServiceExt;
//!
//! let svc = HttpBinding::new(status_action)
//!     .config(BindingConfig::default())
//!     .into_service()?;
//! let response = svc.oneshot(BindingRequest::new("/getStatus")).await?;
//! ```

pub mod interceptor;
pub mod response;

pub use interceptor::{AddResponseHeaders, ResponseHeadersLayer};
pub use response::ResponseRenderer;

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use http::Response;
use tower::util::BoxCloneService;
use tower::{BoxError, Service, ServiceBuilder};
use tracing::{Instrument, debug_span, error};

use crate::action::{AppPluginAction, BindingRequest};
use crate::config::BindingConfig;
use crate::error::BindingOutcome;

/// A boxed, cloneable HTTP binding service.
pub type BoxedBindingService = BoxCloneService<BindingRequest, Response<String>, BoxError>;

// ============================================================================
// HttpBindingService
// ============================================================================

/// A tower [`Service`] that executes an add-on action and renders its result.
///
/// Contract violations in the returned result (see
/// [`BindingError`](crate::BindingError)) are logged and returned as the
/// service error; they never become a silently degraded response.
pub struct HttpBindingService<A> {
    action: Arc<A>,
    renderer: ResponseRenderer,
}

impl<A: AppPluginAction> HttpBindingService<A> {
    /// Creates a service using the default renderer.
    pub fn new(action: A) -> Self {
        Self::with_renderer(action, ResponseRenderer::default())
    }

    /// Creates a service using the given renderer.
    pub fn with_renderer(action: A, renderer: ResponseRenderer) -> Self {
        Self {
            action: Arc::new(action),
            renderer,
        }
    }
}

impl<A> Clone for HttpBindingService<A> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            renderer: self.renderer.clone(),
        }
    }
}

impl<A: AppPluginAction> Service<BindingRequest> for HttpBindingService<A> {
    type Response = Response<String>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Response<String>, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: BindingRequest) -> Self::Future {
        let action = Arc::clone(&self.action);
        let renderer = self.renderer.clone();
        let span = debug_span!("binding", resource = %req.resource());

        async move {
            let result = action.execute(req).await;
            renderer.render(&result).map_err(|e| {
                error!(code = %result.code(), error = %e, "Add-on result violates the binding contract");
                Box::new(e) as BoxError
            })
        }
        .instrument(span)
        .boxed()
    }
}

// ============================================================================
// HttpBinding
// ============================================================================

/// Builder assembling an HTTP binding from an action and its configuration.
pub struct HttpBinding<A> {
    action: A,
    config: BindingConfig,
}

impl<A: AppPluginAction> HttpBinding<A> {
    /// Creates a binding for `action` with the default configuration.
    pub fn new(action: A) -> Self {
        Self {
            action,
            config: BindingConfig::default(),
        }
    }

    /// Sets the configuration (builder pattern).
    pub fn config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the service with the configured interceptors.
    ///
    /// Fails if the configured minor result header is not a valid header name.
    pub fn into_service(self) -> BindingOutcome<BoxedBindingService> {
        let renderer = ResponseRenderer::from_config(&self.config)?;
        let svc = ServiceBuilder::new()
            .option_layer(
                self.config
                    .security_headers
                    .then(ResponseHeadersLayer::security),
            )
            .option_layer(
                self.config
                    .cache_control
                    .then(ResponseHeadersLayer::cache_control),
            )
            .service(HttpBindingService::with_renderer(self.action, renderer));

        Ok(BoxCloneService::new(svc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppExtensionError, BindingError};
    use crate::result::{BindingResult, BindingResultCode};
    use ecard_core::AuxData;
    use http::StatusCode;
    use http::header::{CACHE_CONTROL, LOCATION, X_FRAME_OPTIONS};
    use tokio_test::assert_ready_ok;
    use tokio_test::task;
    use tower::ServiceExt;

    const ALREADY_PERFORMED: &str =
        "http://www.bsi.bund.de/ecard/api/1.1/resultminor/sal#alreadyPerformed";

    #[test]
    fn test_service_is_always_ready() {
        let mut svc = HttpBindingService::new(|_: BindingRequest| async { BindingResult::ok() });
        let mut ready = task::spawn(futures::future::poll_fn(|cx| svc.poll_ready(cx)));
        assert_ready_ok!(ready.poll());
    }

    #[tokio::test]
    async fn test_plain_response_without_redirect() {
        let svc = HttpBinding::new(|_: BindingRequest| async {
            BindingResult::ok().with_message("status")
        })
        .into_service()
        .unwrap();

        let response = svc.oneshot(BindingRequest::new("/getStatus")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(LOCATION).is_none());
        assert_eq!(response.body(), "status");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "SAMEORIGIN");
    }

    #[tokio::test]
    async fn test_redirect_from_aux_data() {
        let svc = HttpBinding::new(|_: BindingRequest| async {
            BindingResult::redirect("https://example.org/refresh?ResultMajor=ok")
        })
        .into_service()
        .unwrap();

        let response = svc.oneshot(BindingRequest::new("/eID-Client")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[LOCATION],
            "https://example.org/refresh?ResultMajor=ok"
        );
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_minor_result_reaches_caller_unmodified() {
        let svc = HttpBinding::new(|_: BindingRequest| async {
            Err::<BindingResult, _>(AppExtensionError::new(
                ALREADY_PERFORMED,
                "process already performed",
            ))
        })
        .config(BindingConfig {
            minor_result_header: "ResultMinor".into(),
            ..Default::default()
        })
        .into_service()
        .unwrap();

        let response = svc.oneshot(BindingRequest::new("/eID-Client")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()["resultminor"].to_str().unwrap(),
            ALREADY_PERFORMED
        );
    }

    #[tokio::test]
    async fn test_interceptors_can_be_disabled() {
        let svc = HttpBinding::new(|_: BindingRequest| async { BindingResult::ok() })
            .config(BindingConfig {
                security_headers: false,
                cache_control: false,
                ..Default::default()
            })
            .into_service()
            .unwrap();

        let response = svc.oneshot(BindingRequest::new("/")).await.unwrap();
        assert!(response.headers().get(CACHE_CONTROL).is_none());
        assert!(response.headers().get(X_FRAME_OPTIONS).is_none());
    }

    #[tokio::test]
    async fn test_contract_error_is_surfaced() {
        let svc = HttpBinding::new(|_: BindingRequest| async {
            BindingResult::new(BindingResultCode::Redirect).with_aux_data(AuxData::new())
        })
        .into_service()
        .unwrap();

        let err = svc.oneshot(BindingRequest::new("/")).await.unwrap_err();
        let err = err.downcast::<BindingError>().unwrap();
        assert!(matches!(*err, BindingError::MissingRedirectLocation));
    }

    #[test]
    fn test_invalid_minor_header_config_rejected() {
        let result = HttpBinding::new(|_: BindingRequest| async { BindingResult::ok() })
            .config(BindingConfig {
                minor_result_header: "bad header".into(),
                ..Default::default()
            })
            .into_service();
        assert!(matches!(result, Err(BindingError::InvalidHeader { .. })));
    }
}
