//! Response interceptors expressed as tower layers.
//!
//! Each interceptor appends a fixed set of headers to every response the
//! wrapped service produces, including responses built from add-on errors.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
    X_XSS_PROTECTION,
};
use http::{HeaderName, HeaderValue, Response};
use tower::{Layer, Service};

/// Policy sent with every response of the binding.
pub const CONTENT_SECURITY_POLICY_VALUE: &str =
    "default-src 'none'; script-src 'none'; style-src 'self'; img-src 'self'";

/// A tower [`Layer`] appending fixed headers to responses.
///
/// # Example
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
///
/// let svc = ServiceBuilder::new()
///     .layer(ResponseHeadersLayer::security())
///     .layer(ResponseHeadersLayer::cache_control())
///     .service(binding);
/// ```
#[derive(Debug, Clone)]
pub struct ResponseHeadersLayer {
    headers: Arc<[(HeaderName, HeaderValue)]>,
}

impl ResponseHeadersLayer {
    /// Creates a layer appending the given headers.
    pub fn new(headers: impl IntoIterator<Item = (HeaderName, HeaderValue)>) -> Self {
        Self {
            headers: headers.into_iter().collect(),
        }
    }

    /// Security headers against script injection, sniffing and framing.
    pub fn security() -> Self {
        Self::new([
            (X_XSS_PROTECTION, HeaderValue::from_static("1")),
            (
                CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
            ),
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        ])
    }

    /// `Cache-Control: no-store`, so that user agents keep no copy.
    pub fn cache_control() -> Self {
        Self::new([(CACHE_CONTROL, HeaderValue::from_static("no-store"))])
    }

    /// Returns the headers this layer appends.
    pub fn headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }
}

impl<S> Layer<S> for ResponseHeadersLayer {
    type Service = AddResponseHeaders<S>;

    fn layer(&self, inner: S) -> AddResponseHeaders<S> {
        AddResponseHeaders {
            inner,
            headers: Arc::clone(&self.headers),
        }
    }
}

/// The [`Service`] produced by [`ResponseHeadersLayer`].
#[derive(Debug, Clone)]
pub struct AddResponseHeaders<S> {
    inner: S,
    headers: Arc<[(HeaderName, HeaderValue)]>,
}

impl<S, Req, B> Service<Req> for AddResponseHeaders<S>
where
    S: Service<Req, Response = Response<B>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
{
    type Response = Response<B>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response<B>, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let fut = self.inner.call(req);
        let headers = Arc::clone(&self.headers);

        async move {
            let mut response = fut.await?;
            let map = response.headers_mut();
            for (name, value) in headers.iter() {
                map.append(name.clone(), value.clone());
            }
            Ok(response)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{ServiceBuilder, ServiceExt, service_fn};

    #[tokio::test]
    async fn test_security_and_cache_headers_added() {
        let svc = ServiceBuilder::new()
            .layer(ResponseHeadersLayer::security())
            .layer(ResponseHeadersLayer::cache_control())
            .service(service_fn(|_: ()| async {
                Ok::<_, Infallible>(Response::new(String::new()))
            }));

        let response = svc.oneshot(()).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers[X_XSS_PROTECTION], "1");
        assert_eq!(headers[CONTENT_SECURITY_POLICY], CONTENT_SECURITY_POLICY_VALUE);
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let svc = ResponseHeadersLayer::cache_control().layer(service_fn(|_: ()| async {
            Err::<Response<String>, _>("failed")
        }));

        let err = svc.oneshot(()).await.unwrap_err();
        assert_eq!(err, "failed");
    }
}
