//! Turning binding results into HTTP responses.

use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderName, HeaderValue, Response, StatusCode};
use tracing::debug;

use crate::config::BindingConfig;
use crate::error::{BindingError, BindingOutcome};
use crate::result::{BindingResult, BindingResultCode};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

fn header_value(name: &str, value: &str) -> BindingOutcome<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| BindingError::invalid_header(name, e))
}

/// Shapes an `http::Response` from a [`BindingResult`].
///
/// The auxiliary data decides the shape:
///
/// 1. a redirect location turns the response into `303 See Other`, whatever
///    the result code says;
/// 2. otherwise the status follows the result code, and the body is the
///    result body or, failing that, the result message;
/// 3. extra response headers are appended;
/// 4. the minor result is surfaced verbatim in the configured header.
#[derive(Debug, Clone)]
pub struct ResponseRenderer {
    minor_result_header: HeaderName,
}

impl ResponseRenderer {
    /// Creates a renderer using `header` for the minor result.
    pub fn new(minor_result_header: HeaderName) -> Self {
        Self {
            minor_result_header,
        }
    }

    /// Creates a renderer from the binding configuration.
    pub fn from_config(config: &BindingConfig) -> BindingOutcome<Self> {
        let name = HeaderName::from_bytes(config.minor_result_header.as_bytes())
            .map_err(|e| BindingError::invalid_header(&config.minor_result_header, e))?;
        Ok(Self::new(name))
    }

    /// Returns the header the minor result is surfaced in.
    pub fn minor_result_header(&self) -> &HeaderName {
        &self.minor_result_header
    }

    /// Renders the result.
    pub fn render(&self, result: &BindingResult) -> BindingOutcome<Response<String>> {
        let aux = result.aux_data();

        debug!(
            code = %result.code(),
            redirect = aux.redirect_location().is_some(),
            minor_result = aux.minor_result().is_some(),
            "Rendering binding result"
        );

        let mut response = if let Some(location) = aux.redirect_location() {
            Response::builder()
                .status(StatusCode::SEE_OTHER)
                .header(LOCATION, header_value(LOCATION.as_str(), location)?)
                .body(String::new())?
        } else if result.code() == BindingResultCode::Redirect {
            return Err(BindingError::MissingRedirectLocation);
        } else {
            let builder = Response::builder().status(result.code().http_status());
            match (result.body(), result.message()) {
                (Some(body), _) => builder
                    .header(
                        CONTENT_TYPE,
                        header_value(CONTENT_TYPE.as_str(), &body.mime_type)?,
                    )
                    .body(body.content.clone())?,
                (None, Some(message)) => builder
                    .header(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))
                    .body(message.to_string())?,
                (None, None) => builder.body(String::new())?,
            }
        };

        let headers = response.headers_mut();
        for (name, value) in aux.response_headers().iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BindingError::invalid_header(name, e))?;
            headers.append(header_name, header_value(name, value)?);
        }

        if let Some(minor) = aux.minor_result() {
            let value = header_value(self.minor_result_header.as_str(), minor)?;
            headers.insert(self.minor_result_header.clone(), value);
        }

        Ok(response)
    }
}

impl Default for ResponseRenderer {
    fn default() -> Self {
        Self::new(HeaderName::from_static("x-result-minor"))
    }
}
