//! Binding configuration.

use serde::{Deserialize, Serialize};

/// Default header carrying the minor process result.
pub const DEFAULT_MINOR_RESULT_HEADER: &str = "X-Result-Minor";

/// Settings of the HTTP binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Attach the security headers to every response.
    #[serde(default = "default_true")]
    pub security_headers: bool,

    /// Attach `Cache-Control: no-store` to every response.
    #[serde(default = "default_true")]
    pub cache_control: bool,

    /// Header in which the minor process result is surfaced.
    #[serde(default = "default_minor_result_header")]
    pub minor_result_header: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            security_headers: true,
            cache_control: true,
            minor_result_header: default_minor_result_header(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_minor_result_header() -> String {
    DEFAULT_MINOR_RESULT_HEADER.to_string()
}
