//! eCard Runtime - configuration and logging for the eCard connector.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `EcardConfig`)
//! - Logging setup (`LoggingBuilder`, `SpanEvents`)
//! - `EcardRuntime`, which builds bindings from the loaded configuration
//!
//! ```ignore
//! use ecard_runtime::EcardRuntime;
//!
//! let runtime = EcardRuntime::builder().profile("production").build()?;
//! let svc = runtime.http_binding(my_action)?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, EcardConfig, LogFormat, LogLevel, LogOutput,
    LogRotation, LoggingConfig, Profile,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{EcardRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module with the common logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
