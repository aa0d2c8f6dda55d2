//! Runtime wiring of configuration, logging and bindings.
//!
//! ```rust,ignore
//! use ecard_runtime::EcardRuntime;
//!
//! let runtime = EcardRuntime::builder()
//!     .config_file("ecard.toml")
//!     .profile("production")
//!     .build()?;
//!
//! let svc = runtime.http_binding(status_action)?;
//! ```

use std::path::Path;

use ecard_binding::{AppPluginAction, BoxedBindingService, HttpBinding};
use tracing::{debug, info};

use crate::config::{ConfigLoader, EcardConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Holds the loaded configuration and builds bindings from it.
#[derive(Debug, Clone)]
pub struct EcardRuntime {
    config: EcardConfig,
}

impl EcardRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration and
    /// initializes logging from it.
    ///
    /// An already installed global subscriber is kept. Any other logging
    /// failure, such as an unopenable log file, is returned.
    pub fn from_config(config: EcardConfig) -> RuntimeResult<Self> {
        match logging::init_from_config(&config.logging) {
            Ok(()) => {}
            Err(RuntimeError::LoggingAlreadyInitialized) => {
                debug!("Keeping the installed logging subscriber");
            }
            Err(e) => return Err(e),
        }

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            security_headers = config.binding.security_headers,
            cache_control = config.binding.cache_control,
            "Runtime initialized from configuration"
        );

        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EcardConfig {
        &self.config
    }

    /// Builds the HTTP binding service for `action` from the binding configuration.
    pub fn http_binding<A: AppPluginAction>(&self, action: A) -> RuntimeResult<BoxedBindingService> {
        let svc = HttpBinding::new(action)
            .config(self.config.binding.clone())
            .into_service()?;
        Ok(svc)
    }
}

/// Builder for [`EcardRuntime`], wrapping a [`ConfigLoader`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: EcardConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<EcardRuntime> {
        let config = self.config_loader.load()?;
        EcardRuntime::from_config(config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogOutput;
    use ecard_binding::{BindingConfig, BindingRequest, BindingResult};
    use ecard_core::AuxData;
    use tower::ServiceExt;

    fn runtime_with(binding: BindingConfig) -> EcardRuntime {
        EcardRuntime::builder()
            .search_path(std::env::temp_dir().join("ecard-runtime-tests-nonexistent"))
            .without_env()
            .merge(EcardConfig {
                binding,
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_binding_uses_configured_minor_header() {
        let runtime = runtime_with(BindingConfig {
            minor_result_header: "ResultMinor".into(),
            ..Default::default()
        });

        let svc = runtime
            .http_binding(|_: BindingRequest| async {
                BindingResult::ok()
                    .with_aux_data(AuxData::builder().minor_result("urn:minor#done").build())
            })
            .unwrap();

        let response = svc.oneshot(BindingRequest::new("/")).await.unwrap();
        assert_eq!(response.headers()["resultminor"], "urn:minor#done");
        assert_eq!(response.headers()["cache-control"], "no-store");
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let result = EcardRuntime::builder()
            .search_path(std::env::temp_dir().join("ecard-runtime-tests-nonexistent"))
            .without_env()
            .merge(EcardConfig {
                binding: BindingConfig {
                    minor_result_header: String::new(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .build();

        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_unwritable_log_file_fails_build() {
        let blocker = std::env::temp_dir().join("ecard-runtime-not-a-directory");
        std::fs::write(&blocker, b"").unwrap();

        let mut config = EcardConfig::default();
        config.logging.output = LogOutput::File;
        config.logging.file_path = Some(blocker.join("ecard.log"));

        let result = EcardRuntime::builder()
            .search_path(std::env::temp_dir().join("ecard-runtime-tests-nonexistent"))
            .without_env()
            .merge(config)
            .build();

        assert!(matches!(result, Err(RuntimeError::Logging(_))));
    }
}
