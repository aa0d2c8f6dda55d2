//! # eCard Binding
//!
//! The transport-facing side of the eCard connector.
//!
//! Add-ons implement [`AppPluginAction`] and return a [`BindingResult`]: a
//! coarse [`BindingResultCode`], an optional message or body, and the
//! [`AuxData`](ecard_core::AuxData) collected while processing the request.
//! Bindings read that auxiliary data to decide how the outgoing response looks.
//!
//! The [`http`] module contains the HTTP binding, a tower service with
//! interceptor layers for security and cache headers.

pub mod action;
pub mod config;
pub mod error;
pub mod http;
pub mod result;

pub use action::{AppPluginAction, BindingRequest, IntoBindingResult};
pub use config::BindingConfig;
pub use error::{AppExtensionError, BindingError, BindingOutcome, RedirectionError};
pub use self::http::{BoxedBindingService, HttpBinding, HttpBindingService, ResponseRenderer};
pub use result::{BindingBody, BindingResult, BindingResultCode};
