//! # eCard
//!
//! Core contracts of an eID/eCard connector.
//!
//! ## Overview
//!
//! The IFD layer reports card and terminal state changes as [`IfdEvent`](core::IfdEvent)s
//! about a shared connection handle. Add-ons answer requests with a
//! [`BindingResult`](binding::BindingResult) whose auxiliary data tells the
//! binding whether to redirect the caller, which headers to add and which
//! minor result to surface.
//!
//! ```text
//! ┌───────────┐  IfdEvent   ┌──────────────┐
//! │ IFD layer │────────────▶│  listeners   │
//! └───────────┘             └──────────────┘
//!
//! ┌───────────┐  request    ┌──────────────┐  BindingResult  ┌─────────┐
//! │  caller   │────────────▶│ HTTP binding │◀────────────────│ add-on  │
//! └───────────┘◀────────────└──────────────┘                 └─────────┘
//!               303 / status + headers
//! ```
//!
//! - [`core`]: events, connection handles and the auxiliary data vocabulary
//! - [`binding`]: binding results and the tower-based HTTP binding
//! - [`runtime`]: configuration loading and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ecard::prelude::*;
//!
//! let runtime = EcardRuntime::builder().build()?;
//! let svc = runtime.http_binding(|req: BindingRequest| async move {
//!     let aux = AuxData::builder()
//!         .redirect_location("https://example.org/refresh?ResultMajor=ok")
//!         .build();
//!     BindingResult::ok().with_aux_data(aux)
//! })?;
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use ecard_binding as binding;
pub use ecard_core as core;
pub use ecard_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Runtime - main entry point
    pub use ecard_runtime::{EcardConfig, EcardRuntime};

    // IFD events
    pub use ecard_core::{ConnectionHandle, IfdChange, IfdEvent, Protocol, SharedHandle};

    // Auxiliary data
    pub use ecard_core::aux_data::keys;
    pub use ecard_core::{AuxData, AuxDataBuilder};

    // Bindings
    pub use ecard_binding::{
        AppExtensionError, AppPluginAction, BindingConfig, BindingRequest, BindingResult,
        BindingResultCode, HttpBinding, RedirectionError,
    };
}
