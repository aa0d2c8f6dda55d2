//! # eCard Core
//!
//! The contract between the interface-device (IFD) layer and the layers that
//! consume its state changes.
//!
//! This crate provides two small pieces that everything else builds on:
//!
//! - **IFD events**: the immutable payload describing a card/terminal state
//!   change ([`IfdEvent`], [`IfdChange`]) about a shared [`ConnectionHandle`].
//! - **Auxiliary data**: the vocabulary ([`aux_data::keys`]) and typed form
//!   ([`AuxData`]) of the side channel through which add-ons tell bindings to
//!   redirect, add headers, or surface a minor result.
//!
//! Delivering events to listeners, driving card readers and serving HTTP are
//! left to the surrounding system.
//!
//! ## Flow
//!
//! ```text
//! ┌───────────┐  IfdEvent   ┌───────────┐
//! │ IFD layer │────────────▶│ event bus │────▶ listeners
//! └───────────┘             └───────────┘
//!
//! ┌───────────┐  AuxData    ┌───────────┐
//! │  add-on   │────────────▶│  binding  │────▶ response
//! └───────────┘             └───────────┘
//! ```

pub mod aux_data;
pub mod error;
pub mod event;
pub mod handle;

pub use aux_data::{AuxData, AuxDataBuilder, AuxDataMap, ResponseHeaders};
pub use error::{AuxDataError, AuxDataResult};
pub use event::{BoxedEvent, Event, EventEnvelope, IfdChange, IfdEvent, Protocol};
pub use handle::{ConnectionHandle, SharedHandle};

/// Prelude for common imports.
pub mod prelude {
    pub use super::aux_data::{AuxData, AuxDataBuilder, keys};
    pub use super::event::{Event, IfdChange, IfdEvent, Protocol};
    pub use super::handle::{ConnectionHandle, SharedHandle};
}
