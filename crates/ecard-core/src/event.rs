//! Event payloads emitted by the IFD layer.
//!
//! This module provides the event infrastructure shared between the IFD layer
//! and its listeners:
//!
//! - [`Event`] - Base trait for all events, every event is about one handle
//! - [`EventEnvelope`] - The plain notification wrapping only a handle
//! - [`IfdEvent`] - A card/terminal state change with its [`IfdChange`]
//! - [`BoxedEvent`] - Type-erased container used by dispatchers
//!
//! # Reset vs. insertion
//!
//! A reset and an insertion can carry the same handle and the same protocol.
//! They are still different changes: after a reset the card (and its handle)
//! persists, only session state bound to the previous protocol establishment
//! becomes invalid. [`IfdChange`] keeps the two apart so that a listener can
//! match on it instead of combining a nullable protocol with a flag.
//!
//! ```rust
//! use ecard_core::{ConnectionHandle, IfdChange, IfdEvent};
//!
//! let handle = ConnectionHandle::new().with_ifd_name("reader").shared();
//! let event = IfdEvent::reset(handle, Some("T=1".into()));
//!
//! match event.change() {
//!     IfdChange::Reset { .. } => { /* invalidate sessions, keep the handle */ }
//!     IfdChange::Inserted { .. } => { /* new card */ }
//!     IfdChange::Plain => {}
//! }
//! assert!(event.card_was_reset());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::handle::SharedHandle;

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all events concerning a connection handle.
///
/// Events are immutable once constructed and may be delivered to several
/// listeners on different threads, hence the `Send + Sync` bound.
pub trait Event: Any + Send + Sync {
    /// Returns the human-readable name of this event type.
    fn event_name(&self) -> &'static str;

    /// Returns the handle of the card/terminal this event is about.
    fn handle(&self) -> &SharedHandle;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Event Envelope
// ============================================================================

/// A notification that carries nothing but the handle it concerns.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    handle: SharedHandle,
}

impl EventEnvelope {
    /// Creates an envelope for the given handle.
    pub fn new(handle: SharedHandle) -> Self {
        Self { handle }
    }
}

impl Event for EventEnvelope {
    fn event_name(&self) -> &'static str {
        "envelope"
    }

    fn handle(&self) -> &SharedHandle {
        &self.handle
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Identifier of an interface protocol established with a card.
///
/// The value is opaque to this crate (e.g. `"T=1"` or a protocol URN) and is
/// compared and displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Protocol(String);

impl Protocol {
    /// Creates a protocol identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Protocol {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Protocol {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for Protocol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Protocol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// IFD Change
// ============================================================================

/// The kind of state change an [`IfdEvent`] reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum IfdChange {
    /// A change without protocol establishment and without reset.
    #[default]
    Plain,
    /// A change that established or confirmed a protocol, e.g. a card insertion.
    Inserted {
        /// The established protocol.
        protocol: Protocol,
    },
    /// A reset of a card that is still physically present.
    ///
    /// The protocol, if any, is the one re-established after the reset.
    Reset {
        /// The protocol established after the reset.
        protocol: Option<Protocol>,
    },
}

impl IfdChange {
    /// Returns the protocol carried by this change.
    pub fn protocol(&self) -> Option<&Protocol> {
        match self {
            Self::Plain => None,
            Self::Inserted { protocol } => Some(protocol),
            Self::Reset { protocol } => protocol.as_ref(),
        }
    }

    /// Returns `true` if this change is a card reset.
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}

// ============================================================================
// IFD Event
// ============================================================================

/// A state-change notification for one card/terminal, emitted by the IFD layer.
///
/// The event is created once at detection time and never mutated. It only
/// enforces presence of the handle; whether the handle is meaningful is the
/// emitter's responsibility.
#[derive(Debug, Clone)]
pub struct IfdEvent {
    handle: SharedHandle,
    change: IfdChange,
}

impl IfdEvent {
    /// Creates an event without protocol and without reset.
    pub fn new(handle: SharedHandle) -> Self {
        Self::from_change(handle, IfdChange::Plain)
    }

    /// Creates an event for a change that established the given protocol.
    pub fn with_protocol(handle: SharedHandle, protocol: impl Into<Protocol>) -> Self {
        Self::from_change(
            handle,
            IfdChange::Inserted {
                protocol: protocol.into(),
            },
        )
    }

    /// Creates an event for a reset of a card that stays present.
    pub fn reset(handle: SharedHandle, protocol: Option<Protocol>) -> Self {
        Self::from_change(handle, IfdChange::Reset { protocol })
    }

    /// Creates an event from an explicit change.
    pub fn from_change(handle: SharedHandle, change: IfdChange) -> Self {
        Self { handle, change }
    }

    /// Creates an event from an optional protocol and a reset flag.
    ///
    /// A set reset flag always yields [`IfdChange::Reset`], even when a
    /// protocol is given.
    pub fn from_parts(handle: SharedHandle, protocol: Option<Protocol>, reset: bool) -> Self {
        let change = match (protocol, reset) {
            (protocol, true) => IfdChange::Reset { protocol },
            (Some(protocol), false) => IfdChange::Inserted { protocol },
            (None, false) => IfdChange::Plain,
        };
        Self::from_change(handle, change)
    }

    /// Returns the handle this event is about.
    pub fn handle(&self) -> &SharedHandle {
        &self.handle
    }

    /// Returns the interface protocol, if the change carried one.
    pub fn protocol(&self) -> Option<&Protocol> {
        self.change.protocol()
    }

    /// Returns `true` if the change was a reset of a card that stays present.
    pub fn card_was_reset(&self) -> bool {
        self.change.is_reset()
    }

    /// Returns the change reported by this event.
    pub fn change(&self) -> &IfdChange {
        &self.change
    }
}

impl Event for IfdEvent {
    fn event_name(&self) -> &'static str {
        "ifd"
    }

    fn handle(&self) -> &SharedHandle {
        &self.handle
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Boxed Event
// ============================================================================

/// A type-erased container for events that supports runtime downcasting.
///
/// `BoxedEvent` wraps any [`Event`] in an `Arc`, so handing it to several
/// listeners only clones the pointer.
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing `Event`.
    pub fn new<E: Event + 'static>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event + 'static>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }

    /// Returns `true` if the wrapped event is of type `E`.
    pub fn is<E: Event + 'static>(&self) -> bool {
        self.inner.as_any().is::<E>()
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .field("handle", self.handle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ConnectionHandle;
    use std::thread;

    fn handle() -> SharedHandle {
        ConnectionHandle::new()
            .with_ifd_name("test reader")
            .with_slot_index(0)
            .shared()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_plain_event_without_protocol() {
        let h = handle();
        let event = IfdEvent::new(Arc::clone(&h));

        assert!(!event.card_was_reset());
        assert!(event.protocol().is_none());
        assert_eq!(event.change(), &IfdChange::Plain);
        assert!(Arc::ptr_eq(event.handle(), &h));
    }

    #[test]
    fn test_reset_with_protocol() {
        let h = handle();
        let event = IfdEvent::from_parts(Arc::clone(&h), Some("T=1".into()), true);

        assert!(event.card_was_reset());
        assert_eq!(event.protocol().map(Protocol::as_str), Some("T=1"));
        assert!(Arc::ptr_eq(event.handle(), &h));
    }

    #[test]
    fn test_reset_is_not_insertion() {
        let h = handle();
        let inserted = IfdEvent::with_protocol(Arc::clone(&h), "T=1");
        let reset = IfdEvent::reset(Arc::clone(&h), Some("T=1".into()));

        assert_eq!(inserted.protocol(), reset.protocol());
        assert!(!inserted.card_was_reset());
        assert!(reset.card_was_reset());
        assert_ne!(inserted.change(), reset.change());
    }

    #[test]
    fn test_from_parts_without_reset() {
        let plain = IfdEvent::from_parts(handle(), None, false);
        assert_eq!(plain.change(), &IfdChange::Plain);

        let inserted = IfdEvent::from_parts(handle(), Some("T=0".into()), false);
        assert!(!inserted.card_was_reset());
        assert!(matches!(inserted.change(), IfdChange::Inserted { protocol } if protocol == "T=0"));

        let reset = IfdEvent::from_parts(handle(), None, true);
        assert!(reset.card_was_reset());
        assert!(reset.protocol().is_none());
    }

    #[test]
    fn test_events_are_shareable_across_threads() {
        assert_send_sync::<IfdEvent>();
        assert_send_sync::<BoxedEvent>();

        let h = handle();
        let event = Arc::new(IfdEvent::reset(Arc::clone(&h), Some("T=1".into())));

        let listeners: Vec<_> = (0..4)
            .map(|_| {
                let event = Arc::clone(&event);
                thread::spawn(move || {
                    (
                        event.card_was_reset(),
                        event.protocol().map(|p| p.to_string()),
                    )
                })
            })
            .collect();

        for listener in listeners {
            let (reset, protocol) = listener.join().unwrap();
            assert!(reset);
            assert_eq!(protocol.as_deref(), Some("T=1"));
        }
        assert!(Arc::ptr_eq(event.handle(), &h));
    }

    #[test]
    fn test_boxed_event_downcast() {
        let boxed = BoxedEvent::new(IfdEvent::with_protocol(handle(), "T=1"));

        assert_eq!(boxed.event_name(), "ifd");
        assert!(boxed.is::<IfdEvent>());
        assert!(!boxed.is::<EventEnvelope>());

        let ifd = boxed.downcast_ref::<IfdEvent>().unwrap();
        assert_eq!(ifd.protocol().unwrap(), "T=1");
    }

    #[test]
    fn test_envelope_keeps_handle() {
        let h = handle();
        let boxed = BoxedEvent::new(EventEnvelope::new(Arc::clone(&h)));
        assert_eq!(boxed.event_name(), "envelope");
        assert!(Arc::ptr_eq(boxed.handle(), &h));
    }
}
