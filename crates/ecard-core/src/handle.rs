//! Connection handles.
//!
//! A [`ConnectionHandle`] identifies a card, terminal and slot combination. It
//! is produced and validated by the IFD layer; everything in this crate treats
//! it as opaque and only ever holds it through a [`SharedHandle`], so that all
//! events about the same card point at the same canonical value.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared reference to the canonical connection handle.
pub type SharedHandle = Arc<ConnectionHandle>;

/// Identifier of a card/terminal/slot combination.
///
/// All fields are optional because a handle is filled in progressively: a
/// handle for an empty terminal only knows the terminal, a handle for a
/// connected card additionally knows its slot and card application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionHandle {
    /// Handle of the IFD context the terminal belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_handle: Option<Vec<u8>>,
    /// Name of the terminal (IFD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifd_name: Option<String>,
    /// Index of the slot within the terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_index: Option<u32>,
    /// Handle of an established card connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_handle: Option<Vec<u8>>,
    /// Identifier of the selected card application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_application: Option<Vec<u8>>,
    /// Protocol negotiated on top of the card connection, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl ConnectionHandle {
    /// Creates an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the context handle (builder pattern).
    pub fn with_context_handle(mut self, handle: impl Into<Vec<u8>>) -> Self {
        self.context_handle = Some(handle.into());
        self
    }

    /// Sets the terminal name (builder pattern).
    pub fn with_ifd_name(mut self, name: impl Into<String>) -> Self {
        self.ifd_name = Some(name.into());
        self
    }

    /// Sets the slot index (builder pattern).
    pub fn with_slot_index(mut self, index: u32) -> Self {
        self.slot_index = Some(index);
        self
    }

    /// Sets the slot handle (builder pattern).
    pub fn with_slot_handle(mut self, handle: impl Into<Vec<u8>>) -> Self {
        self.slot_handle = Some(handle.into());
        self
    }

    /// Sets the card application identifier (builder pattern).
    pub fn with_card_application(mut self, app: impl Into<Vec<u8>>) -> Self {
        self.card_application = Some(app.into());
        self
    }

    /// Sets the protocol (builder pattern).
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Wraps the handle into a [`SharedHandle`].
    pub fn shared(self) -> SharedHandle {
        Arc::new(self)
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ifd = self.ifd_name.as_deref().unwrap_or("<unknown ifd>");
        match self.slot_index {
            Some(slot) => write!(f, "{ifd}#{slot}"),
            None => write!(f, "{ifd}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let handle = ConnectionHandle::new()
            .with_ifd_name("REINER SCT cyberJack RFID")
            .with_slot_index(0);
        assert_eq!(handle.to_string(), "REINER SCT cyberJack RFID#0");
        assert_eq!(ConnectionHandle::new().to_string(), "<unknown ifd>");
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let handle = ConnectionHandle::new().with_ifd_name("reader").with_slot_index(1);
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json, serde_json::json!({ "ifd_name": "reader", "slot_index": 1 }));

        let parsed: ConnectionHandle = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, handle);
    }
}
