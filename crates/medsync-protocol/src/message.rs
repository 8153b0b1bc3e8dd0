//! Real-time JSON message envelope.
//!
//! Every message exchanged with a websocket client is a JSON object
//! discriminated by a `type` field. Server-to-client messages are
//! [`ServerMessage`]; the small command set a client may send is
//! [`ClientCommand`]. Field names are camelCase on the wire
//! (`serialConnected`, `lastScan`, `cardUid`) to match the existing web
//! clients.
//!
//! # Examples
//!
//! ```
//! use medsync_protocol::{ClientCommand, ServerMessage};
//!
//! let msg = ServerMessage::error("boom");
//! let json = serde_json::to_value(&msg).unwrap();
//! assert_eq!(json["type"], "error");
//! assert_eq!(json["message"], "boom");
//!
//! let cmd: ClientCommand = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
//! assert_eq!(cmd, ClientCommand::Ping);
//! ```

use medsync_core::ScanEvent;
use serde::{Deserialize, Serialize};

/// Messages broadcast or sent to real-time clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when a client joins, so a late joiner is not blind to
    /// the current serial state and the most recent scan.
    #[serde(rename_all = "camelCase")]
    Connection {
        status: String,
        serial_connected: bool,
        last_scan: Option<ScanEvent>,
    },

    /// A scan event fanned out to every connected client.
    RfidScan(ScanEvent),

    /// Serial link state change; `port` is present when connected.
    SerialStatus {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        port: Option<String>,
    },

    /// Bridge-level error surfaced to all clients.
    Error { message: String },

    /// Response to an explicit `get_status` query.
    #[serde(rename_all = "camelCase")]
    Status {
        serial_connected: bool,
        is_reading: bool,
        last_scan: Option<ScanEvent>,
    },

    /// Liveness reply to a client `ping`.
    Pong,

    /// A new card was registered through the REST API.
    #[serde(rename_all = "camelCase")]
    CardRegistered {
        uid: String,
        label: String,
        patient_id: Option<String>,
    },
}

impl ServerMessage {
    /// Connection-establishment message for a newly joined client.
    pub fn connection(serial_connected: bool, last_scan: Option<ScanEvent>) -> Self {
        Self::Connection {
            status: "connected".to_string(),
            serial_connected,
            last_scan,
        }
    }

    /// Serial status message for an open link on `port`.
    pub fn serial_connected(port: impl Into<String>) -> Self {
        Self::SerialStatus {
            status: "connected".to_string(),
            port: Some(port.into()),
        }
    }

    /// Serial status message for a closed link.
    pub fn serial_disconnected() -> Self {
        Self::SerialStatus {
            status: "disconnected".to_string(),
            port: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Control commands accepted from a real-time client.
///
/// Anything else (including invalid JSON) is answered with a
/// [`ServerMessage::Error`] and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    StartSerial,
    StopSerial,
    GetStatus,
    Ping,
}
