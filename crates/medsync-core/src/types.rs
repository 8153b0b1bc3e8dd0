use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One parsed, valid reading from the RFID hardware.
///
/// Produced exactly once per valid serial line and immutable after
/// creation. All fields except `observed_at` come from the device and
/// are treated as opaque strings; no field-level validation is applied
/// beyond presence.
///
/// On the wire the event serialises with the camelCase names the web
/// clients expect, with `observed_at` exposed as `timestamp`:
///
/// ```
/// use medsync_core::ScanEvent;
///
/// let event = ScanEvent::new("Alice", "2024-01-01", "10:00", "ABC123");
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["cardUid"], "ABC123");
/// assert_eq!(json["rfidUid"], "ABC123");
/// assert!(json["timestamp"].is_string());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    /// Label field reported by the device (card nickname or firmware default).
    pub label: String,

    /// Date string as reported by the device clock.
    pub date: String,

    /// Time string as reported by the device clock.
    pub time: String,

    /// Card uid. Duplicated as `rfid_uid` for wire compatibility.
    pub card_uid: String,

    /// Same uid under the legacy wire name.
    pub rfid_uid: String,

    /// Server-side timestamp taken when the line was parsed.
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl ScanEvent {
    /// Create a scan event with the current timestamp.
    pub fn new(
        label: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        let uid = uid.into();
        Self {
            label: label.into(),
            date: date.into(),
            time: time.into(),
            card_uid: uid.clone(),
            rfid_uid: uid,
            observed_at: Utc::now(),
        }
    }
}

/// Lifecycle state of the serial connection to the RFID reader.
///
/// Transitions: `Disconnected → Connecting → Connected` on a successful
/// `start()`, then `Connected → Disconnected` on `stop()` or
/// `Connected → Errored` on a transport fault. `Errored` requires an
/// explicit restart; the device may need fresh enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

impl SerialConnectionState {
    /// Whether the reader link is currently open.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for SerialConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role attached to a user account.
///
/// Roles gate prescription workflows: only doctors (and admins) create
/// prescriptions, only pharmacies (and admins) verify them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Doctor,
    Patient,
    Pharmacy,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
            Self::Pharmacy => "pharmacy",
            Self::Admin => "admin",
        }
    }

    /// Roles that may be chosen at self-registration (admin is excluded).
    pub fn is_registerable(&self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Whether this role may create prescriptions.
    pub fn can_prescribe(&self) -> bool {
        matches!(self, Self::Doctor | Self::Admin)
    }

    /// Whether this role may verify (dispense) prescriptions.
    pub fn can_verify(&self) -> bool {
        matches!(self, Self::Pharmacy | Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            "pharmacy" => Ok(Self::Pharmacy),
            "admin" => Ok(Self::Admin),
            other => Err(crate::Error::Config(format!("invalid role: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_event_duplicates_uid() {
        let event = ScanEvent::new("Card 1", "2024-01-01", "10:00", "ABC123");
        assert_eq!(event.card_uid, "ABC123");
        assert_eq!(event.rfid_uid, "ABC123");
    }

    #[test]
    fn test_scan_event_wire_names() {
        let event = ScanEvent::new("a", "b", "c", "d");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["label"], "a");
        assert_eq!(json["cardUid"], "d");
        assert_eq!(json["rfidUid"], "d");
        assert!(json.get("observed_at").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_serial_state_display() {
        assert_eq!(SerialConnectionState::Connected.to_string(), "connected");
        assert_eq!(SerialConnectionState::Errored.to_string(), "errored");
        assert!(SerialConnectionState::Connected.is_connected());
        assert!(!SerialConnectionState::Connecting.is_connected());
    }

    #[test]
    fn test_user_role_parsing() {
        assert_eq!("doctor".parse::<UserRole>().unwrap(), UserRole::Doctor);
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("nurse".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_role_permissions() {
        assert!(UserRole::Doctor.can_prescribe());
        assert!(UserRole::Admin.can_prescribe());
        assert!(!UserRole::Pharmacy.can_prescribe());

        assert!(UserRole::Pharmacy.can_verify());
        assert!(UserRole::Admin.can_verify());
        assert!(!UserRole::Doctor.can_verify());

        assert!(!UserRole::Admin.is_registerable());
        assert!(UserRole::Patient.is_registerable());
    }
}
