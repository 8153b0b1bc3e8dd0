//! Wire-level types for the MedSync RFID bridge.
//!
//! Two protocols live here:
//!
//! - the line-oriented serial protocol spoken by the Arduino reader,
//!   parsed by [`ScanLineParser`];
//! - the JSON message envelope exchanged with real-time web clients,
//!   [`ServerMessage`] and [`ClientCommand`].
//!
//! Everything in this crate is pure data: no I/O, no state, fully
//! unit-testable without a device or a socket.

pub mod message;
pub mod scan;

pub use message::{ClientCommand, ServerMessage};
pub use scan::{LineOutcome, ScanLineParser};
