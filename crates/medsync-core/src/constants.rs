//! Shared constants for the MedSync RFID bridge.
//!
//! This module centralises the protocol- and configuration-level
//! constants used across the workspace.
//!
//! # Serial line protocol
//!
//! The Arduino reader emits newline-terminated ASCII lines. A scan line
//! has the fixed form:
//!
//! ```text
//! DATA,<label>,<date>,<time>,<uid>
//! ```
//!
//! Any line not starting with `DATA` is ignored (the firmware also
//! prints free-form status text); a `DATA` line with a different field
//! count is malformed and dropped.
//!
//! # Usage
//!
//! ```
//! use medsync_core::constants::*;
//!
//! assert_eq!(SCAN_LINE_PREFIX, "DATA");
//! assert_eq!(SCAN_FIELD_COUNT, 4);
//! ```

/// Prefix identifying a scan line in the serial stream.
pub const SCAN_LINE_PREFIX: &str = "DATA";

/// Field separator within a scan line.
pub const SCAN_FIELD_SEPARATOR: char = ',';

/// Number of data fields after the `DATA` prefix (label, date, time, uid).
pub const SCAN_FIELD_COUNT: usize = 4;

/// Default serial baud rate for the RFID reader.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Bounded poll interval for the serial read loop, in milliseconds.
///
/// The read loop observes a stop request within one interval, so this
/// also bounds `stop()` latency.
pub const SERIAL_POLL_INTERVAL_MS: u64 = 100;

/// Size of an auth token in random bytes (256 bits before hex encoding).
pub const TOKEN_BYTES: usize = 32;

/// Default auth token validity window, in hours.
pub const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 24;

/// Default websocket listener port.
pub const DEFAULT_WS_PORT: u16 = 8000;

/// Default HTTP API port.
pub const DEFAULT_HTTP_PORT: u16 = 8001;

/// Default SQLite database path.
pub const DEFAULT_DATABASE_PATH: &str = "medsync.db";
