//! Serial scan line parser.
//!
//! The RFID reader firmware writes newline-terminated ASCII lines over
//! USB serial. A scan is reported as:
//!
//! ```text
//! DATA,<label>,<date>,<time>,<uid>
//! ```
//!
//! The firmware also prints free-form boot and status text, so any line
//! not starting with `DATA` is simply not a scan. A `DATA` line with a
//! field count other than four is malformed; the ingestor drops it
//! without terminating the read loop.
//!
//! # Examples
//!
//! ```
//! use medsync_protocol::{LineOutcome, ScanLineParser};
//!
//! match ScanLineParser::parse("DATA,Alice,2024-01-01,10:00,ABC123") {
//!     LineOutcome::Scan(event) => {
//!         assert_eq!(event.label, "Alice");
//!         assert_eq!(event.rfid_uid, "ABC123");
//!     }
//!     _ => unreachable!(),
//! }
//!
//! assert!(matches!(
//!     ScanLineParser::parse("RFID reader ready"),
//!     LineOutcome::Ignored
//! ));
//! assert!(matches!(
//!     ScanLineParser::parse("DATA,Alice,2024-01-01"),
//!     LineOutcome::Malformed
//! ));
//! ```

use medsync_core::ScanEvent;
use medsync_core::constants::{SCAN_FIELD_COUNT, SCAN_FIELD_SEPARATOR, SCAN_LINE_PREFIX};

/// Outcome of parsing one serial line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// A well-formed scan line.
    Scan(ScanEvent),

    /// Line does not carry the scan prefix; not an error.
    Ignored,

    /// Line carries the scan prefix but the wrong field count.
    Malformed,
}

impl LineOutcome {
    pub fn is_scan(&self) -> bool {
        matches!(self, Self::Scan(_))
    }
}

/// Pure parser for the `DATA,…` serial line protocol.
pub struct ScanLineParser;

impl ScanLineParser {
    /// Parse one line of text, already stripped of its trailing newline.
    ///
    /// Fields are treated as opaque strings; no validation is applied
    /// beyond presence. The event's `observed_at` timestamp is taken
    /// here, at parse time.
    pub fn parse(line: &str) -> LineOutcome {
        let line = line.trim();
        if !line.starts_with(SCAN_LINE_PREFIX) {
            return LineOutcome::Ignored;
        }

        // parts[0] is the prefix chunk; exactly four data fields follow.
        let parts: Vec<&str> = line.split(SCAN_FIELD_SEPARATOR).collect();
        if parts.len() != SCAN_FIELD_COUNT + 1 {
            return LineOutcome::Malformed;
        }

        LineOutcome::Scan(ScanEvent::new(parts[1], parts[2], parts[3], parts[4]))
    }

    /// Parse a raw byte line, replacing undecodable bytes.
    ///
    /// One corrupt line must never crash the ingestor, so decoding is
    /// lossy rather than fallible.
    pub fn parse_bytes(raw: &[u8]) -> LineOutcome {
        Self::parse(&String::from_utf8_lossy(raw))
    }
}
