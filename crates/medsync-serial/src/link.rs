//! Transport seam between the ingestor and the physical port.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use medsync_core::constants::SERIAL_POLL_INTERVAL_MS;
use medsync_core::{Error, Result};

use crate::discovery;

/// One open serial connection.
///
/// Implementations are driven from a blocking context. `read_chunk`
/// must return `Ok(0)` when no bytes arrived within the poll interval,
/// and `Err` only for unrecoverable transport failures.
pub trait SerialLink: Send {
    /// Name of the underlying port, for status reporting.
    fn port_name(&self) -> &str;

    /// Reads available bytes into `buf`, waiting at most one poll
    /// interval, and returns how many were read.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Opens [`SerialLink`]s and enumerates candidate ports.
pub trait SerialOpener: Send + Sync {
    /// Lists ports that may host the reader, in preference order.
    fn discover(&self) -> Vec<String>;

    /// Opens a connection to `port` at `baud`.
    fn open(&self, port: &str, baud: u32) -> Result<Box<dyn SerialLink>>;
}

impl SerialOpener for Box<dyn SerialOpener> {
    fn discover(&self) -> Vec<String> {
        (**self).discover()
    }

    fn open(&self, port: &str, baud: u32) -> Result<Box<dyn SerialLink>> {
        (**self).open(port, baud)
    }
}

/// Production opener backed by the `serialport` crate.
#[derive(Debug, Default, Clone)]
pub struct UsbSerialOpener;

impl SerialOpener for UsbSerialOpener {
    fn discover(&self) -> Vec<String> {
        discovery::discover_ports()
    }

    fn open(&self, port: &str, baud: u32) -> Result<Box<dyn SerialLink>> {
        let inner = serialport::new(port, baud)
            .timeout(Duration::from_millis(SERIAL_POLL_INTERVAL_MS))
            .open()
            .map_err(|e| Error::ConnectionFailed(format!("{port}: {e}")))?;

        // Drop bytes buffered while no one was reading; a stale scan
        // must not surface as a fresh one.
        if let Err(err) = inner.clear(serialport::ClearBuffer::Input) {
            tracing::warn!(port, error = %err, "could not flush stale serial input");
        }

        Ok(Box::new(UsbSerialLink {
            inner,
            name: port.to_string(),
        }))
    }
}

/// A physical USB serial connection.
struct UsbSerialLink {
    inner: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SerialLink for UsbSerialLink {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            // The port timeout doubles as the poll interval.
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(Error::Transport(format!("{}: {e}", self.name))),
        }
    }
}
