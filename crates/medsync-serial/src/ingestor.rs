//! The serial read loop and its lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use medsync_core::constants::DEFAULT_BAUD_RATE;
use medsync_core::types::{ScanEvent, SerialConnectionState};
use medsync_core::{Error, Result};
use medsync_protocol::{LineOutcome, ScanLineParser};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::link::{SerialLink, SerialOpener};

/// Hard cap on bytes buffered while waiting for a newline. A reader
/// that never terminates lines must not grow memory without bound.
const MAX_PENDING_BYTES: usize = 4096;

/// What the read loop reports upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum SerialEvent {
    /// A well-formed scan line.
    Scan(ScanEvent),

    /// The port opened and the loop is running.
    Connected { port: String },

    /// The loop stopped after an explicit stop request.
    Disconnected,

    /// The loop died on a transport error; restart is manual.
    Failed { message: String },
}

/// Owns the serial connection lifecycle.
///
/// `start` opens a port (auto-discovered unless one is given) and moves
/// the blocking read loop onto the blocking thread pool. Bytes are
/// assembled into lines, parsed, and emitted as [`SerialEvent`]s on the
/// channel supplied at construction. A transport error kills the loop
/// and parks the ingestor in [`SerialConnectionState::Errored`] until
/// someone calls `start` again.
pub struct SerialIngestor<O> {
    opener: Arc<O>,
    baud: u32,
    events: mpsc::UnboundedSender<SerialEvent>,
    state_tx: watch::Sender<SerialConnectionState>,
    stop: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    port: Option<String>,
}

impl<O: SerialOpener + 'static> SerialIngestor<O> {
    /// Creates an idle ingestor at the default baud rate.
    pub fn new(opener: O, events: mpsc::UnboundedSender<SerialEvent>) -> Self {
        Self::with_baud(opener, events, DEFAULT_BAUD_RATE)
    }

    /// Creates an idle ingestor with an explicit baud rate.
    pub fn with_baud(opener: O, events: mpsc::UnboundedSender<SerialEvent>, baud: u32) -> Self {
        let (state_tx, _) = watch::channel(SerialConnectionState::Disconnected);
        Self {
            opener: Arc::new(opener),
            baud,
            events,
            state_tx,
            stop: Arc::new(AtomicBool::new(false)),
            task: None,
            port: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> SerialConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribes to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<SerialConnectionState> {
        self.state_tx.subscribe()
    }

    /// Whether the read loop is currently running.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// The port of the current (or most recent) connection.
    pub fn current_port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Opens `port` (or the first discovered candidate) and starts the
    /// read loop. Returns the port actually opened.
    ///
    /// Calling `start` while already connected is a no-op that returns
    /// the active port.
    ///
    /// # Errors
    ///
    /// [`Error::DeviceNotFound`] when no port was given and discovery
    /// found none; [`Error::ConnectionFailed`] when the port would not
    /// open. Both leave the ingestor restartable.
    pub async fn start(&mut self, port: Option<String>) -> Result<String> {
        if self.is_connected() {
            if let Some(active) = &self.port {
                tracing::debug!(port = %active, "serial reader already running");
                return Ok(active.clone());
            }
        }

        self.state_tx.send_replace(SerialConnectionState::Connecting);

        let port = match port.or_else(|| self.opener.discover().into_iter().next()) {
            Some(port) => port,
            None => {
                self.state_tx
                    .send_replace(SerialConnectionState::Disconnected);
                return Err(Error::DeviceNotFound(
                    "no candidate serial ports".to_string(),
                ));
            }
        };

        let link = match self.opener.open(&port, self.baud) {
            Ok(link) => link,
            Err(err) => {
                self.state_tx.send_replace(SerialConnectionState::Errored);
                return Err(err);
            }
        };

        self.stop.store(false, Ordering::Release);
        self.state_tx.send_replace(SerialConnectionState::Connected);
        self.port = Some(port.clone());

        let _ = self.events.send(SerialEvent::Connected { port: port.clone() });
        tracing::info!(port = %port, baud = self.baud, "serial reader connected");

        let events = self.events.clone();
        let state_tx = self.state_tx.clone();
        let stop = Arc::clone(&self.stop);
        self.task = Some(tokio::task::spawn_blocking(move || {
            read_loop(link, events, state_tx, stop);
        }));

        Ok(port)
    }

    /// Stops the read loop and waits for it to exit.
    ///
    /// Idempotent: stopping an idle or already-failed ingestor does
    /// nothing beyond clearing the finished task.
    pub async fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);

        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "serial read loop panicked");
            }
        }
    }
}

/// Blocking read loop. Runs on the blocking pool until stopped or the
/// transport fails.
fn read_loop(
    mut link: Box<dyn SerialLink>,
    events: mpsc::UnboundedSender<SerialEvent>,
    state_tx: watch::Sender<SerialConnectionState>,
    stop: Arc<AtomicBool>,
) {
    let port = link.port_name().to_string();
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 256];
    let mut malformed: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        let n = match link.read_chunk(&mut chunk) {
            Ok(0) => continue,
            Ok(n) => n,
            Err(err) => {
                tracing::error!(port = %port, error = %err, "serial transport failed");
                state_tx.send_replace(SerialConnectionState::Errored);
                let _ = events.send(SerialEvent::Failed {
                    message: err.to_string(),
                });
                return;
            }
        };

        pending.extend_from_slice(&chunk[..n]);

        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            match ScanLineParser::parse_bytes(&line) {
                LineOutcome::Scan(event) => {
                    // Receiver gone means the bridge is shutting down.
                    if events.send(SerialEvent::Scan(event)).is_err() {
                        return;
                    }
                }
                LineOutcome::Malformed => {
                    malformed += 1;
                    tracing::warn!(
                        port = %port,
                        total = malformed,
                        line = %String::from_utf8_lossy(&line).trim(),
                        "dropping malformed scan line"
                    );
                }
                LineOutcome::Ignored => {}
            }
        }

        if pending.len() > MAX_PENDING_BYTES {
            tracing::warn!(port = %port, dropped = pending.len(), "discarding unterminated serial data");
            pending.clear();
        }
    }

    state_tx.send_replace(SerialConnectionState::Disconnected);
    let _ = events.send(SerialEvent::Disconnected);
    tracing::info!(port = %port, "serial reader disconnected");
}
