//! Scriptable serial transport for tests and hardware-free development.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use medsync_core::{Error, Result};

use crate::link::{SerialLink, SerialOpener};

/// What the scripted reader produces next.
#[derive(Debug, Clone)]
enum MockChunk {
    Bytes(Vec<u8>),
    Error(String),
}

type Script = Arc<Mutex<VecDeque<MockChunk>>>;

fn lock_script(script: &Script) -> std::sync::MutexGuard<'_, VecDeque<MockChunk>> {
    script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opener that hands out [`SerialLink`]s reading from a shared script.
///
/// Every link opened from the same opener consumes the same queue, so a
/// reconnect after a scripted error picks up where the fault left off.
///
/// # Examples
///
/// ```
/// use medsync_serial::{MockSerialOpener, SerialLink, SerialOpener};
///
/// let (opener, handle) = MockSerialOpener::new(vec!["/dev/ttyACM0".into()]);
/// handle.push_line("DATA,Ward A,2026-08-30,10:00:00,04AB11");
///
/// let mut link = opener.open("/dev/ttyACM0", 9600).unwrap();
/// let mut buf = [0u8; 64];
/// let n = link.read_chunk(&mut buf).unwrap();
/// assert!(buf[..n].starts_with(b"DATA,"));
/// ```
#[derive(Debug, Clone)]
pub struct MockSerialOpener {
    ports: Vec<String>,
    script: Script,
}

/// Control handle for pushing scripted data at a [`MockSerialOpener`].
#[derive(Debug, Clone)]
pub struct MockSerialHandle {
    script: Script,
}

impl MockSerialOpener {
    /// Creates an opener whose discovery returns `ports`.
    pub fn new(ports: Vec<String>) -> (Self, MockSerialHandle) {
        let script: Script = Arc::new(Mutex::new(VecDeque::new()));
        let handle = MockSerialHandle {
            script: Arc::clone(&script),
        };
        (Self { ports, script }, handle)
    }
}

impl MockSerialHandle {
    /// Queues a line, appending the newline terminator.
    pub fn push_line(&self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');
        lock_script(&self.script).push_back(MockChunk::Bytes(bytes));
    }

    /// Queues raw bytes exactly as given.
    pub fn push_bytes(&self, bytes: &[u8]) {
        lock_script(&self.script).push_back(MockChunk::Bytes(bytes.to_vec()));
    }

    /// Queues a transport failure.
    pub fn push_error(&self, message: &str) {
        lock_script(&self.script).push_back(MockChunk::Error(message.to_string()));
    }
}

impl SerialOpener for MockSerialOpener {
    fn discover(&self) -> Vec<String> {
        self.ports.clone()
    }

    fn open(&self, port: &str, _baud: u32) -> Result<Box<dyn SerialLink>> {
        Ok(Box::new(MockSerialLink {
            name: port.to_string(),
            script: Arc::clone(&self.script),
        }))
    }
}

struct MockSerialLink {
    name: String,
    script: Script,
}

impl SerialLink for MockSerialLink {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let next = lock_script(&self.script).pop_front();
        match next {
            Some(MockChunk::Bytes(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    lock_script(&self.script).push_front(MockChunk::Bytes(bytes[n..].to_vec()));
                }
                Ok(n)
            }
            Some(MockChunk::Error(message)) => Err(Error::Transport(message)),
            None => {
                // Simulate the poll timeout without spinning hot.
                thread::sleep(Duration::from_millis(5));
                Ok(0)
            }
        }
    }
}
