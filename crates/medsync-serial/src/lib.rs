//! Serial transport for the MedSync RFID reader.
//!
//! An Arduino-class reader streams newline-terminated scan lines over a
//! USB serial port at 9600 baud. This crate discovers candidate ports,
//! wraps the raw port behind the [`SerialLink`] trait so tests can run
//! without hardware, and drives the [`SerialIngestor`] read loop that
//! turns bytes into [`SerialEvent`]s.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> medsync_core::Result<()> {
//! use medsync_serial::{SerialIngestor, UsbSerialOpener};
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let mut ingestor = SerialIngestor::new(UsbSerialOpener::default(), tx);
//!
//! let port = ingestor.start(None).await?;
//! println!("reading from {port}");
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod ingestor;
pub mod link;
pub mod mock;

pub use discovery::discover_ports;
pub use ingestor::{SerialEvent, SerialIngestor};
pub use link::{SerialLink, SerialOpener, UsbSerialOpener};
pub use mock::{MockSerialHandle, MockSerialOpener};
