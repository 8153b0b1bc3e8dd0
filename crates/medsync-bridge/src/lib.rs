//! Wiring between the serial reader, persistence, and websocket clients.
//!
//! The [`BridgeController`] owns the serial ingestor, pumps its events
//! through enrichment and persistence, and fans the results out to every
//! connected client via the [`EventBroadcaster`]. The last observed scan
//! is cached in a [`LastScanSlot`] so late-joining clients see it in
//! their hello message.

pub mod broadcaster;
pub mod controller;
pub mod last_scan;

pub use broadcaster::{EventBroadcaster, Subscription};
pub use controller::{BridgeController, BridgeStatus};
pub use last_scan::LastScanSlot;

/// Controller with the opener erased, for code that must not be
/// generic over the transport (the server state, mainly).
pub type DynBridgeController = BridgeController<Box<dyn medsync_serial::SerialOpener>>;
