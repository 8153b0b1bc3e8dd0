//! Cache of the most recent scan.

use medsync_core::types::ScanEvent;
use tokio::sync::RwLock;

/// Holds the last scan observed since startup, if any.
///
/// New websocket clients receive this in their hello message so a scan
/// made moments before they connected is not lost to them.
#[derive(Debug, Default)]
pub struct LastScanSlot {
    inner: RwLock<Option<ScanEvent>>,
}

impl LastScanSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached scan.
    pub async fn record(&self, event: ScanEvent) {
        *self.inner.write().await = Some(event);
    }

    /// Returns a copy of the cached scan.
    pub async fn get(&self) -> Option<ScanEvent> {
        self.inner.read().await.clone()
    }
}
