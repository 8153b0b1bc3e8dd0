//! The bridge controller: serial lifecycle plus the event pump.

use std::sync::Arc;

use chrono::Utc;
use medsync_core::types::{ScanEvent, SerialConnectionState};
use medsync_core::{Error, Result};
use medsync_protocol::{ClientCommand, ServerMessage};
use medsync_serial::{SerialEvent, SerialIngestor, SerialOpener};
use medsync_storage::Database;
use medsync_storage::repositories::{
    CardRepository, ScanLogRepository, SqliteCardRepository, SqliteScanLogRepository,
};
use tokio::sync::{Mutex, mpsc, watch};
use uuid::Uuid;

use crate::broadcaster::{EventBroadcaster, Subscription};
use crate::last_scan::LastScanSlot;

/// Message shown to clients when serial start finds no reader.
const NO_DEVICE_MESSAGE: &str = "No serial device found. Please connect your RFID reader.";

/// Snapshot of the bridge for the health endpoint.
#[derive(Debug, Clone)]
pub struct BridgeStatus {
    pub serial_state: SerialConnectionState,
    pub serial_port: Option<String>,
    pub client_count: usize,
    pub last_scan: Option<ScanEvent>,
}

/// Owns the ingestor and fans its events out to clients.
///
/// Construction spawns the event pump, a task that consumes serial
/// events for the life of the process: scans are enriched with the
/// registered card label, persisted, cached as the last scan, and then
/// broadcast; connection changes become `serial_status` messages.
pub struct BridgeController<O> {
    broadcaster: Arc<EventBroadcaster>,
    last_scan: Arc<LastScanSlot>,
    ingestor: Mutex<SerialIngestor<O>>,
    serial_state: watch::Receiver<SerialConnectionState>,
}

impl<O: SerialOpener + 'static> BridgeController<O> {
    /// Builds the controller and starts the event pump.
    pub fn new(db: &Database, opener: O) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let ingestor = SerialIngestor::new(opener, events_tx);
        let serial_state = ingestor.watch_state();

        let broadcaster = Arc::new(EventBroadcaster::new());
        let last_scan = Arc::new(LastScanSlot::new());

        tokio::spawn(pump_events(
            events_rx,
            Arc::clone(&broadcaster),
            Arc::clone(&last_scan),
            SqliteCardRepository::new(db.pool().clone()),
            SqliteScanLogRepository::new(db.pool().clone()),
        ));

        Arc::new(Self {
            broadcaster,
            last_scan,
            ingestor: Mutex::new(ingestor),
            serial_state,
        })
    }

    /// Starts the serial reader; returns the port opened.
    ///
    /// When no device is present the failure is also broadcast, so
    /// watching clients see why nothing is scanning.
    pub async fn start_serial(&self, port: Option<String>) -> Result<String> {
        let mut ingestor = self.ingestor.lock().await;
        match ingestor.start(port).await {
            Ok(port) => Ok(port),
            Err(err @ Error::DeviceNotFound(_)) => {
                self.broadcaster
                    .broadcast(ServerMessage::error(NO_DEVICE_MESSAGE))
                    .await;
                Err(err)
            }
            Err(err) => {
                self.broadcaster
                    .broadcast(ServerMessage::error(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Stops the serial reader. Idempotent.
    pub async fn stop_serial(&self) {
        self.ingestor.lock().await.stop().await;
    }

    /// Registers a websocket client and hands back its subscription.
    ///
    /// The hello message carries the current serial state and the last
    /// scan so the client can render immediately.
    pub async fn register_client(&self) -> Subscription {
        let hello = ServerMessage::connection(
            self.serial_connected(),
            self.last_scan.get().await,
        );
        self.broadcaster.register(hello).await
    }

    /// Drops a websocket client.
    pub async fn unregister_client(&self, id: Uuid) {
        self.broadcaster.unregister(id).await;
    }

    /// Handles one decoded client command.
    pub async fn handle_command(&self, client: Uuid, command: ClientCommand) {
        match command {
            ClientCommand::StartSerial => {
                // Failure already broadcast; nothing more to tell.
                let _ = self.start_serial(None).await;
            }
            ClientCommand::StopSerial => self.stop_serial().await,
            ClientCommand::GetStatus => {
                let connected = self.serial_connected();
                let message = ServerMessage::Status {
                    serial_connected: connected,
                    is_reading: connected,
                    last_scan: self.last_scan.get().await,
                };
                self.broadcaster.send_to(client, message).await;
            }
            ClientCommand::Ping => {
                self.broadcaster.send_to(client, ServerMessage::Pong).await;
            }
        }
    }

    /// Broadcasts an out-of-band message, e.g. a card registered over
    /// the REST interface.
    pub async fn broadcast(&self, message: ServerMessage) -> usize {
        self.broadcaster.broadcast(message).await
    }

    /// Queues a message for one client only.
    pub async fn send_to(&self, client: Uuid, message: ServerMessage) -> bool {
        self.broadcaster.send_to(client, message).await
    }

    /// Whether the serial read loop is running.
    pub fn serial_connected(&self) -> bool {
        self.serial_state.borrow().is_connected()
    }

    /// Snapshot for health reporting.
    pub async fn status(&self) -> BridgeStatus {
        let ingestor = self.ingestor.lock().await;
        BridgeStatus {
            serial_state: ingestor.state(),
            serial_port: ingestor.current_port().map(str::to_string),
            client_count: self.broadcaster.client_count().await,
            last_scan: self.last_scan.get().await,
        }
    }
}

/// Consumes serial events until the ingestor side closes.
async fn pump_events(
    mut events: mpsc::UnboundedReceiver<SerialEvent>,
    broadcaster: Arc<EventBroadcaster>,
    last_scan: Arc<LastScanSlot>,
    cards: SqliteCardRepository,
    scan_logs: SqliteScanLogRepository,
) {
    while let Some(event) = events.recv().await {
        match event {
            SerialEvent::Scan(scan) => {
                let scan = enrich_and_persist(scan, &cards, &scan_logs).await;
                last_scan.record(scan.clone()).await;
                broadcaster.broadcast(ServerMessage::RfidScan(scan)).await;
            }
            SerialEvent::Connected { port } => {
                broadcaster
                    .broadcast(ServerMessage::serial_connected(port))
                    .await;
            }
            SerialEvent::Disconnected => {
                broadcaster
                    .broadcast(ServerMessage::serial_disconnected())
                    .await;
            }
            SerialEvent::Failed { message } => {
                broadcaster
                    .broadcast(ServerMessage::error(format!("Serial error: {message}")))
                    .await;
            }
        }
    }
    tracing::debug!("serial event pump finished");
}

/// Overrides the reported label with the registered card label when the
/// card is known, and records the scan. Persistence is best effort: a
/// storage failure is logged and the broadcast still happens.
async fn enrich_and_persist(
    mut scan: ScanEvent,
    cards: &SqliteCardRepository,
    scan_logs: &SqliteScanLogRepository,
) -> ScanEvent {
    match cards.find_by_uid(&scan.card_uid).await {
        Ok(Some(card)) if card.is_active && !card.label.is_empty() => {
            scan.label = card.label;
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(uid = %scan.card_uid, error = %err, "card lookup failed");
        }
    }

    let now = Utc::now();
    if let Err(err) = scan_logs.insert(&scan.card_uid, now).await {
        tracing::warn!(uid = %scan.card_uid, error = %err, "scan log write failed");
    }
    if let Err(err) = cards.touch_last_scanned(&scan.card_uid, now).await {
        tracing::warn!(uid = %scan.card_uid, error = %err, "last_scanned update failed");
    }

    scan
}
