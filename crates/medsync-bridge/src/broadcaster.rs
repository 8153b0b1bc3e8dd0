//! Fan-out of server messages to websocket clients.

use std::collections::HashMap;

use medsync_protocol::ServerMessage;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// One registered client: its identity and the receiving end of its
/// private message queue.
#[derive(Debug)]
pub struct Subscription {
    pub id: Uuid,
    pub rx: mpsc::UnboundedReceiver<ServerMessage>,
}

/// Delivers messages to every connected client.
///
/// Each client gets an unbounded queue, so ordering is FIFO per client
/// and one stalled client never delays the others. A client whose queue
/// is gone (receiver dropped) is pruned during the next broadcast.
#[derive(Debug, Default)]
pub struct EventBroadcaster {
    clients: Mutex<HashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new client. The `hello` message is queued first, so
    /// it is guaranteed to precede any broadcast the client sees.
    pub async fn register(&self, hello: ServerMessage) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        // Cannot fail: rx is still alive in this scope.
        let _ = tx.send(hello);

        self.clients.lock().await.insert(id, tx);
        tracing::debug!(client_id = %id, "websocket client registered");

        Subscription { id, rx }
    }

    /// Removes a client. Unknown ids are ignored.
    pub async fn unregister(&self, id: Uuid) {
        if self.clients.lock().await.remove(&id).is_some() {
            tracing::debug!(client_id = %id, "websocket client unregistered");
        }
    }

    /// Queues `message` for every client; returns how many received it.
    ///
    /// Clients whose receiver has been dropped are removed here rather
    /// than failing the broadcast.
    pub async fn broadcast(&self, message: ServerMessage) -> usize {
        let mut clients = self.clients.lock().await;
        let mut dead: Vec<Uuid> = Vec::new();

        for (id, tx) in clients.iter() {
            if tx.send(message.clone()).is_err() {
                dead.push(*id);
            }
        }

        for id in &dead {
            clients.remove(id);
            tracing::debug!(client_id = %id, "pruned disconnected client");
        }

        clients.len()
    }

    /// Queues `message` for a single client; false if it is gone.
    pub async fn send_to(&self, id: Uuid, message: ServerMessage) -> bool {
        let mut clients = self.clients.lock().await;
        match clients.get(&id) {
            Some(tx) if tx.send(message).is_ok() => true,
            Some(_) => {
                clients.remove(&id);
                false
            }
            None => false,
        }
    }

    /// Number of currently registered clients.
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}
