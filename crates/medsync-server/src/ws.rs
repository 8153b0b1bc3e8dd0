//! Websocket listener for real-time scan delivery.
//!
//! Runs on its own port, separate from the REST API. Each accepted
//! connection is registered with the bridge; the hello message arrives
//! through the subscription queue, so this module only shuttles frames.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use medsync_protocol::{ClientCommand, ServerMessage};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::state::AppState;

/// Accepts websocket connections until the listener dies.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, peer, state).await {
                tracing::debug!(%peer, error = %err, "websocket connection ended abnormally");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: AppState,
) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    let mut subscription = state.bridge.register_client().await;
    let client_id = subscription.id;
    tracing::info!(%peer, client_id = %client_id, "websocket client connected");

    loop {
        tokio::select! {
            outbound = subscription.rx.recv() => {
                let Some(message) = outbound else { break };
                let text = serde_json::to_string(&message)?;
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            inbound = source.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&state, client_id, text.as_ref()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Ping/pong are answered by the protocol layer.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(client_id = %client_id, error = %err, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    state.bridge.unregister_client(client_id).await;
    tracing::info!(%peer, client_id = %client_id, "websocket client disconnected");
    Ok(())
}

/// Decodes one client frame and dispatches it. A frame that is not a
/// known command earns the sender an error message, nothing more.
async fn handle_text(state: &AppState, client_id: Uuid, text: &str) {
    match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => state.bridge.handle_command(client_id, command).await,
        Err(err) => {
            tracing::debug!(client_id = %client_id, error = %err, "unparseable client frame");
            state
                .bridge
                .send_to(client_id, ServerMessage::error("Unknown command"))
                .await;
        }
    }
}
