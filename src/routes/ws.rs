//! WebSocket handler — stock delta relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a session ID, registers an outbound queue with the
//! stock manager, and enters a `select!` loop:
//! - Incoming text → parse delta → apply to store (fan-out happens there)
//! - Levels queued by peers' deltas → forward to client
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → `connect` → send one level per stored item
//! 2. Client sends deltas → applied, peers notified, sender not echoed
//! 3. Malformed text → logged and dropped, session stays open
//! 4. Close, stream end, failed send, or queue dropped by the manager → `disconnect`

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::message::{self, ErrorCode, ParseError, StockLevel};
use crate::services::stock::SessionId;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();

    // Per-session queue for levels produced by peers' deltas.
    let (session_tx, mut session_rx) = mpsc::channel::<StockLevel>(state.config.client_buffer);

    let snapshot = state.stock.connect(session_id, session_tx).await;
    for level in &snapshot {
        if send_level(&mut socket, level).await.is_err() {
            // Client went away between accept and snapshot.
            state.stock.disconnect(session_id).await;
            info!(%session_id, "ws: session closed during snapshot");
            return;
        }
    }

    info!(%session_id, items = snapshot.len(), "ws: session connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        if let Err(e) = process_inbound_text(&state, session_id, text.as_str()).await {
                            warn!(%session_id, code = e.error_code(), error = %e, "ws: invalid stock delta dropped");
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            level = session_rx.recv() => {
                // None: the manager dropped this session (queue full).
                let Some(level) = level else { break };
                if send_level(&mut socket, &level).await.is_err() {
                    break;
                }
            }
        }
    }

    state.stock.disconnect(session_id).await;
    info!(%session_id, "ws: session disconnected");
}

// =============================================================================
// INBOUND
// =============================================================================

/// Parse one inbound text message and apply it to the store.
///
/// Kept apart from the socket loop so tests can drive dispatch directly.
async fn process_inbound_text(state: &AppState, session_id: SessionId, text: &str) -> Result<StockLevel, ParseError> {
    let delta = message::parse_delta(text)?;
    let level = state.stock.apply(session_id, delta).await;
    debug!(%session_id, flower_id = level.flower_id, number = level.number, "ws: recv delta");
    Ok(level)
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_level(socket: &mut WebSocket, level: &StockLevel) -> Result<(), axum::Error> {
    socket.send(Message::Text(level.to_string().into())).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
