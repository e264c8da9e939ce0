use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// GET /cable -- upgrade to a live-update WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let manager = Arc::clone(&state.ws_manager);
    ws.on_upgrade(move |socket| serve_client(socket, manager))
}

/// Push slide updates to one browser until it leaves or the server closes it.
///
/// Clients never send anything meaningful; inbound frames only tell us the
/// socket is still alive.
async fn serve_client(socket: WebSocket, manager: Arc<WsManager>) {
    let client_id = Uuid::new_v4().to_string();
    let mut pushed = manager.add(client_id.clone()).await;
    let (mut sink, mut inbound) = socket.split();
    tracing::info!(client_id = %client_id, "Live-update client connected");

    loop {
        tokio::select! {
            frame = pushed.recv() => {
                // `None` means the manager forgot this client.
                let Some(frame) = frame else { break };
                let last = matches!(frame, Message::Close(_));
                if let Err(e) = sink.send(frame).await {
                    tracing::debug!(client_id = %client_id, error = %e, "Push to client failed");
                    break;
                }
                if last {
                    break;
                }
            }
            received = inbound.next() => match received {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client_id = %client_id, error = %e, "Client socket error");
                    break;
                }
            },
        }
    }

    manager.remove(&client_id).await;
    tracing::info!(client_id = %client_id, "Live-update client disconnected");
}
