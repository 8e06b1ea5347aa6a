//! Viewer sessions over WebSocket
//!
//! A viewer gets the full log on connect, then every broadcast push, and
//! can ask for the log again or for a filtered view at any time. Replies to
//! its own requests go to it alone.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use rollcall_core::{LogSnapshot, SearchQuery, search};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::protocol::{ClientMessage, ProtocolError, ServerMessage};
use crate::state::AppState;

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| serve_viewer(socket, state))
}

/// Current full log as an `update_log` message
pub async fn current_log(state: &AppState) -> ServerMessage {
    ServerMessage::UpdateLog(Arc::new(state.store.snapshot().await))
}

/// Reply, if any, to one viewer frame
///
/// A `search_log` frame whose payload cannot be read is answered with an
/// empty result instead of an error.
pub async fn answer(
    state: &AppState,
    message: Result<ClientMessage, ProtocolError>,
) -> Option<ServerMessage> {
    match message {
        Ok(ClientMessage::RequestInitialLog) => Some(current_log(state).await),
        Ok(ClientMessage::SearchLog { query }) => {
            let log = state.store.list().await;
            let results = search(&log, &SearchQuery::new(&query));
            debug!(query = %query, matches = results.total_users(), "Search answered");
            Some(ServerMessage::SearchResults(results))
        }
        Err(e @ ProtocolError::InvalidPayload {
            event: "search_log",
            ..
        }) => {
            warn!(error = %e, "Search failed, returning empty result");
            Some(ServerMessage::SearchResults(LogSnapshot::empty()))
        }
        Err(e) => {
            debug!(error = %e, "Ignoring viewer frame");
            None
        }
    }
}

async fn serve_viewer(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the log so no mutation falls in between
    let mut pushes = state.hub.subscribe();

    if send(&mut socket, &current_log(&state).await).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let parsed = ClientMessage::parse(text.as_str());
                    if let Some(reply) = answer(&state, parsed).await
                        && send(&mut socket, &reply).await.is_err()
                    {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "Viewer socket error");
                    break;
                }
            },
            pushed = pushes.recv() => match pushed {
                Ok(message) => {
                    if send(&mut socket, &message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Viewer lagged, resending full log");
                    if send(&mut socket, &current_log(&state).await).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}

async fn send(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = match message.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!(event = message.event_name(), error = %e, "Failed to encode push");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await.inspect_err(|e| {
        debug!(error = %e, "Viewer went away");
    })
}
