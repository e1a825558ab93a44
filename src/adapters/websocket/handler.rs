//! WebSocket upgrade handler for chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Authenticate the token (`?token=` or `Authorization: Bearer`)
//! 2. Upgrade to WebSocket
//! 3. Forward outbound events and feed inbound frames to the gateway
//! 4. Leave every room on disconnect

use std::sync::Arc;

use axum::{
    extract::{
        rejection::QueryRejection,
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::domain::conversation::ChatEvent;
use crate::domain::foundation::VerifiedIdentity;
use crate::ports::IdentityVerifier;

use super::gateway::{ClientConnection, ConnectionGateway};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub gateway: Arc<ConnectionGateway>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl WebSocketState {
    pub fn new(gateway: Arc<ConnectionGateway>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { gateway, verifier }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?token=<jwt>`
///
/// Authentication happens before the upgrade; a bad or missing token gets a
/// plain `401` and no socket.
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    params: Result<Query<ConnectParams>, QueryRejection>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let query_token = params.ok().and_then(|Query(p)| p.token);
    let Some(token) = query_token.or_else(|| bearer_token(&headers)) else {
        return unauthorized("Missing token");
    };

    let identity = match state.verifier.verify(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, "WebSocket authentication failed");
            return unauthorized(&e.to_string());
        }
    };

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, identity, state.gateway)),
        Err(rejection) => rejection.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": message, "code": "UNAUTHORIZED" })),
    )
        .into_response()
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection. Either side closing ends both
/// tasks; reply jobs already scheduled keep running.
async fn handle_socket(socket: WebSocket, identity: VerifiedIdentity, gateway: Arc<ConnectionGateway>) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, outbound) = gateway.connect(identity);
    let connection_id = connection.id();

    let mut send_task = tokio::spawn(async move {
        forward_outbound(&mut sender, outbound).await;
    });

    let recv_gateway = Arc::clone(&gateway);
    let mut recv_task = tokio::spawn(async move {
        read_inbound(&recv_gateway, &connection, &mut receiver).await;
    });

    // Aborting mid-frame is safe: an accepted message finishes on its own task.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    gateway.disconnect(&connection_id).await;
}

async fn forward_outbound(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<ChatEvent>,
) {
    while let Some(event) = outbound.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(event = event.name(), error = %e, "Failed to encode event");
                continue;
            }
        };
        if let Err(e) = sender.send(Message::Text(json)).await {
            tracing::debug!("Send error, closing connection: {}", e);
            break;
        }
    }
}

async fn read_inbound(
    gateway: &ConnectionGateway,
    connection: &ClientConnection,
    receiver: &mut futures::stream::SplitStream<WebSocket>,
) {
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => gateway.handle_text(connection, &text).await,
            Ok(Message::Binary(_)) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    "Received unsupported binary message"
                );
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %connection.id(), "Client sent close frame");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection.id(), "Receive error: {}", e);
                break;
            }
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn non_bearer_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(bearer_token(&headers).is_none());
    }
}
