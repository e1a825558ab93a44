//! Per-connection event handling, independent of the socket.
//!
//! The [`ConnectionGateway`] turns decoded client events into room joins,
//! session calls, and typing relays. The axum handler owns the socket and
//! feeds text frames in; everything here can be driven directly in tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::session::SessionManager;
use crate::domain::conversation::{ChatEvent, MessageContent};
use crate::domain::foundation::{ConnectionId, ConversationId, ValidationError, VerifiedIdentity};
use crate::ports::{Broadcaster, ConnectionHandle, Delivery};

use super::messages::{ClientEvent, SendMessagePayload, TypingPayload};
use super::rooms::RoomRegistry;

pub const INVALID_FRAME: &str = "Invalid message format";
pub const INVALID_CONVERSATION_ID: &str = "Invalid conversation ID";

/// One authenticated client connection.
#[derive(Debug)]
pub struct ClientConnection {
    identity: VerifiedIdentity,
    handle: ConnectionHandle,
}

impl ClientConnection {
    pub fn id(&self) -> ConnectionId {
        self.handle.id()
    }

    pub fn identity(&self) -> &VerifiedIdentity {
        &self.identity
    }

    fn reply(&self, event: ChatEvent) {
        if self.handle.deliver(event) == Delivery::Lagging {
            tracing::warn!(connection_id = %self.id(), "Outbound queue full, dropping event");
        }
    }

    fn reply_error(&self, error: impl Into<String>) {
        self.reply(ChatEvent::message_error(error));
    }
}

/// Routes client events for every connection.
pub struct ConnectionGateway {
    rooms: Arc<RoomRegistry>,
    sessions: Arc<SessionManager>,
    outbound_buffer: usize,
}

impl ConnectionGateway {
    pub fn new(rooms: Arc<RoomRegistry>, sessions: Arc<SessionManager>, outbound_buffer: usize) -> Self {
        Self {
            rooms,
            sessions,
            outbound_buffer,
        }
    }

    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Registers an authenticated connection and returns its outbound queue.
    pub fn connect(&self, identity: VerifiedIdentity) -> (ClientConnection, mpsc::Receiver<ChatEvent>) {
        let (handle, outbound) = ConnectionHandle::channel(self.outbound_buffer);
        tracing::info!(
            connection_id = %handle.id(),
            user_id = %identity.user_id,
            "Client connected"
        );
        (ClientConnection { identity, handle }, outbound)
    }

    /// Decodes and handles one text frame.
    pub async fn handle_text(&self, connection: &ClientConnection, text: &str) {
        match ClientEvent::parse(text) {
            Ok(event) => self.handle_event(connection, event).await,
            Err(e) => {
                tracing::debug!(connection_id = %connection.id(), error = %e, "Undecodable frame");
                connection.reply_error(INVALID_FRAME);
            }
        }
    }

    pub async fn handle_event(&self, connection: &ClientConnection, event: ClientEvent) {
        tracing::trace!(connection_id = %connection.id(), event = event.name(), "Client event");
        match event {
            ClientEvent::JoinConversation(raw_id) => self.join(connection, &raw_id).await,
            ClientEvent::SendMessage(payload) => self.send_message(connection, payload).await,
            ClientEvent::Typing(payload) => self.typing(connection, payload).await,
        }
    }

    async fn join(&self, connection: &ClientConnection, raw_id: &str) {
        let Some(id) = parse_conversation_id(connection, raw_id) else {
            return;
        };
        self.rooms.join(&id, connection.handle.clone()).await;
        tracing::debug!(
            connection_id = %connection.id(),
            conversation_id = %id,
            "Joined conversation"
        );
    }

    async fn send_message(&self, connection: &ClientConnection, payload: SendMessagePayload) {
        let Some(id) = parse_conversation_id(connection, &payload.conversation_id) else {
            return;
        };

        if let Some(claimed) = payload.user_id.as_deref() {
            if claimed != connection.identity.user_id.as_str() {
                tracing::debug!(
                    connection_id = %connection.id(),
                    user_id = %connection.identity.user_id,
                    claimed_user_id = claimed,
                    "Ignoring client-asserted user id"
                );
            }
        }

        let content = match MessageContent::with_limit(
            payload.message,
            self.sessions.config().max_message_chars,
        ) {
            Ok(content) => content,
            Err(e) => {
                connection.reply_error(validation_message(&e));
                return;
            }
        };

        if let Err(e) = self.sessions.receive(id, content).await {
            tracing::debug!(
                connection_id = %connection.id(),
                conversation_id = %id,
                code = %e.code(),
                error = %e,
                "Message not accepted"
            );
            connection.reply_error(e.client_message());
        }
    }

    async fn typing(&self, connection: &ClientConnection, payload: TypingPayload) {
        let Some(id) = parse_conversation_id(connection, &payload.conversation_id) else {
            return;
        };
        let event = ChatEvent::user_typing(connection.identity.user_id.clone(), payload.is_typing);
        self.rooms.broadcast(&id, event, Some(&connection.id())).await;
    }

    /// Removes the connection from every room. Pending replies are unaffected.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let left = self.rooms.leave_all(connection_id).await;
        tracing::info!(
            connection_id = %connection_id,
            rooms = left.len(),
            "Client disconnected"
        );
    }
}

fn parse_conversation_id(connection: &ClientConnection, raw: &str) -> Option<ConversationId> {
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            connection.reply_error(INVALID_CONVERSATION_ID);
            None
        }
    }
}

fn validation_message(error: &ValidationError) -> String {
    match error {
        ValidationError::EmptyField { .. } => "Message cannot be empty".to_string(),
        ValidationError::TooLong { max, .. } => {
            format!("Message exceeds {} characters", max)
        }
        ValidationError::InvalidFormat { .. } => INVALID_FRAME.to_string(),
    }
}
