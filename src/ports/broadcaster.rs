//! Broadcaster port: room membership and fan-out.
//!
//! A room is the set of connections subscribed to one conversation. Each
//! connection is represented by a [`ConnectionHandle`], the sending half of
//! its outbound queue.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::conversation::ChatEvent;
use crate::domain::foundation::{ConnectionId, ConversationId};

/// Result of pushing one event to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the connection's writer.
    Queued,
    /// The connection's queue is full; this event was dropped for it.
    Lagging,
    /// The connection is gone.
    Closed,
}

/// Sending half of one connection's outbound event queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<ChatEvent>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ChatEvent>) -> Self {
        Self { id, sender }
    }

    /// Creates a handle and the receiver its writer drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ChatEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(ConnectionId::new(), tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues `event` without waiting.
    pub fn deliver(&self, event: ChatEvent) -> Delivery {
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Lagging,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Room membership and best-effort fan-out.
///
/// # Contract
///
/// - `leave` of a connection not in the room is a no-op
/// - within one room, events are delivered in the order `broadcast` is called
/// - a connection found closed during a broadcast is dropped from the room
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn join(&self, room: &ConversationId, connection: ConnectionHandle);

    async fn leave(&self, room: &ConversationId, connection: &ConnectionId);

    /// Sends `event` to every member of `room` except `exclude`.
    ///
    /// Returns the number of connections the event was queued for.
    async fn broadcast(
        &self,
        room: &ConversationId,
        event: ChatEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_reports_lagging_and_closed() {
        let (handle, mut rx) = ConnectionHandle::channel(1);

        assert_eq!(handle.deliver(ChatEvent::message_error("a")), Delivery::Queued);
        assert_eq!(handle.deliver(ChatEvent::message_error("b")), Delivery::Lagging);

        assert_eq!(rx.recv().await, Some(ChatEvent::message_error("a")));
        drop(rx);

        assert!(handle.is_closed());
        assert_eq!(handle.deliver(ChatEvent::message_error("c")), Delivery::Closed);
    }

    #[test]
    fn broadcaster_is_object_safe() {
        fn _accepts_dyn(_b: &dyn Broadcaster) {}
    }
}
