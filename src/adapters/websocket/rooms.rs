//! Room registry for conversation-scoped fan-out.
//!
//! Rooms are keyed by conversation ID. A connection may sit in several rooms
//! at once; the registry tracks both directions so a disconnect can leave
//! every room in one call.
//!
//! # Architecture
//!
//! ```text
//! Room: conv-123       Room: conv-456
//! ├── conn-a           ├── conn-a
//! ├── conn-b           └── conn-d
//! └── conn-c
//! ```
//!
//! # Lifecycle
//!
//! One registry is created at process start and shared behind an `Arc`.
//! Dropping it drops every handle, which closes all connection writers.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::conversation::ChatEvent;
use crate::domain::foundation::{ConnectionId, ConversationId};
use crate::ports::{Broadcaster, ConnectionHandle, Delivery};

type Room = HashMap<ConnectionId, ConnectionHandle>;

/// Maps conversation IDs to their live connections.
///
/// # Thread Safety
///
/// Uses `RwLock` for both maps since broadcasts (reads) vastly outnumber
/// joins/leaves (writes). Locks are always taken `rooms` before
/// `memberships`.
pub struct RoomRegistry {
    /// conversation_id → members of that room.
    rooms: RwLock<HashMap<ConversationId, Room>>,

    /// connection_id → rooms it has joined, for O(rooms) cleanup on disconnect.
    memberships: RwLock<HashMap<ConnectionId, HashSet<ConversationId>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            memberships: RwLock::new(HashMap::new()),
        }
    }

    /// Removes a connection from every room it joined.
    ///
    /// Returns the rooms it was removed from.
    pub async fn leave_all(&self, connection: &ConnectionId) -> Vec<ConversationId> {
        let mut rooms = self.rooms.write().await;
        let mut memberships = self.memberships.write().await;

        let joined = memberships.remove(connection).unwrap_or_default();
        for room_id in &joined {
            if let Some(room) = rooms.get_mut(room_id) {
                room.remove(connection);
                if room.is_empty() {
                    rooms.remove(room_id);
                }
            }
        }
        joined.into_iter().collect()
    }

    /// Number of connections currently in `room` (0 if it doesn't exist).
    pub async fn member_count(&self, room: &ConversationId) -> usize {
        self.rooms
            .read()
            .await
            .get(room)
            .map(|r| r.len())
            .unwrap_or(0)
    }

    /// Whether `connection` is currently in `room`.
    pub async fn is_member(&self, room: &ConversationId, connection: &ConnectionId) -> bool {
        self.rooms
            .read()
            .await
            .get(room)
            .map(|r| r.contains_key(connection))
            .unwrap_or(false)
    }

    /// All rooms with at least one member (for monitoring/debugging).
    pub async fn active_rooms(&self) -> Vec<ConversationId> {
        self.rooms.read().await.keys().copied().collect()
    }

    /// Count of distinct connections across all rooms.
    pub async fn total_connection_count(&self) -> usize {
        self.memberships.read().await.len()
    }

    /// Drops members whose queue has closed. Re-checks under the write lock.
    async fn prune_closed(&self, room_id: &ConversationId, candidates: Vec<ConnectionId>) {
        let mut rooms = self.rooms.write().await;
        let mut memberships = self.memberships.write().await;

        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };

        for connection in candidates {
            let closed = room.get(&connection).map(|h| h.is_closed()).unwrap_or(false);
            if !closed {
                continue;
            }
            room.remove(&connection);
            if let Some(joined) = memberships.get_mut(&connection) {
                joined.remove(room_id);
                if joined.is_empty() {
                    memberships.remove(&connection);
                }
            }
            tracing::debug!(
                conversation_id = %room_id,
                connection_id = %connection,
                "Dropped closed connection from room"
            );
        }

        if room.is_empty() {
            rooms.remove(room_id);
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for RoomRegistry {
    async fn join(&self, room: &ConversationId, connection: ConnectionHandle) {
        let connection_id = connection.id();
        let mut rooms = self.rooms.write().await;
        let mut memberships = self.memberships.write().await;

        rooms.entry(*room).or_default().insert(connection_id, connection);
        memberships.entry(connection_id).or_default().insert(*room);
    }

    async fn leave(&self, room: &ConversationId, connection: &ConnectionId) {
        let mut rooms = self.rooms.write().await;
        let mut memberships = self.memberships.write().await;

        if let Some(members) = rooms.get_mut(room) {
            members.remove(connection);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
        if let Some(joined) = memberships.get_mut(connection) {
            joined.remove(room);
            if joined.is_empty() {
                memberships.remove(connection);
            }
        }
    }

    async fn broadcast(
        &self,
        room: &ConversationId,
        event: ChatEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let mut queued = 0;
        let mut closed = Vec::new();

        {
            let rooms = self.rooms.read().await;
            let Some(members) = rooms.get(room) else {
                return 0;
            };

            for (id, handle) in members {
                if Some(id) == exclude {
                    continue;
                }
                match handle.deliver(event.clone()) {
                    Delivery::Queued => queued += 1,
                    Delivery::Lagging => {
                        tracing::warn!(
                            conversation_id = %room,
                            connection_id = %id,
                            event = event.name(),
                            "Outbound queue full, event dropped for slow connection"
                        );
                    }
                    Delivery::Closed => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            self.prune_closed(room, closed).await;
        }

        queued
    }
}
