//! Registry of live conversation sessions.
//!
//! Sessions are created lazily on first use and evicted once they have been
//! idle long enough. For any conversation ID at most one session exists at a
//! time; creation and eviction both happen under the map's write lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::domain::conversation::{Message, MessageContent};
use crate::domain::foundation::ConversationId;

use super::{ConversationSession, SessionConfig, SessionDependencies, SessionError};

/// Owns one [`ConversationSession`] per active conversation.
pub struct SessionManager {
    deps: SessionDependencies,
    config: SessionConfig,
    sessions: RwLock<HashMap<ConversationId, Arc<ConversationSession>>>,
}

impl SessionManager {
    pub fn new(deps: SessionDependencies, config: SessionConfig) -> Self {
        Self {
            deps,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn dependencies(&self) -> &SessionDependencies {
        &self.deps
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the session for `id`, creating it if needed.
    pub async fn session(&self, id: ConversationId) -> Arc<ConversationSession> {
        if let Some(session) = self.sessions.read().await.get(&id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id).or_insert_with(|| {
            tracing::debug!(conversation_id = %id, "Session created");
            Arc::new(ConversationSession::new(
                id,
                self.deps.clone(),
                self.config.clone(),
            ))
        });
        Arc::clone(session)
    }

    /// Routes a user message to its conversation's session.
    ///
    /// A session created for an ID that turns out not to exist is discarded.
    pub async fn receive(
        &self,
        id: ConversationId,
        content: MessageContent,
    ) -> Result<Message, SessionError> {
        let session = self.session(id).await;
        let result = session.receive(content).await;

        if matches!(result, Err(SessionError::NotFound(_))) {
            drop(session);
            self.discard_if_unused(id).await;
        }
        result
    }

    async fn discard_if_unused(&self, id: ConversationId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(&id) {
            if Arc::strong_count(session) == 1 && session.pending_replies() == 0 {
                sessions.remove(&id);
            }
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Removes sessions with no pending reply, no outside reference, and no
    /// activity for at least `idle_for`. Returns how many were removed.
    pub async fn evict_idle(&self, idle_for: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            Arc::strong_count(session) > 1
                || session.pending_replies() > 0
                || session.idle_for() < idle_for
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Waits until every live session has finished its reply jobs.
    ///
    /// Repeats until a pass finds nothing pending, so sessions created by
    /// connections still closing are waited on too.
    pub async fn drain(&self) {
        loop {
            let busy: Vec<_> = self
                .sessions
                .read()
                .await
                .values()
                .filter(|session| session.pending_replies() > 0)
                .cloned()
                .collect();
            if busy.is_empty() {
                return;
            }
            tracing::info!(sessions = busy.len(), "Draining pending replies");
            for session in busy {
                session.wait_idle().await;
            }
        }
    }

    /// Periodically evicts idle sessions until the manager is dropped.
    pub fn spawn_eviction(self: &Arc<Self>, interval: Duration, idle_for: Duration) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.evict_idle(idle_for).await;
            }
        })
    }
}
