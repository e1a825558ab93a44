//! Per-conversation serialization boundary.
//!
//! A [`ConversationSession`] is the only writer to its conversation. Every
//! append (user messages and generated replies alike) goes through
//! [`ConversationSession::append_and_broadcast`], which holds the session's
//! write lock across load → broadcast → store append. Two appends to the same
//! conversation therefore never interleave, and room members see messages in
//! exactly the order they were appended.
//!
//! # States
//!
//! ```text
//!            receive (safe)                 receive (safe)
//!   Idle ─────────────────────▶ AwaitingReply ◀──────────┐
//!    ▲                               │   └───────────────┘
//!    └──── last reply job done ──────┘
//! ```
//!
//! Unsafe messages leave the state untouched. A message received while a
//! reply is still pending is appended immediately and schedules its own job.
//!
//! # Reply jobs
//!
//! A job is counted from the moment a user message passes moderation, and the
//! append itself runs detached from the caller, so a dropped connection never
//! cuts an accepted message off between broadcast and persistence.
//! Each job captures the last `context_window` messages at schedule time and
//! never sees later appends. Jobs run on their own task, sleep for the
//! randomized thinking delay, call the reply generator, and only then take
//! the write lock to append. Concurrent jobs on one conversation append in
//! completion order, not schedule order.
//!
//! # Durability tradeoff: at-most-once
//!
//! Messages are broadcast before they are persisted. If the store append
//! fails, the broadcast is not retracted: live participants have seen a
//! message that a reconnecting client will not find. The failure is logged
//! at `warn` and reported through [`AppendOutcome::persisted`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Notify;

use crate::domain::conversation::{ChatEvent, Message, MessageContent};
use crate::domain::foundation::{ConversationId, ErrorCode};
use crate::ports::{
    Broadcaster, ContentModerator, ConversationStore, ReplyGenerator, StoreError,
};

use super::SessionConfig;

/// Collaborators shared by all sessions.
#[derive(Clone)]
pub struct SessionDependencies {
    pub store: Arc<dyn ConversationStore>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub moderator: Arc<dyn ContentModerator>,
    pub reply_generator: Arc<dyn ReplyGenerator>,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No reply job outstanding.
    Idle,
    /// At least one accepted message is still being appended or answered.
    AwaitingReply,
}

/// Why a message was not accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Moderation rejected the message. Nothing was appended or broadcast.
    #[error("{reason}")]
    Rejected { reason: String },

    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    /// The conversation could not be read, so nothing was broadcast.
    #[error("Conversation store failed: {0}")]
    Persistence(StoreError),

    #[error("Message processing was interrupted")]
    Interrupted,
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Rejected { .. } => ErrorCode::ModerationRejected,
            SessionError::NotFound(_) => ErrorCode::ConversationNotFound,
            SessionError::Persistence(_) | SessionError::Interrupted => {
                ErrorCode::PersistenceFailed
            }
        }
    }

    /// Text safe to send back to the originating connection.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::Rejected { reason } => reason.clone(),
            SessionError::NotFound(_) => "Conversation not found".to_string(),
            SessionError::Persistence(_) | SessionError::Interrupted => {
                "Failed to send message".to_string()
            }
        }
    }
}

/// Result of one append.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub message: Message,
    /// `false` when the store append failed after the broadcast went out.
    pub persisted: bool,
    /// Trailing messages including `message`, oldest first.
    pub context: Vec<Message>,
}

/// Serializes all mutation of one conversation.
pub struct ConversationSession {
    conversation_id: ConversationId,
    deps: SessionDependencies,
    config: SessionConfig,
    write_lock: tokio::sync::Mutex<()>,
    pending_replies: AtomicUsize,
    idle: Notify,
    last_activity: Mutex<Instant>,
}

impl ConversationSession {
    pub fn new(
        conversation_id: ConversationId,
        deps: SessionDependencies,
        config: SessionConfig,
    ) -> Self {
        Self {
            conversation_id,
            deps,
            config,
            write_lock: tokio::sync::Mutex::new(()),
            pending_replies: AtomicUsize::new(0),
            idle: Notify::new(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn state(&self) -> SessionState {
        if self.pending_replies() == 0 {
            SessionState::Idle
        } else {
            SessionState::AwaitingReply
        }
    }

    pub fn pending_replies(&self) -> usize {
        self.pending_replies.load(Ordering::SeqCst)
    }

    /// Time since the last receive or reply completion.
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }

    fn touch(&self) {
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    /// Accepts a user message: moderate, append, broadcast, schedule a reply.
    ///
    /// Once moderation passes, the append and the reply scheduling run on
    /// their own task. Dropping the returned future (a closing socket) does
    /// not stop a message that was already broadcast from being persisted
    /// and answered.
    ///
    /// # Errors
    ///
    /// - `Rejected` if moderation flags the content (no state change)
    /// - `NotFound` if the conversation does not exist
    /// - `Persistence` if the conversation could not be read
    /// - `Interrupted` if the append task panicked
    pub async fn receive(self: &Arc<Self>, content: MessageContent) -> Result<Message, SessionError> {
        self.touch();

        let verdict = self.deps.moderator.check(content.as_str());
        if !verdict.safe {
            tracing::info!(
                conversation_id = %self.conversation_id,
                "Message rejected by moderation"
            );
            return Err(SessionError::Rejected {
                reason: verdict.reason.unwrap_or_else(|| "Message rejected".to_string()),
            });
        }

        let job = ReplyJob::start(Arc::clone(self));
        let accepted = tokio::spawn(async move {
            let outcome = job
                .session
                .append_and_broadcast(Message::user(content))
                .await?;
            let message = outcome.message.clone();
            ReplyJob::schedule(job, message.content().to_string(), outcome.context);
            Ok::<_, SessionError>(message)
        });

        match accepted.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    conversation_id = %self.conversation_id,
                    error = %e,
                    "Message append task failed"
                );
                Err(SessionError::Interrupted)
            }
        }
    }

    /// The single mutation entry point.
    ///
    /// Holds the write lock across existence check, broadcast and store
    /// append, so appends on this conversation are linearized and broadcast
    /// order equals append order.
    pub async fn append_and_broadcast(&self, message: Message) -> Result<AppendOutcome, SessionError> {
        let _guard = self.write_lock.lock().await;
        let id = self.conversation_id;

        let current = match self.deps.store.load(&id).await {
            Ok(conversation) => conversation,
            Err(StoreError::NotFound(_)) => return Err(SessionError::NotFound(id)),
            Err(e) => {
                tracing::error!(conversation_id = %id, error = %e, "Failed to load conversation");
                return Err(SessionError::Persistence(e));
            }
        };

        self.deps
            .broadcaster
            .broadcast(&id, ChatEvent::NewMessage(message.clone()), None)
            .await;

        match self.deps.store.append(&id, &message).await {
            Ok(updated) => {
                tracing::debug!(
                    conversation_id = %id,
                    message_id = %message.id(),
                    total = updated.messages().len(),
                    "Message appended"
                );
                Ok(AppendOutcome {
                    context: updated.recent_messages(self.config.context_window),
                    message,
                    persisted: true,
                })
            }
            Err(e) => {
                // Broadcast already delivered; not rolled back.
                tracing::warn!(
                    conversation_id = %id,
                    message_id = %message.id(),
                    error = %e,
                    tradeoff = "at-most-once durability",
                    "Message delivered to room but not persisted"
                );
                let mut context = current
                    .recent_messages(self.config.context_window.saturating_sub(1));
                context.push(message.clone());
                Ok(AppendOutcome {
                    context,
                    message,
                    persisted: false,
                })
            }
        }
    }

    async fn produce_reply(&self, prompt: &str, context: &[Message]) {
        let id = self.conversation_id;

        let reply = match self.deps.reply_generator.generate(prompt, context).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(conversation_id = %id, error = %e, "Reply generation failed");
                return;
            }
        };

        let content = match MessageContent::with_limit(reply.text, self.config.max_message_chars) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(conversation_id = %id, error = %e, "Generated reply is not a valid message");
                return;
            }
        };

        let message = Message::ai(content, reply.sentiment, reply.confidence);
        match self.append_and_broadcast(message).await {
            Ok(outcome) => tracing::debug!(
                conversation_id = %id,
                message_id = %outcome.message.id(),
                sentiment = %reply.sentiment,
                persisted = outcome.persisted,
                "Reply delivered"
            ),
            Err(e) => tracing::warn!(conversation_id = %id, error = %e, "Reply dropped"),
        }
        self.touch();
    }

    /// Resolves once no reply job is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending_replies() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Counts one outstanding reply job for as long as it lives.
///
/// Taken before the user message is appended and held until the reply is
/// delivered. Decrements on drop, so a job that fails, panics or is aborted
/// still returns the session to `Idle`.
struct ReplyJob {
    session: Arc<ConversationSession>,
}

impl ReplyJob {
    fn start(session: Arc<ConversationSession>) -> Self {
        session.pending_replies.fetch_add(1, Ordering::SeqCst);
        Self { session }
    }

    /// Sleeps the thinking delay on a new task, then produces the reply.
    fn schedule(job: Self, prompt: String, context: Vec<Message>) {
        let delay = job.session.config.reply_delay.sample();

        tracing::debug!(
            conversation_id = %job.session.conversation_id,
            delay_ms = delay.as_millis() as u64,
            pending = job.session.pending_replies(),
            "Reply job scheduled"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.session.produce_reply(&prompt, &context).await;
        });
    }
}

impl Drop for ReplyJob {
    fn drop(&mut self) {
        if self.session.pending_replies.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.session.idle.notify_waiters();
        }
    }
}
