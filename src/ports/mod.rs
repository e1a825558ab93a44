//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation engine and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `ConversationStore` - Durable conversation records (load/create/append)
//! - `IdentityVerifier` - Token claims check at connection time
//! - `Broadcaster` - Room membership and fan-out to live connections
//!
//! ## Pluggable Pure Functions
//!
//! - `ContentModerator` - Safe/unsafe verdict for message text
//! - `ReplyGenerator` - Reply body + sentiment from a message and its context

mod broadcaster;
mod content_moderator;
mod conversation_store;
mod identity_verifier;
mod reply_generator;

pub use broadcaster::{Broadcaster, ConnectionHandle, Delivery};
pub use content_moderator::{ContentModerator, ModerationVerdict};
pub use conversation_store::{ConversationStore, StoreError};
pub use identity_verifier::IdentityVerifier;
pub use reply_generator::{GeneratedReply, ReplyGenerator};
