//! Chat behaviour configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::session::{ReplyDelay, SessionConfig};
use crate::domain::conversation::MAX_MESSAGE_CHARS;
use crate::domain::moderation::DEFAULT_BLOCKED_TERMS;

use super::error::ValidationError;

/// Moderation, reply pacing, and session lifecycle settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Blocked terms (comma-separated); defaults to the built-in list
    pub blocked_terms: Option<String>,

    #[serde(default = "default_reply_delay_min_ms")]
    pub reply_delay_min_ms: u64,

    #[serde(default = "default_reply_delay_max_ms")]
    pub reply_delay_max_ms: u64,

    /// Trailing messages handed to the reply generator
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Per-connection outbound queue capacity
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    #[serde(default = "default_session_idle_timeout")]
    pub session_idle_timeout_secs: u64,

    #[serde(default = "default_eviction_interval")]
    pub eviction_interval_secs: u64,
}

impl ChatConfig {
    /// Blocked terms as a list, falling back to the built-in defaults.
    pub fn blocked_terms_list(&self) -> Vec<String> {
        match &self.blocked_terms {
            Some(terms) => terms
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            None => DEFAULT_BLOCKED_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn reply_delay(&self) -> ReplyDelay {
        ReplyDelay::new(
            Duration::from_millis(self.reply_delay_min_ms),
            Duration::from_millis(self.reply_delay_max_ms),
        )
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            reply_delay: self.reply_delay(),
            context_window: self.context_window,
            max_message_chars: self.max_message_chars,
        }
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs)
    }

    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reply_delay_max_ms < self.reply_delay_min_ms {
            return Err(ValidationError::InvalidReplyDelay);
        }
        if self.context_window == 0 {
            return Err(ValidationError::InvalidChatSetting("context_window"));
        }
        if self.max_message_chars == 0 {
            return Err(ValidationError::InvalidChatSetting("max_message_chars"));
        }
        if self.outbound_buffer == 0 {
            return Err(ValidationError::InvalidChatSetting("outbound_buffer"));
        }
        if self.eviction_interval_secs == 0 {
            return Err(ValidationError::InvalidChatSetting("eviction_interval_secs"));
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            blocked_terms: None,
            reply_delay_min_ms: default_reply_delay_min_ms(),
            reply_delay_max_ms: default_reply_delay_max_ms(),
            context_window: default_context_window(),
            max_message_chars: default_max_message_chars(),
            outbound_buffer: default_outbound_buffer(),
            session_idle_timeout_secs: default_session_idle_timeout(),
            eviction_interval_secs: default_eviction_interval(),
        }
    }
}

fn default_reply_delay_min_ms() -> u64 {
    1000
}

fn default_reply_delay_max_ms() -> u64 {
    3000
}

fn default_context_window() -> usize {
    5
}

fn default_max_message_chars() -> usize {
    MAX_MESSAGE_CHARS
}

fn default_outbound_buffer() -> usize {
    128
}

fn default_session_idle_timeout() -> u64 {
    600
}

fn default_eviction_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.blocked_terms_list(), vec!["spam", "垃圾", "广告", "违法"]);
        assert_eq!(config.reply_delay().min(), Duration::from_millis(1000));
        assert_eq!(config.reply_delay().max(), Duration::from_millis(3000));
        assert_eq!(config.session_config().context_window, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blocked_terms_parsing() {
        let config = ChatConfig {
            blocked_terms: Some(" foo, ,bar ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.blocked_terms_list(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_empty_blocked_terms_disables_moderation() {
        let config = ChatConfig {
            blocked_terms: Some(String::new()),
            ..Default::default()
        };
        assert!(config.blocked_terms_list().is_empty());
    }

    #[test]
    fn test_validation_inverted_delay() {
        let config = ChatConfig {
            reply_delay_min_ms: 500,
            reply_delay_max_ms: 100,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidReplyDelay)));
    }

    #[test]
    fn test_validation_zero_context_window() {
        let config = ChatConfig {
            context_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
