//! Session tuning knobs.

use std::time::Duration;

use rand::Rng;

use crate::domain::conversation::MAX_MESSAGE_CHARS;

/// Bounds of the randomized "thinking time" before a reply is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelay {
    min: Duration,
    max: Duration,
}

impl ReplyDelay {
    /// Creates delay bounds; `max` below `min` is raised to `min`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Replies are produced without waiting.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws a delay uniformly from `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(3000))
    }
}

/// Per-session behaviour shared by every conversation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub reply_delay: ReplyDelay,
    /// How many trailing messages a reply job captures as context.
    pub context_window: usize,
    /// Length limit applied to generated replies.
    pub max_message_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_delay: ReplyDelay::default(),
            context_window: 5,
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }
}
