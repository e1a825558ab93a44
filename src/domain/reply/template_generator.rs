//! Template-pool reply generator.
//!
//! Stand-in for a real inference backend: picks a canned reply at random,
//! prefixes it according to the message's sentiment, and reports a
//! confidence in `[0.7, 1.0)`.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::conversation::{Confidence, Message, Sentiment};
use crate::domain::foundation::DomainError;
use crate::ports::{GeneratedReply, ReplyGenerator};

use super::SentimentClassifier;

pub const REPLY_TEMPLATES: &[&str] = &[
    "这是一个很有趣的问题。让我来分析一下...",
    "根据你提供的信息，我认为...",
    "我理解你的观点。从另一个角度来看...",
    "这让我想到了一个相关的概念...",
    "你提出了一个很好的问题。让我详细解释一下...",
    "基于我的理解，这个问题可以这样看待...",
    "我注意到你之前提到了相关的内容，让我结合起来回答...",
    "这是一个复杂的话题，让我们一步步来分析...",
];

const REPLY_SUFFIX: &str = " 你还有其他想了解的吗？";

pub const MIN_CONFIDENCE: f64 = 0.7;
pub const MAX_CONFIDENCE: f64 = 1.0;

fn sentiment_prefix(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "我很高兴听到你这么说！",
        Sentiment::Negative => "我理解你的感受，让我来帮助你。",
        Sentiment::Question => "这是一个很好的问题！",
        Sentiment::Neutral => "",
    }
}

/// Reply generator drawing from [`REPLY_TEMPLATES`].
pub struct TemplateReplyGenerator {
    classifier: SentimentClassifier,
    rng: Mutex<StdRng>,
}

impl TemplateReplyGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            classifier: SentimentClassifier::default(),
            rng: Mutex::new(rng),
        }
    }

    /// Builds a reply synchronously; the async trait method delegates here.
    pub fn compose(&self, message: &str) -> GeneratedReply {
        let sentiment = self.classifier.classify(message);

        let (template, score) = {
            // A poisoned lock only means another caller panicked mid-draw; the
            // RNG state is still usable.
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let template = REPLY_TEMPLATES[rng.gen_range(0..REPLY_TEMPLATES.len())];
            let score = rng.gen_range(MIN_CONFIDENCE..MAX_CONFIDENCE);
            (template, score)
        };

        let text = format!("{}{}{}", sentiment_prefix(sentiment), template, REPLY_SUFFIX);
        GeneratedReply {
            text,
            sentiment,
            confidence: Confidence::saturating(score),
        }
    }
}

impl Default for TemplateReplyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyGenerator for TemplateReplyGenerator {
    async fn generate(
        &self,
        message: &str,
        context: &[Message],
    ) -> Result<GeneratedReply, DomainError> {
        tracing::trace!(context_len = context.len(), "Composing templated reply");
        Ok(self.compose(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageContent;

    #[test]
    fn positive_message_gets_positive_prefix() {
        let generator = TemplateReplyGenerator::with_seed(7);
        let reply = generator.compose("我很开心");

        assert_eq!(reply.sentiment, Sentiment::Positive);
        assert!(reply.text.starts_with("我很高兴听到你这么说！"));
        assert!(reply.text.ends_with(REPLY_SUFFIX));
    }

    #[test]
    fn neutral_message_has_no_prefix() {
        let generator = TemplateReplyGenerator::with_seed(7);
        let reply = generator.compose("今天下雨");

        assert_eq!(reply.sentiment, Sentiment::Neutral);
        assert!(REPLY_TEMPLATES.iter().any(|t| reply.text.starts_with(t)));
    }

    #[test]
    fn confidence_stays_in_range_over_many_draws() {
        let generator = TemplateReplyGenerator::with_seed(42);
        for _ in 0..1_000 {
            let c = generator.compose("为什么？").confidence.value();
            assert!((MIN_CONFIDENCE..MAX_CONFIDENCE).contains(&c), "confidence {}", c);
        }
    }

    #[test]
    fn same_seed_gives_same_replies() {
        let a = TemplateReplyGenerator::with_seed(99);
        let b = TemplateReplyGenerator::with_seed(99);
        for _ in 0..10 {
            assert_eq!(a.compose("hello"), b.compose("hello"));
        }
    }

    #[tokio::test]
    async fn generate_accepts_context_window() {
        let generator = TemplateReplyGenerator::with_seed(1);
        let context = vec![Message::user(MessageContent::new("earlier").unwrap())];

        let reply = generator.generate("如何开始？", &context).await.unwrap();
        assert_eq!(reply.sentiment, Sentiment::Question);
        assert!(MessageContent::new(reply.text).is_ok());
    }
}
