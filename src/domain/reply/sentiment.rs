//! Keyword-based sentiment classification.
//!
//! Categories are checked in priority order positive → negative → question;
//! the first list with a case-insensitive substring hit wins, otherwise the
//! message is neutral. Deterministic for a fixed input and keyword set.

use crate::domain::conversation::Sentiment;

pub const POSITIVE_KEYWORDS: &[&str] = &["开心", "高兴", "喜欢", "好", "棒", "优秀", "完美"];
pub const NEGATIVE_KEYWORDS: &[&str] = &["难过", "生气", "讨厌", "坏", "糟糕", "失望", "沮丧"];
pub const QUESTION_KEYWORDS: &[&str] = &["什么", "为什么", "怎么", "如何", "?", "？"];

/// Keyword lists used by [`SentimentClassifier`].
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    positive: Vec<String>,
    negative: Vec<String>,
    question: Vec<String>,
}

impl SentimentClassifier {
    pub fn new(positive: &[&str], negative: &[&str], question: &[&str]) -> Self {
        let lower = |words: &[&str]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            positive: lower(positive),
            negative: lower(negative),
            question: lower(question),
        }
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        let lowered = text.to_lowercase();
        let hit = |words: &[String]| words.iter().any(|w| lowered.contains(w.as_str()));

        if hit(&self.positive) {
            Sentiment::Positive
        } else if hit(&self.negative) {
            Sentiment::Negative
        } else if hit(&self.question) {
            Sentiment::Question
        } else {
            Sentiment::Neutral
        }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(POSITIVE_KEYWORDS, NEGATIVE_KEYWORDS, QUESTION_KEYWORDS)
    }
}

/// Classifies `text` with the default keyword lists.
pub fn classify_sentiment(text: &str) -> Sentiment {
    SentimentClassifier::default().classify(text)
}
