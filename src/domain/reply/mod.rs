//! Reply generation: sentiment tagging plus a templated stand-in for a
//! real inference backend.

mod sentiment;
mod template_generator;

pub use sentiment::{
    classify_sentiment, SentimentClassifier, NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS,
    QUESTION_KEYWORDS,
};
pub use template_generator::{
    TemplateReplyGenerator, MAX_CONFIDENCE, MIN_CONFIDENCE, REPLY_TEMPLATES,
};
