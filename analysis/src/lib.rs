//! # Analysis
//!
//! The analytic core of the pipeline: normalizing raw payloads, attaching
//! sentiment, topic and question flags, and aggregating the result. Apart
//! from [`collect`], everything here is synchronous and pure.

pub mod aggregator;
pub mod annotator;
pub mod classifier;
pub mod collector;
pub mod normalizer;
pub mod question;
pub mod sentiment;

pub use aggregator::{summarize, topic_frequencies, REPORT_TOP_TOPICS};
pub use annotator::Annotator;
pub use classifier::TopicClassifier;
pub use collector::{collect, fetch_all};
pub use normalizer::{combined_text, normalize, normalize_post, DEFAULT_MIN_TEXT_LENGTH};
pub use question::is_question;
pub use sentiment::{LexiconScorer, SentimentScorer};
