//! # Sentiment
//!
//! Compound sentiment scoring. The pipeline only depends on the
//! [`SentimentScorer`] capability; [`LexiconScorer`] is the built-in
//! implementation.

mod lexicon;

pub use lexicon::LexiconScorer;

/// Scores a text on a bounded [-1.0, 1.0] scale.
pub trait SentimentScorer {
    fn score(&self, text: &str) -> f64;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> f64,
{
    fn score(&self, text: &str) -> f64 {
        self(text)
    }
}
