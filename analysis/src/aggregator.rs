use brandpulse_core::{AnnotatedRecord, Summary, TopicCount};
use tracing::debug;

/// Number of topics a report lists.
pub const REPORT_TOP_TOPICS: usize = 5;

/// Topic counts, highest first; ties keep first-seen order.
pub fn topic_frequencies(records: &[AnnotatedRecord]) -> Vec<TopicCount> {
    let mut counts: Vec<TopicCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|c| c.topic == record.topic) {
            Some(entry) => entry.count += 1,
            None => counts.push(TopicCount {
                topic: record.topic,
                count: 1,
            }),
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn mean_sentiment(records: &[AnnotatedRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(|r| r.sentiment).sum();
    Some(total / records.len() as f64)
}

pub fn summarize(records: &[AnnotatedRecord]) -> Summary {
    let summary = Summary {
        total: records.len(),
        mean_sentiment: mean_sentiment(records),
        questions: records.iter().filter(|r| r.is_question).count(),
        topic_frequencies: topic_frequencies(records),
    };
    debug!(
        "Summarized {} records ({} questions, {} topics)",
        summary.total,
        summary.questions,
        summary.topic_frequencies.len()
    );
    summary
}
