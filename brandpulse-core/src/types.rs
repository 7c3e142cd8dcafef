use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// A post as handed over by a data source, before any cleaning.
///
/// Title and body are optional because sources do not always provide them;
/// a missing value is treated exactly like an empty string downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub source_group: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: i64,
    pub url: String,
}

/// A normalized post whose combined text passed the minimum length check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    #[serde(rename = "subreddit")]
    pub source_group: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: i64,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Battery,
    Pricing,
    #[serde(rename = "Customer Service")]
    CustomerService,
    Noise,
    Performance,
    Other,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Battery,
        Topic::Pricing,
        Topic::CustomerService,
        Topic::Noise,
        Topic::Performance,
        Topic::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Battery => "Battery",
            Topic::Pricing => "Pricing",
            Topic::CustomerService => "Customer Service",
            Topic::Noise => "Noise",
            Topic::Performance => "Performance",
            Topic::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|topic| topic.label() == label)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the ordered topic rule table: any keyword hit assigns `topic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRule {
    pub keywords: Vec<String>,
    pub topic: Topic,
}

impl TopicRule {
    pub fn new(keywords: &[&str], topic: Topic) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            topic,
        }
    }

    /// The fixed rule table, in priority order.
    pub fn default_rules() -> Vec<TopicRule> {
        vec![
            TopicRule::new(&["battery"], Topic::Battery),
            TopicRule::new(&["price", "cost"], Topic::Pricing),
            TopicRule::new(&["warranty", "support"], Topic::CustomerService),
            TopicRule::new(&["noise", "quiet"], Topic::Noise),
            TopicRule::new(&["speed", "range"], Topic::Performance),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub post: PostRecord,
    pub sentiment: f64,
    pub topic: Topic,
    pub is_question: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: Topic,
    pub count: usize,
}

/// Aggregate statistics over one run's annotated table.
///
/// `mean_sentiment` is `None` when the table is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub mean_sentiment: Option<f64>,
    pub questions: usize,
    pub topic_frequencies: Vec<TopicCount>,
}

impl Summary {
    pub fn top_topics(&self, n: usize) -> &[TopicCount] {
        let end = n.min(self.topic_frequencies.len());
        &self.topic_frequencies[..end]
    }
}

/// Anything that can search a source group for posts matching a keyword.
pub trait PostSource {
    fn search(
        &self,
        source_group: &str,
        keyword: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<RawPost>, CoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_labels_round_trip() {
        for topic in Topic::ALL {
            assert_eq!(Topic::from_label(topic.label()), Some(topic));
        }
        assert_eq!(Topic::from_label("customer service"), None);
        assert_eq!(Topic::CustomerService.to_string(), "Customer Service");
    }

    #[test]
    fn test_default_rules_order() {
        let topics: Vec<Topic> = TopicRule::default_rules()
            .into_iter()
            .map(|rule| rule.topic)
            .collect();
        assert_eq!(
            topics,
            vec![
                Topic::Battery,
                Topic::Pricing,
                Topic::CustomerService,
                Topic::Noise,
                Topic::Performance
            ]
        );
    }

    #[test]
    fn test_top_topics_truncates() {
        let summary = Summary {
            total: 3,
            mean_sentiment: Some(0.1),
            questions: 0,
            topic_frequencies: vec![
                TopicCount {
                    topic: Topic::Battery,
                    count: 2,
                },
                TopicCount {
                    topic: Topic::Other,
                    count: 1,
                },
            ],
        };
        assert_eq!(summary.top_topics(1).len(), 1);
        assert_eq!(summary.top_topics(5).len(), 2);
    }
}
