use crate::classifier::TopicClassifier;
use crate::question::is_question;
use crate::sentiment::SentimentScorer;
use brandpulse_core::{AnnotatedRecord, PostRecord};
use tracing::debug;

/// Attaches sentiment, topic and question flag to post records.
pub struct Annotator<S> {
    scorer: S,
    classifier: TopicClassifier,
}

impl<S: SentimentScorer> Annotator<S> {
    pub fn new(scorer: S, classifier: TopicClassifier) -> Self {
        Self { scorer, classifier }
    }

    pub fn annotate(&self, post: PostRecord) -> AnnotatedRecord {
        let sentiment = self.scorer.score(&post.text);
        let topic = self.classifier.classify(&post.text);
        let is_question = is_question(&post.text);
        AnnotatedRecord {
            post,
            sentiment,
            topic,
            is_question,
        }
    }

    pub fn annotate_all(&self, posts: Vec<PostRecord>) -> Vec<AnnotatedRecord> {
        let records: Vec<AnnotatedRecord> = posts.into_iter().map(|p| self.annotate(p)).collect();
        debug!("Annotated {} records", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconScorer;
    use brandpulse_core::Topic;

    fn post(text: &str) -> PostRecord {
        PostRecord {
            id: "abc".to_string(),
            source_group: "electricboats".to_string(),
            title: "title".to_string(),
            text: text.to_string(),
            created_utc: 1_700_000_000.0,
            score: 12,
            num_comments: 4,
            url: "https://reddit.com/abc".to_string(),
        }
    }

    #[test]
    fn test_annotation_uses_combined_text() {
        let annotator = Annotator::new(LexiconScorer::new(), TopicClassifier::default());
        let record = annotator.annotate(post("How long does the battery last? Mine is great"));

        assert_eq!(record.topic, Topic::Battery);
        assert!(record.is_question);
        assert!(record.sentiment > 0.0);
        assert_eq!(record.post.id, "abc");
        assert_eq!(record.post.score, 12);
    }

    #[test]
    fn test_scorer_result_is_attached_unchanged() {
        let annotator = Annotator::new(|_: &str| -0.42, TopicClassifier::default());
        let records = annotator.annotate_all(vec![post("nice boat overall"), post("quiet and smooth")]);

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.sentiment == -0.42));
        assert_eq!(records[0].topic, Topic::Other);
        assert_eq!(records[1].topic, Topic::Noise);
    }
}
