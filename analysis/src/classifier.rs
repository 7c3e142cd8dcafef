use brandpulse_core::{Topic, TopicRule};

/// Keyword classifier over an ordered rule table.
///
/// The first rule with a keyword occurring as a substring of the lower-cased
/// text wins; no hit means [`Topic::Other`].
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    rules: Vec<TopicRule>,
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(TopicRule::default_rules())
    }
}

impl TopicClassifier {
    pub fn new(rules: Vec<TopicRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TopicRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Topic {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|rule| rule.topic)
            .unwrap_or(Topic::Other)
    }
}
