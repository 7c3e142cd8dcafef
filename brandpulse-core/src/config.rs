use crate::{ConfigError, TopicRule};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";

/// Everything one pipeline run needs to know up front.
///
/// Every field has a default so a config file only has to list what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub brand: String,
    pub keywords: Vec<String>,
    pub source_groups: Vec<String>,
    pub search_limit: u32,
    pub min_text_length: usize,
    pub user_agent: String,
    pub topic_rules: Vec<TopicRule>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            brand: "E-Propulsion".to_string(),
            keywords: [
                "E-Propulsion",
                "ePropulsion",
                "Spirit 1.0",
                "Navy 6.0",
                "Pod Drive",
                "electric outboard",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            source_groups: ["sailing", "boating", "electricboats"]
                .iter()
                .map(|g| g.to_string())
                .collect(),
            search_limit: 200,
            min_text_length: 15,
            user_agent: "brandpulse/0.1 (brand feedback analysis)".to_string(),
            topic_rules: TopicRule::default_rules(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.is_empty() {
            return Err(ConfigError::MissingField {
                field: "keywords".to_string(),
            });
        }
        if self.source_groups.is_empty() {
            return Err(ConfigError::MissingField {
                field: "source_groups".to_string(),
            });
        }
        if self.search_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search_limit".to_string(),
                value: self.search_limit.to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "user_agent".to_string(),
            });
        }
        for rule in &self.topic_rules {
            if rule.keywords.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "topic_rules".to_string(),
                    value: format!("rule for {} has no keywords", rule.topic),
                });
            }
            // Matching runs against lower-cased text.
            if let Some(keyword) = rule
                .keywords
                .iter()
                .find(|k| k.is_empty() || k.to_lowercase() != **k)
            {
                return Err(ConfigError::InvalidValue {
                    field: "topic_rules".to_string(),
                    value: format!("keyword '{}' must be non-empty lower case", keyword),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: read_env(CLIENT_ID_VAR)?,
            client_secret: read_env(CLIENT_SECRET_VAR)?,
        })
    }
}

fn read_env(var_name: &str) -> Result<String, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Topic;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keywords.len(), 6);
        assert_eq!(config.source_groups, vec!["sailing", "boating", "electricboats"]);
        assert_eq!(config.search_limit, 200);
        assert_eq!(config.min_text_length, 15);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            brand = "Torqeedo"
            keywords = ["Torqeedo", "Travel 1103"]
            search_limit = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.brand, "Torqeedo");
        assert_eq!(config.keywords, vec!["Torqeedo", "Travel 1103"]);
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.source_groups.len(), 3);
        assert_eq!(config.topic_rules, TopicRule::default_rules());
    }

    #[test]
    fn test_topic_rules_from_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[topic_rules]]
            keywords = ["warranty"]
            topic = "Customer Service"

            [[topic_rules]]
            keywords = ["battery", "charge"]
            topic = "Battery"
            "#,
        )
        .unwrap();

        assert_eq!(config.topic_rules.len(), 2);
        assert_eq!(config.topic_rules[0].topic, Topic::CustomerService);
        assert_eq!(config.topic_rules[1].keywords, vec!["battery", "charge"]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = PipelineConfig::from_toml_str("keywords = []").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "keywords"));

        let err = PipelineConfig::from_toml_str("search_limit = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = PipelineConfig::from_toml_str(
            r#"
            [[topic_rules]]
            keywords = ["Battery"]
            topic = "Battery"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_topic_is_a_parse_error() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [[topic_rules]]
            keywords = ["hull"]
            topic = "Hull"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
