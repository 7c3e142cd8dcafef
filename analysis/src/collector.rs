use crate::normalizer::normalize;
use brandpulse_core::{
    CoreError, ErrorExt, PipelineConfig, PostRecord, PostSource, RawPost, RedditApiError,
};
use tracing::{info, warn};

/// Whether a failed search should stop the whole run.
fn is_fatal(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. })
            // The client already retried once with a fresh token.
            | CoreError::RedditApi(RedditApiError::InvalidToken)
            | CoreError::Config(_)
    )
}

/// Whether the remaining keywords of the same group are pointless.
fn skips_group(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::RedditApi(RedditApiError::SubredditNotFound { .. })
            | CoreError::RedditApi(RedditApiError::Forbidden { .. })
    )
}

/// Searches every (group, keyword) pair, group-major and keyword-minor, and
/// returns the raw payloads in that order.
pub async fn fetch_all<S: PostSource>(
    source: &S,
    config: &PipelineConfig,
) -> Result<Vec<RawPost>, CoreError> {
    let mut payloads = Vec::new();
    let mut failures = 0usize;

    for group in &config.source_groups {
        for keyword in &config.keywords {
            match source.search(group, keyword, config.search_limit).await {
                Ok(posts) => {
                    info!("r/{} '{}': {} posts", group, keyword, posts.len());
                    payloads.extend(posts);
                }
                Err(e) if is_fatal(&e) => {
                    e.log_error();
                    return Err(e);
                }
                Err(e) if skips_group(&e) => {
                    failures += 1;
                    warn!("Skipping r/{}: {}", group, e.user_friendly_message());
                    break;
                }
                Err(e) => {
                    failures += 1;
                    e.log_warn();
                    warn!("Search for '{}' in r/{} failed, continuing", keyword, group);
                }
            }
        }
    }

    if failures > 0 {
        warn!("{} searches failed during collection", failures);
    }
    Ok(payloads)
}

/// Fetches and normalizes in one go.
pub async fn collect<S: PostSource>(
    source: &S,
    config: &PipelineConfig,
) -> Result<Vec<PostRecord>, CoreError> {
    let payloads = fetch_all(source, config).await?;
    let fetched = payloads.len();
    let records = normalize(payloads, config.min_text_length);
    info!(
        "Collected {} posts, {} kept after normalization",
        fetched,
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory source that records calls and fails for chosen pairs.
    struct FakeSource {
        calls: RefCell<Vec<(String, String, u32)>>,
        failures: Vec<(&'static str, &'static str, fn() -> CoreError)>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                failures: Vec::new(),
            }
        }

        fn failing(mut self, group: &'static str, keyword: &'static str, error: fn() -> CoreError) -> Self {
            self.failures.push((group, keyword, error));
            self
        }
    }

    impl PostSource for FakeSource {
        async fn search(
            &self,
            source_group: &str,
            keyword: &str,
            limit: u32,
        ) -> Result<Vec<RawPost>, CoreError> {
            self.calls
                .borrow_mut()
                .push((source_group.to_string(), keyword.to_string(), limit));

            if let Some((_, _, error)) = self
                .failures
                .iter()
                .find(|(g, k, _)| *g == source_group && *k == keyword)
            {
                return Err(error());
            }

            Ok(vec![
                RawPost {
                    id: format!("{}-{}", source_group, keyword),
                    source_group: source_group.to_string(),
                    title: Some(format!("{} discussion", keyword)),
                    body: Some("long enough body text".to_string()),
                    created_utc: 1_700_000_000.0,
                    score: 1,
                    num_comments: 0,
                    url: String::new(),
                },
                RawPost {
                    id: "short".to_string(),
                    source_group: source_group.to_string(),
                    title: Some("hi".to_string()),
                    body: None,
                    created_utc: 1_700_000_000.0,
                    score: 0,
                    num_comments: 0,
                    url: String::new(),
                },
            ])
        }
    }

    fn config(groups: &[&str], keywords: &[&str]) -> PipelineConfig {
        PipelineConfig {
            source_groups: groups.iter().map(|g| g.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            search_limit: 25,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_group_major_keyword_minor_order() {
        let source = FakeSource::new();
        let records = collect(&source, &config(&["sailing", "boating"], &["k1", "k2"]))
            .await
            .unwrap();

        let ids: Vec<String> = records.into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec!["sailing-k1", "sailing-k2", "boating-k1", "boating-k2"]
        );
        assert!(source.calls.borrow().iter().all(|(_, _, limit)| *limit == 25));
    }

    #[tokio::test]
    async fn test_failed_pair_is_skipped() {
        let source = FakeSource::new().failing("sailing", "k1", || {
            RedditApiError::ServerError { status_code: 503 }.into()
        });
        let records = collect(&source, &config(&["sailing"], &["k1", "k2"]))
            .await
            .unwrap();

        let ids: Vec<String> = records.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["sailing-k2"]);
        assert_eq!(source.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_group_skips_remaining_keywords() {
        let source = FakeSource::new().failing("gone", "k1", || {
            RedditApiError::SubredditNotFound {
                subreddit: "gone".to_string(),
            }
            .into()
        });
        let records = collect(&source, &config(&["gone", "sailing"], &["k1", "k2"]))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        let groups: Vec<String> = source.calls.borrow().iter().map(|c| c.0.clone()).collect();
        assert_eq!(groups, vec!["gone", "sailing", "sailing"]);
    }

    #[tokio::test]
    async fn test_authentication_failure_aborts() {
        let source = FakeSource::new().failing("boating", "k1", || {
            RedditApiError::AuthenticationFailed {
                reason: "bad secret".to_string(),
            }
            .into()
        });
        let result = collect(&source, &config(&["sailing", "boating", "x"], &["k1"])).await;

        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. }))
        ));
        assert_eq!(source.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_short_payloads() {
        let source = FakeSource::new();
        let payloads = fetch_all(&source, &config(&["sailing"], &["k1"])).await.unwrap();
        assert_eq!(payloads.len(), 2);
    }
}
