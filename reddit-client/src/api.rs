use crate::metrics::{MetricsCollector, RequestMetrics};
use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use brandpulse_core::{CoreError, RawPost, RedditApiError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit caps listing pages at 100 children.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// The subset of a submission (`t3`) the pipeline keeps.
///
/// Everything except the id is optional on the wire; deleted and removed
/// posts come back with null titles and bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub is_self: bool,
}

impl RedditPostData {
    /// Tags the post with the group it was searched in, which may differ
    /// from `subreddit` for crossposts.
    pub fn into_raw_post(self, source_group: &str) -> RawPost {
        RawPost {
            id: self.id,
            source_group: source_group.to_string(),
            title: self.title,
            body: self.selftext,
            created_utc: self.created_utc,
            score: self.score,
            num_comments: self.num_comments,
            url: self.url,
        }
    }
}

pub const SUBMISSION_KIND: &str = "t3";

/// Maps a non-success status to the API error it stands for.
pub fn error_for_status(
    status: StatusCode,
    headers: &HeaderMap,
    subreddit: &str,
    endpoint: &str,
) -> Option<RedditApiError> {
    if status.is_success() {
        return None;
    }

    let error = match status.as_u16() {
        429 => {
            let retry_after = headers
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|seconds| seconds.ceil() as u64)
                .unwrap_or(60);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        // Banned and nonexistent communities redirect to the subreddit search page.
        404 | 301 | 302 | 307 | 308 => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    };
    Some(error)
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: Url,
    rate_limiter: RateLimiter,
    metrics: MetricsCollector,
}

impl RedditApiClient {
    pub fn new(user_agent: &str, api_base: Url, timeout: Duration) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http_client,
            api_base,
            rate_limiter: RateLimiter::new(RateLimitConfig::reddit_oauth()),
            metrics: MetricsCollector::new(),
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base.as_str().trim_end_matches('/'), endpoint)
    }

    async fn get(
        &self,
        endpoint: &str,
        subreddit: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint);

        let waited = self.rate_limiter.acquire_permit().await;
        debug!("Acquired rate limit permit for {} after {:?}", endpoint, waited);

        let start_time = Instant::now();
        let result = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(query_params)
            .send()
            .await;

        let (outcome, status_code) = match result {
            Ok(response) => {
                let status = response.status();
                match error_for_status(status, response.headers(), subreddit, endpoint) {
                    None => {
                        debug!("Request successful: {} {}", status, endpoint);
                        (Ok(response), Some(status.as_u16()))
                    }
                    Some(api_error) => {
                        warn!("Request to {} failed with status {}", endpoint, status);
                        (Err(CoreError::RedditApi(api_error)), Some(status.as_u16()))
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                error!("Request to {} timed out", endpoint);
                (Err(CoreError::RedditApi(RedditApiError::RequestTimeout)), None)
            }
            Err(e) => {
                error!("Network error for {}: {}", endpoint, e);
                (Err(CoreError::Network(e)), None)
            }
        };

        self.metrics
            .record_request(RequestMetrics {
                endpoint: endpoint.to_string(),
                status_code,
                response_time: start_time.elapsed(),
                success: outcome.is_ok(),
                rate_limited: status_code == Some(429),
            })
            .await;

        outcome
    }

    /// Fetches one page of search results restricted to `subreddit`.
    pub async fn search_subreddit(
        &self,
        access_token: &str,
        subreddit: &str,
        query: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/search", subreddit);
        let limit_str = limit.min(MAX_PAGE_SIZE).to_string();

        let mut params = vec![
            ("q", query),
            ("restrict_sr", "1"),
            ("sort", "relevance"),
            ("t", "all"),
            ("type", "link"),
            ("raw_json", "1"),
            ("limit", limit_str.as_str()),
        ];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let response = self.get(&endpoint, subreddit, access_token, &params).await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse search results: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse search results for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} results for '{}' from r/{}",
            listing.data.children.len(),
            query,
            subreddit
        );
        Ok(listing)
    }

    pub async fn get_metrics(&self) -> crate::metrics::ApiMetrics {
        self.metrics.get_metrics().await
    }

    pub async fn log_metrics(&self) {
        self.metrics.log_summary().await;
    }

    pub async fn get_rate_limit_status(&self) -> crate::rate_limiter::RateLimitStatus {
        self.rate_limiter.get_rate_limit_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn test_client() -> RedditApiClient {
        RedditApiClient::new(
            "test-user-agent/1.0",
            Url::parse(REDDIT_API_BASE).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_api_client_creation() {
        let client = test_client();
        let status = client.get_rate_limit_status().await;
        assert!(status.available_tokens > 0);
        assert_eq!(client.get_metrics().await.total_requests, 0);
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let client = RedditApiClient::new(
            "ua",
            Url::parse("http://127.0.0.1:9000/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint_url("/r/sailing/search"),
            "http://127.0.0.1:9000/r/sailing/search"
        );
    }

    #[test]
    fn test_error_for_status_mapping() {
        let headers = HeaderMap::new();
        let map = |code: u16| {
            error_for_status(
                StatusCode::from_u16(code).unwrap(),
                &headers,
                "sailing",
                "/r/sailing/search",
            )
        };

        assert!(map(200).is_none());
        assert!(matches!(map(401), Some(RedditApiError::InvalidToken)));
        assert!(matches!(map(403), Some(RedditApiError::Forbidden { .. })));
        assert!(matches!(
            map(404),
            Some(RedditApiError::SubredditNotFound { ref subreddit }) if subreddit == "sailing"
        ));
        assert!(matches!(
            map(302),
            Some(RedditApiError::SubredditNotFound { .. })
        ));
        assert!(matches!(
            map(503),
            Some(RedditApiError::ServerError { status_code: 503 })
        ));
        assert!(matches!(
            map(429),
            Some(RedditApiError::RateLimitExceeded { retry_after: 60 })
        ));
        assert!(matches!(map(418), Some(RedditApiError::InvalidResponse { .. })));
    }

    #[test]
    fn test_retry_after_header_is_honoured() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("12.4"));
        let error = error_for_status(
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            "boating",
            "/r/boating/search",
        );
        assert!(matches!(
            error,
            Some(RedditApiError::RateLimitExceeded { retry_after: 13 })
        ));
    }

    #[test]
    fn test_reddit_post_conversion() {
        let post_data = RedditPostData {
            id: "abc123".to_string(),
            title: Some("Spirit 1.0 battery life".to_string()),
            selftext: Some("How long does it last?".to_string()),
            subreddit: "electricboats".to_string(),
            url: "https://www.reddit.com/r/sailing/comments/abc123".to_string(),
            permalink: "/r/sailing/comments/abc123".to_string(),
            created_utc: 1640995200.0,
            score: 42,
            num_comments: 5,
            is_self: true,
        };

        let raw = post_data.into_raw_post("sailing");
        assert_eq!(raw.id, "abc123");
        assert_eq!(raw.source_group, "sailing");
        assert_eq!(raw.title.as_deref(), Some("Spirit 1.0 battery life"));
        assert_eq!(raw.body.as_deref(), Some("How long does it last?"));
        assert_eq!(raw.score, 42);
        assert_eq!(raw.num_comments, 5);
    }
}
