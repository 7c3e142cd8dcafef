pub mod api;
pub mod auth;
pub mod metrics;
pub mod rate_limiter;
pub mod retry;


pub use api::{RedditApiClient, RedditListing, RedditPostData};
pub use auth::{RedditToken, TokenProvider};
pub use retry::{RetryConfig, RetryExecutor};

use api::{MAX_PAGE_SIZE, SUBMISSION_KIND};
use brandpulse_core::{CoreError, PostSource, RawPost, RedditApiError, RedditCredentials};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct RedditClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub api_base: Url,
    pub token_url: Url,
    pub request_timeout: Duration,
}

impl RedditClientConfig {
    pub fn new(credentials: RedditCredentials, user_agent: String) -> Result<Self, CoreError> {
        Ok(Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            user_agent,
            api_base: parse_url(api::REDDIT_API_BASE)?,
            token_url: parse_url(auth::REDDIT_TOKEN_URL)?,
            request_timeout: Duration::from_secs(30),
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, CoreError> {
    Url::parse(raw).map_err(|e| CoreError::InvalidInput {
        message: format!("invalid URL '{}': {}", raw, e),
    })
}

/// Rate-limited, retrying Reddit search client.
#[derive(Debug)]
pub struct RedditClient {
    api: RedditApiClient,
    auth: TokenProvider,
    retry: RetryExecutor,
}

impl RedditClient {
    pub fn new(config: RedditClientConfig) -> Result<Self, CoreError> {
        let api = RedditApiClient::new(&config.user_agent, config.api_base, config.request_timeout)?;
        let auth = TokenProvider::new(
            &config.client_id,
            &config.client_secret,
            &config.token_url,
            &config.user_agent,
        )?;

        Ok(Self {
            api,
            auth,
            retry: RetryExecutor::new(RetryConfig::reddit()),
        })
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = RetryExecutor::new(config);
        self
    }

    /// Fetches a token up front so bad credentials fail before any searching.
    pub async fn authenticate(&self) -> Result<(), CoreError> {
        self.auth.access_token().await.map(|_| ())
    }

    pub async fn set_token(&self, token: RedditToken) {
        self.auth.set_token(token).await;
    }

    /// Searches `subreddit` for `query`, following pagination until `limit`
    /// submissions were collected or the listing runs out.
    pub async fn search_posts(
        &self,
        subreddit: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawPost>, CoreError> {
        let wanted = limit as usize;
        let mut posts: Vec<RawPost> = Vec::with_capacity(wanted.min(MAX_PAGE_SIZE as usize));
        let mut after: Option<String> = None;
        let operation_name = format!("search r/{} for '{}'", subreddit, query);

        while posts.len() < wanted {
            let page_size = (wanted - posts.len()).min(MAX_PAGE_SIZE as usize) as u32;
            let cursor = after.as_deref();

            let listing = self
                .retry
                .execute(&operation_name, || self.search_page(subreddit, query, page_size, cursor))
                .await?;

            let page_len = listing.data.children.len();
            posts.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .filter(|child| child.kind == SUBMISSION_KIND)
                    .map(|child| child.data.into_raw_post(subreddit)),
            );

            match listing.data.after {
                Some(next) if page_len > 0 => {
                    debug!("Following pagination cursor {} for r/{}", next, subreddit);
                    after = Some(next);
                }
                _ => break,
            }
        }

        posts.truncate(wanted);
        info!(
            "Collected {} posts for '{}' in r/{}",
            posts.len(),
            query,
            subreddit
        );
        Ok(posts)
    }

    async fn search_page(
        &self,
        subreddit: &str,
        query: &str,
        page_size: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let token = self.auth.access_token().await?;
        match self
            .api
            .search_subreddit(&token, subreddit, query, page_size, after)
            .await
        {
            // A rejected token gets exactly one replacement.
            Err(CoreError::RedditApi(RedditApiError::InvalidToken)) => {
                self.auth.invalidate().await;
                let fresh = self.auth.access_token().await?;
                let result = self
                    .api
                    .search_subreddit(&fresh, subreddit, query, page_size, after)
                    .await;
                if let Err(CoreError::RedditApi(RedditApiError::InvalidToken)) = &result {
                    self.auth.invalidate().await;
                }
                result
            }
            result => result,
        }
    }

    pub async fn get_api_metrics(&self) -> metrics::ApiMetrics {
        self.api.get_metrics().await
    }

    /// Logs request, retry and rate limit figures for the run so far.
    pub async fn log_api_metrics(&self) {
        self.api.log_metrics().await;

        let retries = self.retry.get_metrics();
        info!(
            "Retries: {} in total, {} operations recovered, {} gave up",
            retries.total_retries, retries.successful_retries, retries.failed_operations
        );

        let status = self.get_rate_limit_status().await;
        if status.is_near_limit() {
            warn!(
                "Rate limit budget {:.0}% used ({} of {} burst tokens left)",
                status.utilization_percentage(),
                status.available_tokens,
                status.max_tokens
            );
        } else {
            info!(
                "Rate limit budget {:.0}% used, {} requests issued at up to {}/min",
                status.utilization_percentage(),
                status.requests_issued,
                status.requests_per_minute
            );
        }
    }

    pub fn get_retry_metrics(&self) -> retry::RetryMetrics {
        self.retry.get_metrics()
    }

    pub async fn get_rate_limit_status(&self) -> rate_limiter::RateLimitStatus {
        self.api.get_rate_limit_status().await
    }
}

impl PostSource for RedditClient {
    async fn search(
        &self,
        source_group: &str,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<RawPost>, CoreError> {
        self.search_posts(source_group, keyword, limit).await
    }
}
