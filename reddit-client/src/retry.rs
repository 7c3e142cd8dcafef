use brandpulse_core::{CoreError, RedditApiError};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn reddit() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
            max_delay_ms: 60000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff
    Retry,
    /// Retry after the delay the server asked for
    RetryWithDelay(Duration),
    /// Permanent failure
    NoRetry,
}

pub fn get_retry_strategy(error: &CoreError) -> RetryStrategy {
    match error {
        CoreError::RedditApi(reddit_error) => match reddit_error {
            RedditApiError::RateLimitExceeded { retry_after } => {
                RetryStrategy::RetryWithDelay(Duration::from_secs(*retry_after))
            }
            RedditApiError::ServerError { .. } => RetryStrategy::Retry,
            RedditApiError::RequestTimeout => RetryStrategy::Retry,
            // Truncated bodies happen under load
            RedditApiError::InvalidResponse { .. } => RetryStrategy::Retry,
            RedditApiError::AuthenticationFailed { .. } => RetryStrategy::NoRetry,
            RedditApiError::InvalidToken => RetryStrategy::NoRetry,
            RedditApiError::Forbidden { .. } => RetryStrategy::NoRetry,
            RedditApiError::SubredditNotFound { .. } => RetryStrategy::NoRetry,
        },
        CoreError::Network(reqwest_error) => {
            if reqwest_error.is_timeout() || reqwest_error.is_connect() {
                RetryStrategy::Retry
            } else {
                RetryStrategy::NoRetry
            }
        }
        _ => RetryStrategy::NoRetry,
    }
}

/// Calculate delay with exponential backoff and jitter
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let max_delay = Duration::from_millis(config.max_delay_ms);

    let multiplier = config.backoff_multiplier.powi(attempt as i32);
    let delay_ms = (config.base_delay_ms as f64 * multiplier) as u64;
    let exponential_delay = Duration::from_millis(delay_ms.min(config.max_delay_ms));

    let jitter_range = (exponential_delay.as_millis() as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);

    (exponential_delay + Duration::from_millis(jitter)).min(max_delay)
}

#[derive(Debug, Clone, Default)]
pub struct RetryMetrics {
    pub total_retries: u64,
    pub successful_retries: u64,
    pub failed_operations: u64,
}

/// Wraps fallible async operations with the retry policy above.
#[derive(Debug)]
pub struct RetryExecutor {
    config: RetryConfig,
    metrics: Mutex<RetryMetrics>,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            metrics: Mutex::new(RetryMetrics::default()),
        }
    }

    /// Runs `operation` until it succeeds, hits a permanent error, or runs
    /// out of attempts. The last error is returned unchanged.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            let error = match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        self.record(|metrics| {
                            metrics.total_retries += attempt as u64;
                            metrics.successful_retries += 1;
                        });
                        info!(
                            "Operation {} succeeded after {} retries (total delay: {:?})",
                            operation_name, attempt, total_delay
                        );
                    }
                    return Ok(result);
                }
                Err(error) => error,
            };

            let has_attempts_left = attempt + 1 < self.config.max_attempts;
            let delay = match get_retry_strategy(&error) {
                RetryStrategy::Retry if has_attempts_left => calculate_delay(attempt, &self.config),
                RetryStrategy::RetryWithDelay(delay) if has_attempts_left => delay,
                strategy => {
                    if strategy == RetryStrategy::NoRetry {
                        debug!("Not retrying {} due to error type: {}", operation_name, error);
                    }
                    self.record(|metrics| {
                        metrics.total_retries += attempt as u64;
                        metrics.failed_operations += 1;
                    });
                    error!(
                        "Operation {} failed after {} attempts: {}",
                        operation_name,
                        attempt + 1,
                        error
                    );
                    return Err(error);
                }
            };

            info!("Retrying {} in {:?} due to: {}", operation_name, delay, error);
            total_delay += delay;
            sleep(delay).await;
            attempt += 1;
        }
    }

    fn record(&self, update: impl FnOnce(&mut RetryMetrics)) {
        if let Ok(mut metrics) = self.metrics.lock() {
            update(&mut metrics);
        }
    }

    pub fn get_metrics(&self) -> RetryMetrics {
        self.metrics
            .lock()
            .map(|metrics| metrics.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_retry_config_reddit() {
        let config = RetryConfig::reddit();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 2000);
        assert_eq!(config.jitter_factor, 0.2);
    }

    #[test]
    fn test_retry_strategy_for_errors() {
        let rate_limit_error =
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
        assert_eq!(
            get_retry_strategy(&rate_limit_error),
            RetryStrategy::RetryWithDelay(Duration::from_secs(60))
        );

        let not_found = CoreError::RedditApi(RedditApiError::SubredditNotFound {
            subreddit: "nope".to_string(),
        });
        assert_eq!(get_retry_strategy(&not_found), RetryStrategy::NoRetry);

        let server_error = CoreError::RedditApi(RedditApiError::ServerError { status_code: 502 });
        assert_eq!(get_retry_strategy(&server_error), RetryStrategy::Retry);
    }

    #[test]
    fn test_exponential_backoff_calculation() {
        let config = RetryConfig {
            base_delay_ms: 1000,
            max_delay_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
            ..Default::default()
        };

        assert_eq!(calculate_delay(0, &config), Duration::from_millis(1000));
        assert_eq!(calculate_delay(1, &config), Duration::from_millis(2000));
        assert_eq!(calculate_delay(3, &config), Duration::from_millis(8000));
        assert_eq!(calculate_delay(10, &config), Duration::from_millis(10000));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let config = RetryConfig {
            base_delay_ms: 1000,
            max_delay_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.5,
            ..Default::default()
        };

        for _ in 0..20 {
            let delay = calculate_delay(1, &config);
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(3000));
        }
    }

    #[tokio::test]
    async fn test_success_after_retries() {
        let executor = RetryExecutor::new(RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            ..Default::default()
        });

        let attempts = Arc::new(std::sync::Mutex::new(0));
        let counter = attempts.clone();

        let result = executor
            .execute("search", move || {
                let counter = counter.clone();
                async move {
                    let mut count = counter.lock().unwrap();
                    *count += 1;
                    if *count < 3 {
                        Err(CoreError::RedditApi(RedditApiError::ServerError {
                            status_code: 500,
                        }))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        let metrics = executor.get_metrics();
        assert_eq!(metrics.total_retries, 2);
        assert_eq!(metrics.successful_retries, 1);
    }

    #[tokio::test]
    async fn test_permanent_error_is_returned_unchanged() {
        let executor = RetryExecutor::new(RetryConfig::default());
        let attempts = Arc::new(std::sync::Mutex::new(0));
        let counter = attempts.clone();

        let result = executor
            .execute("search", move || {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    Err::<i32, CoreError>(CoreError::RedditApi(RedditApiError::Forbidden {
                        resource: "/r/private/search".to_string(),
                    }))
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::Forbidden { .. }))
        ));
        assert_eq!(*attempts.lock().unwrap(), 1);
        assert_eq!(executor.get_metrics().failed_operations, 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let executor = RetryExecutor::new(RetryConfig {
            max_attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
            ..Default::default()
        });

        let result = executor
            .execute("search", || async {
                Err::<i32, CoreError>(CoreError::RedditApi(RedditApiError::RequestTimeout))
            })
            .await;

        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::RequestTimeout))
        ));
        let metrics = executor.get_metrics();
        assert_eq!(metrics.total_retries, 1);
        assert_eq!(metrics.failed_operations, 1);
    }
}
