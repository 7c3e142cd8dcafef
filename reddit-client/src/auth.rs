//! Application-only OAuth2 for Reddit.
//!
//! Searching public subreddits only needs the `client_credentials` grant, so
//! there is no redirect URI, no user consent step and no refresh token: an
//! expired token is simply replaced by a fresh one.

use brandpulse_core::{CoreError, RedditApiError};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, Scope,
    TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub const REDDIT_AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are replaced this long before Reddit would reject them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Reddit hands out one-hour tokens; used when the response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug)]
pub struct TokenProvider {
    oauth_client: BasicClient,
    user_agent: String,
    cached: Mutex<Option<RedditToken>>,
}

impl TokenProvider {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        token_url: &Url,
        user_agent: &str,
    ) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTHORIZE_URL.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("Invalid authorize URL: {}", e),
            }
        })?;

        // Reddit expects the client id/secret as HTTP basic auth.
        let oauth_client = BasicClient::new(
            ClientId::new(client_id.to_string()),
            Some(ClientSecret::new(client_secret.to_string())),
            auth_url,
            Some(TokenUrl::from_url(token_url.clone())),
        )
        .set_auth_type(AuthType::BasicAuth);

        Ok(Self {
            oauth_client,
            user_agent: user_agent.to_string(),
            cached: Mutex::new(None),
        })
    }

    pub fn required_scopes() -> Vec<&'static str> {
        vec!["read"]
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub async fn access_token(&self) -> Result<String, CoreError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached Reddit token expired, requesting a new one");
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        warn!("Discarding rejected Reddit access token");
        *self.cached.lock().await = None;
    }

    pub async fn set_token(&self, token: RedditToken) {
        *self.cached.lock().await = Some(token);
    }

    async fn request_token(&self) -> Result<RedditToken, CoreError> {
        let user_agent = self.user_agent.clone();
        let mut request = self.oauth_client.exchange_client_credentials();
        for scope in Self::required_scopes() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let response = request
            .request_async(|http_request| send_with_user_agent(user_agent, http_request))
            .await
            .map_err(|e| {
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                })
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_else(|| {
                Self::required_scopes()
                    .into_iter()
                    .map(String::from)
                    .collect()
            });

        info!("Obtained Reddit access token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope,
        })
    }
}

/// HTTP transport for the token exchange.
///
/// Reddit throttles requests without a descriptive User-Agent, which the
/// stock oauth2 transport does not send.
async fn send_with_user_agent(
    user_agent: String,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let mut request_builder = client
        .request(request.method, request.url.as_str())
        .body(request.body);
    for (name, value) in &request.headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = request_builder.send().await?;
    let status_code = response.status();
    let headers = response.headers().to_owned();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
