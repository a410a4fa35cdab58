use crate::error::{BattleError, Result};
use crate::models::RateLimitState;
use crate::ranking::{rank, PlayerData, RankedPair, ScoringWeights};
use crate::selection::DEFAULT_LANGUAGE;
use crate::types::{GitHubProfile, RepoSummary, SearchResponse, UserRepo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;
const MAX_RETRIES: u32 = 3;
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// The hosted API as seen by the controllers.
#[async_trait]
pub trait GitHubApi: Send + Sync + 'static {
    async fn fetch_repos_by_language(&self, language: &str) -> Result<Vec<RepoSummary>>;

    async fn fetch_player(&self, username: &str) -> Result<PlayerData>;

    fn rate_limit_state(&self) -> Option<RateLimitState> {
        None
    }
}

/// Fetch both players concurrently and rank them.
pub async fn fetch_profiles_ranked<A: GitHubApi + ?Sized>(
    api: &A,
    player_one: &str,
    player_two: &str,
    weights: &ScoringWeights,
) -> Result<RankedPair> {
    let (one, two) = futures::try_join!(api.fetch_player(player_one), api.fetch_player(player_two))?;
    Ok(rank(&one, &two, weights))
}

#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    rate_limit: Mutex<Option<RateLimitState>>,
}

impl GitHubClient {
    pub fn new(config: GitHubClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("GitHub Battle/0.1.0")
            .timeout(config.timeout)
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BattleError::ApiError(format!("Invalid API base URL {}: {}", config.base_url, e)))?;

        Ok(GitHubClient {
            client,
            base_url,
            token: config.token,
            rate_limit: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BattleError::ApiError(format!("API base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn make_request(&self, url: &Url) -> Result<Response> {
        let mut retries = 0;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .header("Accept", "application/vnd.github.v3+json");
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("token {}", token));
            }

            let response = request.send().await?;
            let rate_limit = Self::rate_limit_from_headers(response.headers());
            self.record_rate_limit(&rate_limit);

            match response.status() {
                status if status.is_success() => {
                    debug!(%url, remaining = rate_limit.remaining, "GitHub request succeeded");
                    return Ok(response);
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(BattleError::NotFound(format!("Resource not found: {}", url)));
                }
                reqwest::StatusCode::FORBIDDEN if rate_limit.remaining == 0 => {
                    let reset_time = SystemTime::UNIX_EPOCH
                        + Duration::from_secs(rate_limit.reset_time.timestamp().max(0) as u64);
                    let wait_time = reset_time
                        .duration_since(SystemTime::now())
                        .unwrap_or(Duration::from_secs(0));

                    if wait_time > MAX_RATE_LIMIT_WAIT || retries >= MAX_RETRIES {
                        return Err(BattleError::RateLimitExceeded(format!(
                            "API rate limit exceeded. Reset at: {}",
                            rate_limit.reset_time
                        )));
                    }

                    warn!(wait_secs = wait_time.as_secs() + 1, "Rate limit reached, waiting");
                    sleep(wait_time + Duration::from_secs(1)).await;
                    retries += 1;
                    continue;
                }
                status if status.is_server_error() && retries < MAX_RETRIES => {
                    warn!(%status, retry = retries + 1, "Server error, retrying in 2 seconds");
                    sleep(Duration::from_secs(2)).await;
                    retries += 1;
                    continue;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(BattleError::ApiError(format!(
                        "API request failed with status {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }

    fn rate_limit_from_headers(headers: &HeaderMap) -> RateLimitState {
        let header_u32 = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u32>().ok())
        };

        let remaining = header_u32("X-RateLimit-Remaining");
        let limit = header_u32("X-RateLimit-Limit").unwrap_or(60);

        let reset = headers
            .get("X-RateLimit-Reset")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
            .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

        // Servers that send no rate limit headers are treated as unlimited.
        let remaining = remaining.unwrap_or(limit);

        RateLimitState {
            remaining,
            limit,
            reset_time: reset,
            is_limited: remaining == 0,
        }
    }

    fn record_rate_limit(&self, state: &RateLimitState) {
        if let Ok(mut guard) = self.rate_limit.lock() {
            *guard = Some(state.clone());
        }
    }

    pub async fn search_popular_repos(&self, language: &str) -> Result<Vec<RepoSummary>> {
        let query = if language == DEFAULT_LANGUAGE {
            "stars:>1".to_string()
        } else {
            format!("stars:>1 language:{}", language)
        };

        let mut url = self.endpoint(&["search", "repositories"])?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("sort", "stars")
            .append_pair("order", "desc")
            .append_pair("type", "Repositories");

        let response = self.make_request(&url).await?;
        let body: SearchResponse = response.json().await?;
        debug!(language, count = body.items.len(), "Fetched popular repositories");
        Ok(body.items)
    }

    pub async fn get_profile(&self, username: &str) -> Result<GitHubProfile> {
        let url = self.endpoint(&["users", username])?;
        let response = self.make_request(&url).await?;
        let profile: GitHubProfile = response.json().await?;
        Ok(profile)
    }

    pub async fn get_repos(&self, username: &str) -> Result<Vec<UserRepo>> {
        let mut url = self.endpoint(&["users", username, "repos"])?;
        url.query_pairs_mut().append_pair("per_page", &PER_PAGE.to_string());

        let response = self.make_request(&url).await?;
        let repos: Vec<UserRepo> = response.json().await?;
        Ok(repos)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn fetch_repos_by_language(&self, language: &str) -> Result<Vec<RepoSummary>> {
        self.search_popular_repos(language).await
    }

    async fn fetch_player(&self, username: &str) -> Result<PlayerData> {
        let username = crate::comparison::validate_username(username)
            .map_err(|_| BattleError::InvalidUsername(username.to_string()))?;

        let (profile, repos) =
            futures::try_join!(self.get_profile(&username), self.get_repos(&username))?;
        Ok(PlayerData { profile, repos })
    }

    /// Rate limit state from the most recent response, if any request was made.
    fn rate_limit_state(&self) -> Option<RateLimitState> {
        self.rate_limit.lock().ok().and_then(|guard| guard.clone())
    }
}
