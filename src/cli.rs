use clap::Parser;
use std::time::Duration;

use crate::github::{GitHubClientConfig, API_BASE_URL};
use crate::ranking::ScoringWeights;
use crate::selection::DEFAULT_LANGUAGE;

#[derive(Parser, Debug)]
#[command(name = "github-battle")]
#[command(about = "GitHub Battle - Popular repositories and profile battles behind a JSON API")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = API_BASE_URL)]
    pub api_url: String,

    /// GitHub token, raises the API rate limit when set
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Port for the HTTP API
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Language selected when the popular screen starts
    #[arg(long, env = "DEFAULT_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub default_language: String,

    /// Score added per follower
    #[arg(long, env = "FOLLOWER_WEIGHT", default_value = "3")]
    pub follower_weight: u64,

    /// Score added per repository star
    #[arg(long, env = "STAR_WEIGHT", default_value = "1")]
    pub star_weight: u64,

    /// Timeout for a single GitHub request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// How long a route waits for an actor reply, in milliseconds
    #[arg(long, env = "ACTOR_CALL_TIMEOUT_MS", default_value = "5000")]
    pub actor_call_timeout_ms: u64,
}

impl Cli {
    pub fn client_config(&self) -> GitHubClientConfig {
        GitHubClientConfig {
            base_url: self.api_url.clone(),
            token: self.github_token.clone().filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            followers: self.follower_weight,
            stars: self.star_weight,
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.actor_call_timeout_ms)
    }
}
