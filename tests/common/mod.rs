#![allow(dead_code)]

use async_trait::async_trait;
use github_battle::actors::{
    request, spawn_battle_actor, spawn_popular_actor, BattleActorArgs, BattleMessage,
    PopularActorArgs, PopularMessage, PopularSnapshot,
};
use github_battle::comparison::ComparisonSnapshot;
use github_battle::error::{BattleError, Result};
use github_battle::github::GitHubApi;
use github_battle::ranking::{PlayerData, DEFAULT_WEIGHTS};
use github_battle::types::{GitHubProfile, RepoOwner, RepoSummary, UserRepo};
use ractor::ActorRef;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// In-memory stand-in for the GitHub API that counts every call.
#[derive(Default)]
pub struct FakeGitHub {
    players: HashMap<String, PlayerData>,
    player_delays: HashMap<String, Duration>,
    repo_delay: Duration,
    failing_languages: Mutex<HashSet<String>>,
    repo_calls: Mutex<HashMap<String, usize>>,
    player_calls: Mutex<HashMap<String, usize>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, login: &str, followers: u64, stars: &[u64]) -> Self {
        self.players.insert(login.to_string(), player(login, followers, stars));
        self
    }

    pub fn with_player_delay(mut self, login: &str, delay: Duration) -> Self {
        self.player_delays.insert(login.to_string(), delay);
        self
    }

    pub fn with_repo_delay(mut self, delay: Duration) -> Self {
        self.repo_delay = delay;
        self
    }

    pub fn set_failing(&self, language: &str, failing: bool) {
        let mut failing_languages = self.failing_languages.lock().unwrap();
        if failing {
            failing_languages.insert(language.to_string());
        } else {
            failing_languages.remove(language);
        }
    }

    pub fn repo_calls(&self, language: &str) -> usize {
        self.repo_calls.lock().unwrap().get(language).copied().unwrap_or(0)
    }

    pub fn player_calls(&self, login: &str) -> usize {
        self.player_calls.lock().unwrap().get(login).copied().unwrap_or(0)
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn fetch_repos_by_language(&self, language: &str) -> Result<Vec<RepoSummary>> {
        *self
            .repo_calls
            .lock()
            .unwrap()
            .entry(language.to_string())
            .or_insert(0) += 1;

        if !self.repo_delay.is_zero() {
            tokio::time::sleep(self.repo_delay).await;
        }

        if self.failing_languages.lock().unwrap().contains(language) {
            return Err(BattleError::ApiError(format!("search failed for {}", language)));
        }

        Ok((1..=3).map(|i| repo(&format!("{}-repo-{}", language, i), 1000 / i)).collect())
    }

    async fn fetch_player(&self, username: &str) -> Result<PlayerData> {
        *self
            .player_calls
            .lock()
            .unwrap()
            .entry(username.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.player_delays.get(username) {
            tokio::time::sleep(*delay).await;
        }

        self.players
            .get(username)
            .cloned()
            .ok_or_else(|| BattleError::NotFound(format!("user {}", username)))
    }
}

pub fn repo(name: &str, stars: u64) -> RepoSummary {
    RepoSummary {
        name: name.to_string(),
        owner: RepoOwner {
            login: "owner".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/1".to_string(),
        },
        html_url: format!("https://github.com/owner/{}", name),
        stargazers_count: stars,
        forks: stars / 10,
        open_issues: 1,
    }
}

pub fn player(login: &str, followers: u64, stars: &[u64]) -> PlayerData {
    PlayerData {
        profile: GitHubProfile {
            login: login.to_string(),
            name: Some(login.to_uppercase()),
            avatar_url: format!("https://github.com/{}.png?size=200", login),
            html_url: format!("https://github.com/{}", login),
            location: None,
            company: None,
            blog: None,
            followers,
            following: 0,
            public_repos: stars.len() as u64,
        },
        repos: stars
            .iter()
            .enumerate()
            .map(|(i, s)| UserRepo {
                name: format!("{}-{}", login, i),
                stargazers_count: *s,
            })
            .collect(),
    }
}

pub async fn start_popular(fake: &Arc<FakeGitHub>, default_language: &str) -> ActorRef<PopularMessage> {
    let api: Arc<dyn GitHubApi> = fake.clone();
    spawn_popular_actor(PopularActorArgs {
        api,
        default_language: default_language.to_string(),
    })
    .await
    .expect("Failed to spawn popular actor")
}

pub async fn start_battle(fake: &Arc<FakeGitHub>) -> ActorRef<BattleMessage> {
    let api: Arc<dyn GitHubApi> = fake.clone();
    spawn_battle_actor(BattleActorArgs {
        api,
        weights: DEFAULT_WEIGHTS,
    })
    .await
    .expect("Failed to spawn battle actor")
}

pub async fn popular_snapshot(actor: &ActorRef<PopularMessage>) -> PopularSnapshot {
    request(actor, PopularMessage::GetSnapshot, CALL_TIMEOUT)
        .await
        .expect("Popular actor did not answer")
}

pub async fn battle_snapshot(actor: &ActorRef<BattleMessage>) -> ComparisonSnapshot {
    request(actor, BattleMessage::GetSnapshot, CALL_TIMEOUT)
        .await
        .expect("Battle actor did not answer")
}

/// Poll the popular actor until `done` holds, for at most two seconds.
pub async fn wait_for_popular<P>(actor: &ActorRef<PopularMessage>, done: P) -> PopularSnapshot
where
    P: Fn(&PopularSnapshot) -> bool,
{
    for _ in 0..200 {
        let snapshot = popular_snapshot(actor).await;
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Popular actor never reached the expected state");
}

/// Poll the battle actor until `done` holds, for at most two seconds.
pub async fn wait_for_battle<P>(actor: &ActorRef<BattleMessage>, done: P) -> ComparisonSnapshot
where
    P: Fn(&ComparisonSnapshot) -> bool,
{
    for _ in 0..200 {
        let snapshot = battle_snapshot(actor).await;
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Battle actor never reached the expected state");
}
