//! Scoring and ordering of two battle players.
//!
//! A player's score is `followers * weights.followers + total_stars * weights.stars`,
//! where `total_stars` sums `stargazers_count` over the player's repositories.
//! Everything here is pure: inputs are data that was already fetched.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::{GitHubProfile, UserRepo};

/// Weights applied to each scoring signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub followers: u64,
    pub stars: u64,
}

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    followers: 3,
    stars: 1,
};

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Everything fetched for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub profile: GitHubProfile,
    pub repos: Vec<UserRepo>,
}

impl PlayerData {
    pub fn total_stars(&self) -> u64 {
        self.repos
            .iter()
            .fold(0u64, |acc, repo| acc.saturating_add(repo.stargazers_count))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProfile {
    pub username: String,
    pub score: u64,
    pub profile: GitHubProfile,
}

/// Ordered result of a battle. `winner` has the higher score, or wins the tie-break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPair {
    pub winner: RankedProfile,
    pub loser: RankedProfile,
    pub tie: bool,
}

pub fn score(player: &PlayerData, weights: &ScoringWeights) -> u64 {
    player
        .profile
        .followers
        .saturating_mul(weights.followers)
        .saturating_add(player.total_stars().saturating_mul(weights.stars))
}

fn to_ranked(player: &PlayerData, weights: &ScoringWeights) -> RankedProfile {
    RankedProfile {
        username: player.profile.login.clone(),
        score: score(player, weights),
        profile: player.profile.clone(),
    }
}

/// Higher score first, then case-insensitive username, then exact username.
fn compare(a: &RankedProfile, b: &RankedProfile) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
        .then_with(|| a.username.cmp(&b.username))
}

pub fn rank(a: &PlayerData, b: &PlayerData, weights: &ScoringWeights) -> RankedPair {
    let first = to_ranked(a, weights);
    let second = to_ranked(b, weights);
    let tie = first.score == second.score;

    match compare(&first, &second) {
        Ordering::Greater => RankedPair {
            winner: second,
            loser: first,
            tie,
        },
        _ => RankedPair {
            winner: first,
            loser: second,
            tie,
        },
    }
}
