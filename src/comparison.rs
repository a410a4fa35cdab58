//! Two-player battle state.
//!
//! `ComparisonState` is an immutable value; every transition returns a new one.
//! `ComparisonController` owns the current state together with the progress of
//! the two profile fetches started by `start_comparison`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{BattleError, GENERIC_FETCH_ERROR};
use crate::ranking::{rank, PlayerData, RankedPair, ScoringWeights};

/// GitHub caps logins at 39 characters.
const MAX_USERNAME_LEN: usize = 39;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Both players must be set before the battle starts")]
    SlotsIncomplete,

    #[error("A battle is already in progress; reset first")]
    AlreadyActive,

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    One,
    Two,
}

impl SlotId {
    pub const ALL: [SlotId; 2] = [SlotId::One, SlotId::Two];
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::One => write!(f, "one"),
            SlotId::Two => write!(f, "two"),
        }
    }
}

impl FromStr for SlotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one" => Ok(SlotId::One),
            "two" => Ok(SlotId::Two),
            other => Err(format!("unknown player slot: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "username", rename_all = "snake_case")]
pub enum PlayerSlot {
    Empty,
    Username(String),
}

impl PlayerSlot {
    pub fn is_empty(&self) -> bool {
        matches!(self, PlayerSlot::Empty)
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            PlayerSlot::Empty => None,
            PlayerSlot::Username(name) => Some(name),
        }
    }
}

/// Trims and checks a login before it may enter a slot.
pub fn validate_username(raw: &str) -> Result<String, TransitionError> {
    let username = raw.trim();
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(username.to_string())
    } else {
        Err(TransitionError::InvalidUsername(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonState {
    pub one: PlayerSlot,
    pub two: PlayerSlot,
    pub active: bool,
}

impl Default for ComparisonState {
    fn default() -> Self {
        Self {
            one: PlayerSlot::Empty,
            two: PlayerSlot::Empty,
            active: false,
        }
    }
}

impl ComparisonState {
    pub fn slot(&self, id: SlotId) -> &PlayerSlot {
        match id {
            SlotId::One => &self.one,
            SlotId::Two => &self.two,
        }
    }

    fn replace(&self, id: SlotId, slot: PlayerSlot, active: bool) -> Self {
        let (one, two) = match id {
            SlotId::One => (slot, self.two.clone()),
            SlotId::Two => (self.one.clone(), slot),
        };
        Self { one, two, active }
    }

    pub fn with_slot(&self, id: SlotId, username: &str) -> Result<Self, TransitionError> {
        if self.active {
            return Err(TransitionError::AlreadyActive);
        }
        let username = validate_username(username)?;
        Ok(self.replace(id, PlayerSlot::Username(username), false))
    }

    /// Always legal. Clearing a slot during a battle ends the battle.
    pub fn without_slot(&self, id: SlotId) -> Self {
        self.replace(id, PlayerSlot::Empty, false)
    }

    pub fn started(&self) -> Result<Self, TransitionError> {
        if self.active {
            return Err(TransitionError::AlreadyActive);
        }
        if self.one.is_empty() || self.two.is_empty() {
            return Err(TransitionError::SlotsIncomplete);
        }
        Ok(Self {
            one: self.one.clone(),
            two: self.two.clone(),
            active: true,
        })
    }

    pub fn reset(&self) -> Self {
        Self::default()
    }
}

/// Progress of one player's profile fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PlayerProgress {
    Loading,
    Loaded(Box<PlayerData>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum BattleOutcome {
    Ranked(RankedPair),
    Failed(String),
}

/// Identifies which battle and which slot a player fetch belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTicket {
    pub epoch: u64,
    pub slot: SlotId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSnapshot {
    pub state: ComparisonState,
    pub progress_one: Option<PlayerProgress>,
    pub progress_two: Option<PlayerProgress>,
    pub outcome: Option<BattleOutcome>,
}

#[derive(Debug)]
pub struct ComparisonController {
    state: ComparisonState,
    weights: ScoringWeights,
    epoch: u64,
    progress_one: Option<PlayerProgress>,
    progress_two: Option<PlayerProgress>,
    outcome: Option<BattleOutcome>,
}

impl ComparisonController {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            state: ComparisonState::default(),
            weights,
            epoch: 0,
            progress_one: None,
            progress_two: None,
            outcome: None,
        }
    }

    pub fn state(&self) -> &ComparisonState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn progress(&self, id: SlotId) -> Option<&PlayerProgress> {
        match id {
            SlotId::One => self.progress_one.as_ref(),
            SlotId::Two => self.progress_two.as_ref(),
        }
    }

    fn progress_mut(&mut self, id: SlotId) -> &mut Option<PlayerProgress> {
        match id {
            SlotId::One => &mut self.progress_one,
            SlotId::Two => &mut self.progress_two,
        }
    }

    /// Moves to a new epoch so results from the previous battle are ignored.
    fn abandon_battle(&mut self) {
        self.epoch += 1;
        self.progress_one = None;
        self.progress_two = None;
        self.outcome = None;
    }

    pub fn set_slot(&mut self, id: SlotId, username: &str) -> Result<(), TransitionError> {
        self.state = self.state.with_slot(id, username)?;
        debug!(slot = %id, username, "player set");
        Ok(())
    }

    pub fn reset_slot(&mut self, id: SlotId) {
        if self.state.active {
            info!(slot = %id, "player cleared during battle, ending battle");
            self.abandon_battle();
        }
        self.state = self.state.without_slot(id);
    }

    /// Activates the battle and returns one fetch ticket per slot.
    pub fn start_comparison(&mut self) -> Result<[PlayerTicket; 2], TransitionError> {
        let started = self.state.started()?;
        self.abandon_battle();
        self.state = started;
        self.progress_one = Some(PlayerProgress::Loading);
        self.progress_two = Some(PlayerProgress::Loading);

        let epoch = self.epoch;
        let ticket = |slot: SlotId, player: &PlayerSlot| PlayerTicket {
            epoch,
            slot,
            username: player.username().unwrap_or_default().to_string(),
        };
        let tickets = [
            ticket(SlotId::One, &self.state.one),
            ticket(SlotId::Two, &self.state.two),
        ];

        info!(
            epoch,
            player_one = %tickets[0].username,
            player_two = %tickets[1].username,
            "battle started"
        );
        Ok(tickets)
    }

    pub fn reset_all(&mut self) {
        self.abandon_battle();
        self.state = self.state.reset();
        debug!(epoch = self.epoch, "battle reset");
    }

    /// Returns `false` when the ticket no longer matches the running battle.
    pub fn apply_player(
        &mut self,
        ticket: PlayerTicket,
        result: Result<PlayerData, BattleError>,
    ) -> bool {
        if !self.state.active || ticket.epoch != self.epoch {
            debug!(
                slot = %ticket.slot,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "discarding player result for a finished battle"
            );
            return false;
        }

        let progress = match result {
            Ok(player) => PlayerProgress::Loaded(Box::new(player)),
            Err(e) => {
                warn!(slot = %ticket.slot, username = %ticket.username, error = %e, "player fetch failed");
                PlayerProgress::Failed(e.user_message().to_string())
            }
        };
        *self.progress_mut(ticket.slot) = Some(progress);
        self.settle();
        true
    }

    fn settle(&mut self) {
        if self.outcome.is_some() {
            return;
        }

        match (&self.progress_one, &self.progress_two) {
            (Some(PlayerProgress::Failed(_)), _) | (_, Some(PlayerProgress::Failed(_))) => {
                self.outcome = Some(BattleOutcome::Failed(GENERIC_FETCH_ERROR.to_string()));
            }
            (Some(PlayerProgress::Loaded(a)), Some(PlayerProgress::Loaded(b))) => {
                let ranked = rank(a, b, &self.weights);
                info!(
                    winner = %ranked.winner.username,
                    winner_score = ranked.winner.score,
                    loser = %ranked.loser.username,
                    loser_score = ranked.loser.score,
                    "battle ranked"
                );
                self.outcome = Some(BattleOutcome::Ranked(ranked));
            }
            _ => {}
        }
    }

    pub fn snapshot(&self) -> ComparisonSnapshot {
        ComparisonSnapshot {
            state: self.state.clone(),
            progress_one: self.progress_one.clone(),
            progress_two: self.progress_two.clone(),
            outcome: self.outcome.clone(),
        }
    }
}
