use crate::error::BattleError;
use crate::fetch_cache::FetchTicket;
use crate::github::GitHubApi;
use crate::selection::{RepoList, SelectionController, SelectionStatus, LANGUAGES};
use anyhow::Result;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns the popular repositories selection and runs its fetches
pub struct PopularActor;

pub struct PopularActorState {
    controller: SelectionController,
    api: Arc<dyn GitHubApi>,
    fetches_issued: u64,
}

#[derive(Debug)]
pub enum PopularMessage {
    /// User picked a language
    UpdateSelection(String),
    /// Drop all cached languages and fetch the current one again
    Refresh,
    /// A spawned fetch finished
    FetchCompleted {
        ticket: FetchTicket,
        result: Result<RepoList, BattleError>,
    },
    GetSnapshot(RpcReplyPort<PopularSnapshot>),
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularSnapshot {
    pub selected: String,
    pub languages: Vec<String>,
    pub status: SelectionStatus,
    pub fetches_issued: u64,
}

pub struct PopularActorArgs {
    pub api: Arc<dyn GitHubApi>,
    pub default_language: String,
}

pub async fn spawn_popular_actor(args: PopularActorArgs) -> Result<ActorRef<PopularMessage>> {
    match Actor::spawn(None, PopularActor, args).await {
        Ok((actor_ref, _handle)) => {
            info!("Popular repositories actor started");
            Ok(actor_ref)
        }
        Err(spawn_err) => Err(anyhow::anyhow!("Failed to spawn popular actor: {:?}", spawn_err)),
    }
}

impl PopularActor {
    fn spawn_fetch(myself: ActorRef<PopularMessage>, api: Arc<dyn GitHubApi>, ticket: FetchTicket) {
        tokio::spawn(async move {
            let result = api.fetch_repos_by_language(ticket.key()).await;
            if let Err(e) = myself.send_message(PopularMessage::FetchCompleted { ticket, result }) {
                debug!("Popular actor stopped before fetch completed: {}", e);
            }
        });
    }

    fn select(myself: &ActorRef<PopularMessage>, state: &mut PopularActorState, language: &str) {
        if let Some(ticket) = state.controller.update_selection(language) {
            state.fetches_issued += 1;
            Self::spawn_fetch(myself.clone(), Arc::clone(&state.api), ticket);
        }
    }
}

#[ractor::async_trait]
impl Actor for PopularActor {
    type Msg = PopularMessage;
    type State = PopularActorState;
    type Arguments = PopularActorArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> std::result::Result<Self::State, ActorProcessingErr> {
        info!(default_language = %args.default_language, "Starting popular actor");

        let mut state = PopularActorState {
            controller: SelectionController::new(args.default_language.clone()),
            api: args.api,
            fetches_issued: 0,
        };
        Self::select(&myself, &mut state, &args.default_language);

        Ok(state)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        match message {
            PopularMessage::UpdateSelection(language) => {
                Self::select(&myself, state, &language);
            }
            PopularMessage::Refresh => {
                info!(language = %state.controller.selected(), "Refreshing popular repositories");
                if let Some(ticket) = state.controller.refresh() {
                    state.fetches_issued += 1;
                    Self::spawn_fetch(myself.clone(), Arc::clone(&state.api), ticket);
                }
            }
            PopularMessage::FetchCompleted { ticket, result } => {
                state.controller.apply_fetch(ticket, result);
            }
            PopularMessage::GetSnapshot(reply) => {
                let snapshot = PopularSnapshot {
                    selected: state.controller.selected().to_string(),
                    languages: LANGUAGES.iter().map(|l| l.to_string()).collect(),
                    status: state.controller.status(),
                    fetches_issued: state.fetches_issued,
                };
                if reply.send(snapshot).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        info!(
            cached_languages = state.controller.cache().len(),
            fetches_issued = state.fetches_issued,
            "Popular actor stopped"
        );
        Ok(())
    }
}
