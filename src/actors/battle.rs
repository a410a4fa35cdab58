use crate::comparison::{
    ComparisonController, ComparisonSnapshot, PlayerTicket, SlotId, TransitionError,
};
use crate::error::BattleError;
use crate::github::GitHubApi;
use crate::ranking::{PlayerData, ScoringWeights};
use anyhow::Result;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use tracing::{debug, info};

pub type TransitionReply = RpcReplyPort<std::result::Result<ComparisonSnapshot, TransitionError>>;

/// Owns the battle comparison and runs the two player fetches
pub struct BattleActor;

pub struct BattleActorState {
    controller: ComparisonController,
    api: Arc<dyn GitHubApi>,
    battles_started: u64,
}

#[derive(Debug)]
pub enum BattleMessage {
    SetPlayer {
        slot: SlotId,
        username: String,
        reply: TransitionReply,
    },
    ResetPlayer {
        slot: SlotId,
        reply: RpcReplyPort<ComparisonSnapshot>,
    },
    Start(TransitionReply),
    ResetAll(RpcReplyPort<ComparisonSnapshot>),
    /// A spawned player fetch finished
    PlayerFetched {
        ticket: PlayerTicket,
        result: Result<PlayerData, BattleError>,
    },
    GetSnapshot(RpcReplyPort<ComparisonSnapshot>),
}

pub struct BattleActorArgs {
    pub api: Arc<dyn GitHubApi>,
    pub weights: ScoringWeights,
}

pub async fn spawn_battle_actor(args: BattleActorArgs) -> Result<ActorRef<BattleMessage>> {
    match Actor::spawn(None, BattleActor, args).await {
        Ok((actor_ref, _handle)) => {
            info!("Battle actor started");
            Ok(actor_ref)
        }
        Err(spawn_err) => Err(anyhow::anyhow!("Failed to spawn battle actor: {:?}", spawn_err)),
    }
}

impl BattleActor {
    fn spawn_fetch(myself: ActorRef<BattleMessage>, api: Arc<dyn GitHubApi>, ticket: PlayerTicket) {
        tokio::spawn(async move {
            let result = api.fetch_player(&ticket.username).await;
            if let Err(e) = myself.send_message(BattleMessage::PlayerFetched { ticket, result }) {
                debug!("Battle actor stopped before player fetch completed: {}", e);
            }
        });
    }

    fn reply<T: Send + 'static>(reply: RpcReplyPort<T>, value: T) {
        if reply.send(value).is_err() {
            debug!("Battle requester went away");
        }
    }
}

#[ractor::async_trait]
impl Actor for BattleActor {
    type Msg = BattleMessage;
    type State = BattleActorState;
    type Arguments = BattleActorArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> std::result::Result<Self::State, ActorProcessingErr> {
        info!(
            follower_weight = args.weights.followers,
            star_weight = args.weights.stars,
            "Starting battle actor"
        );

        Ok(BattleActorState {
            controller: ComparisonController::new(args.weights),
            api: args.api,
            battles_started: 0,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        match message {
            BattleMessage::SetPlayer {
                slot,
                username,
                reply,
            } => {
                let result = state
                    .controller
                    .set_slot(slot, &username)
                    .map(|_| state.controller.snapshot());
                Self::reply(reply, result);
            }
            BattleMessage::ResetPlayer { slot, reply } => {
                state.controller.reset_slot(slot);
                Self::reply(reply, state.controller.snapshot());
            }
            BattleMessage::Start(reply) => match state.controller.start_comparison() {
                Ok(tickets) => {
                    state.battles_started += 1;
                    for ticket in tickets {
                        Self::spawn_fetch(myself.clone(), Arc::clone(&state.api), ticket);
                    }
                    Self::reply(reply, Ok(state.controller.snapshot()));
                }
                Err(e) => {
                    debug!(error = %e, "Battle start rejected");
                    Self::reply(reply, Err(e));
                }
            },
            BattleMessage::ResetAll(reply) => {
                state.controller.reset_all();
                Self::reply(reply, state.controller.snapshot());
            }
            BattleMessage::PlayerFetched { ticket, result } => {
                state.controller.apply_player(ticket, result);
            }
            BattleMessage::GetSnapshot(reply) => {
                Self::reply(reply, state.controller.snapshot());
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        info!(battles_started = state.battles_started, "Battle actor stopped");
        Ok(())
    }
}
