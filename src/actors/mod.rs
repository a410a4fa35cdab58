pub mod battle;
pub mod popular;

pub use battle::{spawn_battle_actor, BattleActorArgs, BattleMessage};
pub use popular::{spawn_popular_actor, PopularActorArgs, PopularMessage, PopularSnapshot};

use crate::error::{BattleError, Result};
use ractor::rpc::CallResult;
use ractor::{ActorRef, RpcReplyPort};
use std::time::Duration;

/// Ask an actor for a reply, mapping timeouts and dead actors to `ActorError`.
pub async fn request<M, T, F>(actor: &ActorRef<M>, build: F, timeout: Duration) -> Result<T>
where
    M: ractor::Message,
    T: Send + 'static,
    F: FnOnce(RpcReplyPort<T>) -> M,
{
    match actor.call(build, Some(timeout)).await {
        Ok(CallResult::Success(value)) => Ok(value),
        Ok(CallResult::Timeout) => Err(BattleError::ActorError(format!(
            "No reply within {} ms",
            timeout.as_millis()
        ))),
        Ok(CallResult::SenderError) => Err(BattleError::ActorError(
            "Actor dropped the reply port".to_string(),
        )),
        Err(e) => Err(BattleError::ActorError(e.to_string())),
    }
}
