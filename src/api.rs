use crate::actors::{request, BattleMessage, PopularMessage, PopularSnapshot};
use crate::comparison::{ComparisonSnapshot, SlotId, TransitionError};
use crate::error::BattleError;
use crate::github::GitHubApi;
use crate::health::{health_check, liveness_check};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use ractor::ActorRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// State shared by every route
#[derive(Clone)]
pub struct AppState {
    pub popular: ActorRef<PopularMessage>,
    pub battle: ActorRef<BattleMessage>,
    pub api: Arc<dyn GitHubApi>,
    pub start_time: Instant,
    pub call_timeout: Duration,
}

/// Response for errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectLanguageRequest {
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPlayerRequest {
    pub username: String,
}

/// Error returned by a route, rendered as `{ "error": ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<BattleError> for ApiError {
    fn from(e: BattleError) -> Self {
        error!("Request failed: {}", e);
        let status = match e {
            BattleError::ActorError(_) => StatusCode::SERVICE_UNAVAILABLE,
            BattleError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.user_message().to_string(),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self {
        warn!("Rejected battle transition: {}", e);
        let status = match e {
            TransitionError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
            TransitionError::SlotsIncomplete | TransitionError::AlreadyActive => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/livez", get(liveness_check))
        .route("/api/popular", get(get_popular))
        .route("/api/popular/select", post(select_language))
        .route("/api/popular/refresh", post(refresh_popular))
        .route("/api/battle", get(get_battle))
        .route("/api/battle/players/:slot", put(set_player).delete(reset_player))
        .route("/api/battle/start", post(start_battle))
        .route("/api/battle/reset", post(reset_battle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn popular_snapshot(state: &AppState) -> ApiResult<PopularSnapshot> {
    let snapshot = request(&state.popular, PopularMessage::GetSnapshot, state.call_timeout).await?;
    Ok(Json(snapshot))
}

async fn get_popular(State(state): State<AppState>) -> ApiResult<PopularSnapshot> {
    popular_snapshot(&state).await
}

async fn select_language(
    State(state): State<AppState>,
    Json(body): Json<SelectLanguageRequest>,
) -> ApiResult<PopularSnapshot> {
    let language = body.language.trim();
    if language.is_empty() {
        return Err(ApiError::bad_request("language must not be empty"));
    }

    state
        .popular
        .send_message(PopularMessage::UpdateSelection(language.to_string()))
        .map_err(|e| BattleError::ActorError(e.to_string()))?;

    popular_snapshot(&state).await
}

async fn refresh_popular(State(state): State<AppState>) -> ApiResult<PopularSnapshot> {
    state
        .popular
        .send_message(PopularMessage::Refresh)
        .map_err(|e| BattleError::ActorError(e.to_string()))?;

    popular_snapshot(&state).await
}

async fn get_battle(State(state): State<AppState>) -> ApiResult<ComparisonSnapshot> {
    let snapshot = request(&state.battle, BattleMessage::GetSnapshot, state.call_timeout).await?;
    Ok(Json(snapshot))
}

async fn set_player(
    State(state): State<AppState>,
    Path(slot): Path<SlotId>,
    Json(body): Json<SetPlayerRequest>,
) -> ApiResult<ComparisonSnapshot> {
    let snapshot = request(
        &state.battle,
        |reply| BattleMessage::SetPlayer {
            slot,
            username: body.username,
            reply,
        },
        state.call_timeout,
    )
    .await??;
    Ok(Json(snapshot))
}

async fn reset_player(
    State(state): State<AppState>,
    Path(slot): Path<SlotId>,
) -> ApiResult<ComparisonSnapshot> {
    let snapshot = request(
        &state.battle,
        |reply| BattleMessage::ResetPlayer { slot, reply },
        state.call_timeout,
    )
    .await?;
    Ok(Json(snapshot))
}

async fn start_battle(State(state): State<AppState>) -> ApiResult<ComparisonSnapshot> {
    let snapshot = request(&state.battle, BattleMessage::Start, state.call_timeout).await??;
    Ok(Json(snapshot))
}

async fn reset_battle(State(state): State<AppState>) -> ApiResult<ComparisonSnapshot> {
    let snapshot = request(&state.battle, BattleMessage::ResetAll, state.call_timeout).await?;
    Ok(Json(snapshot))
}
