use crate::actors::{request, BattleMessage, PopularMessage};
use crate::api::AppState;
use crate::models::RateLimitState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Health check status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitState>,
}

/// Individual health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub popular: CheckResult,
    pub battle: CheckResult,
    pub github: CheckResult,
}

/// Result of an individual check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
        }
    }

    fn from_probe<T>(name: &str, probe: crate::error::Result<T>) -> Self {
        match probe {
            Ok(_) => Self::healthy(),
            Err(e) => Self {
                status: HealthStatus::Unhealthy,
                message: Some(format!("{} actor not responding: {}", name, e)),
            },
        }
    }
}

/// Liveness probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Main health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    let popular = CheckResult::from_probe(
        "Popular",
        request(&state.popular, PopularMessage::GetSnapshot, PROBE_TIMEOUT).await,
    );
    let battle = CheckResult::from_probe(
        "Battle",
        request(&state.battle, BattleMessage::GetSnapshot, PROBE_TIMEOUT).await,
    );

    let rate_limit = state.api.rate_limit_state();
    let github = match &rate_limit {
        Some(limit) if limit.is_limited => CheckResult {
            status: HealthStatus::Degraded,
            message: Some(format!("GitHub rate limit exhausted until {}", limit.reset_time)),
        },
        _ => CheckResult::healthy(),
    };

    let checks = [&popular.status, &battle.status, &github.status];
    let overall_status = if checks.iter().any(|s| **s == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if checks.iter().any(|s| **s == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        checks: HealthChecks {
            popular,
            battle,
            github,
        },
        rate_limit,
    };

    (status_code, Json(response))
}

/// Liveness probe, only checks that the process answers
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(LivenessResponse {
            status: "alive".to_string(),
        }),
    )
}
