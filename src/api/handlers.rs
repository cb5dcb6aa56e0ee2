//! Timer, status and health endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use tracing::{error, info};

use super::{
    error::ApiError,
    responses::{HealthResponse, StatusResponse, TimerResponse},
};
use crate::{
    state::{AppState, Notice, TimerMode},
    timer::TimerController,
};

#[derive(Debug, Deserialize)]
pub struct AdjustDurationRequest {
    pub kind: TimerMode,
    pub delta: i32,
}

/// Run one controller operation and describe the outcome
fn run_timer_action<F>(
    state: &AppState,
    action: &str,
    done: &str,
    ignored: &str,
    operation: F,
) -> Result<Json<TimerResponse>, ApiError>
where
    F: FnOnce(&mut TimerController) -> bool,
{
    match state.update_timer(action, operation) {
        Ok((applied, timer, durations)) => {
            let message = if applied { done } else { ignored };
            info!("Timer {} endpoint called - {}", action, message);
            Ok(Json(TimerResponse::new(applied, message.to_string(), timer, durations)))
        }
        Err(e) => {
            error!("Failed to run timer action '{}': {}", action, e);
            Err(ApiError::internal(e))
        }
    }
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    run_timer_action(&state, "start", "Timer started", "Timer can only start when idle", |timer| {
        timer.start()
    })
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    run_timer_action(&state, "pause", "Timer paused", "Timer is not running", |timer| timer.pause())
}

/// Handle POST /timer/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    run_timer_action(&state, "resume", "Timer resumed", "Timer is not paused", |timer| timer.resume())
}

/// Handle POST /timer/cancel
pub async fn cancel_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    run_timer_action(&state, "cancel", "Timer cancelled", "Timer is already idle", |timer| {
        timer.cancel()
    })
}

/// Handle POST /timer/mode/:mode
pub async fn switch_mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let target: TimerMode = mode.parse().map_err(ApiError::bad_request)?;
    let done = format!("Switched to {}", target);
    let ignored = format!("Could not switch to {}", target);
    run_timer_action(&state, "switch-mode", &done, &ignored, |timer| timer.switch_mode(target))
}

/// Handle POST /timer/durations
pub async fn adjust_duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdjustDurationRequest>,
) -> Result<Json<TimerResponse>, ApiError> {
    run_timer_action(
        &state,
        "adjust-duration",
        "Duration updated",
        "Durations can only change while idle",
        |timer| timer.adjust_duration(request.kind, request.delta),
    )
}

/// Handle GET /timer
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    match state.get_timer_state() {
        Ok((timer, durations)) => Ok(Json(TimerResponse::new(true, "Current timer".to_string(), timer, durations))),
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            Err(ApiError::internal(e))
        }
    }
}

/// Handle GET /status - Return current timer, session and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let (timer, durations) = match state.get_timer_state() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(ApiError::internal(e));
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        durations,
        user: state.api.session().user().map(Into::into),
        api_url: state.api.base_url().to_string(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /notices
pub async fn notices_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Notice>> {
    Json(state.notices.recent())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
