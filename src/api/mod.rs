//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod auth;
pub mod error;
pub mod habits;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use auth::*;
use habits::*;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/resume", post(resume_handler))
        .route("/timer/cancel", post(cancel_handler))
        .route("/timer/mode/:mode", post(switch_mode_handler))
        .route("/timer/durations", post(adjust_duration_handler))
        .route("/habits", get(list_habits_handler).post(create_habit_handler))
        .route("/habits/:id", axum::routing::delete(delete_habit_handler))
        .route("/habits/:id/toggle", patch(toggle_habit_handler))
        .route("/habits/:id/calendar", get(calendar_handler))
        .route("/auth/sign-in", post(sign_in_handler))
        .route("/auth/session", post(adopt_session_handler))
        .route("/auth/sign-out", post(sign_out_handler))
        .route("/auth/me", get(me_handler))
        .route("/notices", get(notices_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
