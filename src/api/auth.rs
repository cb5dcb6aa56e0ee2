//! Sign-in and sign-out endpoint handlers

use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::Deserialize;
use tracing::{error, info};

use super::{
    error::ApiError,
    responses::{MessageResponse, UserResponse},
};
use crate::{
    services::ApiUser,
    state::{AppState, Notice, Notifier},
};

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub code: String,
}

/// Handle POST /auth/sign-in - exchange an OAuth code
pub async fn sign_in_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    match state.api.exchange_code(&request.code).await {
        Ok(user) => {
            info!("Sign-in endpoint called - signed in as {}", user.name);
            state.notices.notify(Notice::success(format!("Welcome, {}!", user.name)));
            state.record_action("sign-in");
            Ok(Json(user.into()))
        }
        Err(e) => {
            error!("Authentication failed: {}", e);
            state.notices.notify(Notice::failure(format!("Authentication failed: {}", e)));
            Err(e.into())
        }
    }
}

/// Handle POST /auth/session - adopt a callback payload directly
pub async fn adopt_session_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ApiUser>,
) -> Result<Json<UserResponse>, ApiError> {
    match state.api.adopt(payload).await {
        Ok(user) => {
            state.notices.notify(Notice::success(format!("Welcome, {}!", user.name)));
            state.record_action("sign-in");
            Ok(Json(user.into()))
        }
        Err(e) => {
            error!("Failed to adopt session payload: {}", e);
            Err(ApiError::bad_request(e.to_string()))
        }
    }
}

/// Handle POST /auth/sign-out
pub async fn sign_out_handler(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>, ApiError> {
    state.api.session().sign_out().await.map_err(ApiError::internal)?;
    state.set_habits(Vec::new()).map_err(ApiError::internal)?;
    state.record_action("sign-out");
    Ok(Json(MessageResponse::new("Signed out")))
}

/// Handle GET /auth/me
pub async fn me_handler(State(state): State<Arc<AppState>>) -> Result<Json<UserResponse>, ApiError> {
    state
        .api
        .session()
        .user()
        .filter(|user| !user.token.is_empty())
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::unauthorized("not signed in"))
}
