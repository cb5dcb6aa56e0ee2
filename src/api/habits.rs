//! Habit endpoint handlers, proxied to the tracker API

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{error, warn};

use super::{
    error::ApiError,
    responses::{CalendarResponse, MessageResponse, ToggleResponse},
};
use crate::{
    habits::{calendar::parse_month, day_statuses, month_grid, month_summary, today_toggle, Habit},
    state::{AppState, Notice, Notifier},
};

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
    /// `YYYY-MM-DD`, the day whose habit statuses are listed
    pub date: Option<NaiveDate>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Reload the habit list from the API into the cache
async fn reload_habits(state: &AppState) -> Result<Vec<Habit>, ApiError> {
    let habits = state.api.list_habits().await?;
    state.set_habits(habits.clone()).map_err(ApiError::internal)?;
    Ok(habits)
}

/// Report a failed mutation and resync the cache, like the habit screen does
async fn fail_and_resync(state: &AppState, fallback: &str, err: ApiError) -> ApiError {
    let message = if err.status == StatusCode::BAD_GATEWAY {
        fallback.to_string()
    } else {
        err.message.clone()
    };
    state.notices.notify(Notice::failure(message));

    if err.status != StatusCode::UNAUTHORIZED {
        if let Err(e) = reload_habits(state).await {
            warn!("Failed to reload habits after error: {}", e.message);
        }
    }
    err
}

/// Handle GET /habits
pub async fn list_habits_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Habit>>, ApiError> {
    match reload_habits(&state).await {
        Ok(habits) => Ok(Json(habits)),
        Err(e) => {
            error!("Failed to load habits: {}", e.message);
            state.notices.notify(Notice::failure("Failed to load habits"));
            Err(e)
        }
    }
}

/// Handle POST /habits
pub async fn create_habit_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Vec<Habit>>), ApiError> {
    if request.name.trim().is_empty() {
        state.notices.notify(Notice::failure("Enter a habit name"));
        return Err(ApiError::bad_request("Habit name is required"));
    }

    if let Err(e) = state.api.create_habit(&request.name).await {
        error!("Failed to create habit: {}", e);
        let err = ApiError::from(e);
        return Err(fail_and_resync(&state, "Failed to create habit, try again", err).await);
    }

    state.notices.notify(Notice::success("Habit created"));
    state.record_action("create-habit");
    let habits = reload_habits(&state).await?;
    Ok((StatusCode::CREATED, Json(habits)))
}

/// Handle PATCH /habits/:id/toggle - toggles today's completion
pub async fn toggle_habit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    if let Err(e) = state.api.toggle_habit(&id).await {
        error!("Failed to toggle habit {}: {}", id, e);
        let err = ApiError::from(e);
        return Err(fail_and_resync(&state, "Failed to toggle habit, try again", err).await);
    }

    let date = today();
    let completed = match state
        .update_habit(&id, |habit| today_toggle(habit, date))
        .map_err(ApiError::internal)?
    {
        Some(completed) => completed,
        None => reload_habits(&state)
            .await?
            .iter()
            .find(|habit| habit.id == id)
            .map(|habit| habit.completed_on(date))
            .unwrap_or(false),
    };

    state.record_action("toggle-habit");
    Ok(Json(ToggleResponse {
        habit_id: id,
        date,
        completed,
    }))
}

/// Handle DELETE /habits/:id
pub async fn delete_habit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Err(e) = state.api.delete_habit(&id).await {
        error!("Failed to delete habit {}: {}", id, e);
        let err = ApiError::from(e);
        return Err(fail_and_resync(&state, "Failed to delete habit, try again", err).await);
    }

    state.remove_habit(&id).map_err(ApiError::internal)?;
    state.notices.notify(Notice::success("Habit deleted"));
    state.record_action("delete-habit");
    Ok(Json(MessageResponse::new("Habit deleted")))
}

/// Handle GET /habits/:id/calendar
pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let today = today();
    let month = match query.month.as_deref() {
        Some(value) => parse_month(value)
            .ok_or_else(|| ApiError::bad_request(format!("invalid month '{}', expected YYYY-MM", value)))?,
        None => today,
    };

    let metrics = match state.api.habit_metrics(&id, month).await {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to load metrics for habit {}: {}", id, e);
            state.notices.notify(Notice::failure("Failed to load habit metrics"));
            return Err(e.into());
        }
    };

    let mut habits = state.get_habits().map_err(ApiError::internal)?;
    if habits.is_empty() {
        habits = reload_habits(&state).await?;
    }

    let selected_is_future = query.date.map(|date| date > today).unwrap_or(false);
    let statuses = query
        .date
        .map(|date| day_statuses(&habits, date, today))
        .unwrap_or_default();

    Ok(Json(CalendarResponse {
        summary: month_summary(month, &metrics.completed_dates),
        days: month_grid(month, &metrics.completed_dates, today),
        habit_id: metrics.id,
        name: metrics.name,
        selected_date: query.date,
        selected_is_future,
        day_statuses: statuses,
    }))
}
