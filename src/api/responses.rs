//! API response structures

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    habits::{CalendarDay, HabitDayStatus, MonthSummary},
    services::UserData,
    state::{DurationSettings, TimerState},
};

/// Response of every timer operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    /// False when the operation was not valid from the current status
    pub applied: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
    pub durations: DurationSettings,
}

impl TimerResponse {
    pub fn new(applied: bool, message: String, timer: TimerState, durations: DurationSettings) -> Self {
        Self {
            applied,
            message,
            timestamp: Utc::now(),
            timer,
            durations,
        }
    }
}

/// Signed-in user without the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

impl From<UserData> for UserResponse {
    fn from(user: UserData) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub durations: DurationSettings,
    pub user: Option<UserResponse>,
    pub api_url: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Plain acknowledgement for habit and auth mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleResponse {
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
}

/// Everything the habit detail panel shows for one month
#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub habit_id: String,
    pub name: String,
    pub summary: MonthSummary,
    pub days: Vec<CalendarDay>,
    pub selected_date: Option<NaiveDate>,
    pub selected_is_future: bool,
    pub day_statuses: Vec<HabitDayStatus>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
