//! Habit data as served by the tracker backend

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// One entry of a backend `isCompleted` list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedDate {
    pub date: String,
}

/// Habit document as returned by `GET /habits`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHabit {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub is_completed: Vec<CompletedDate>,
    #[serde(default)]
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Habit normalised for local use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub completed_dates: BTreeSet<NaiveDate>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Whether the habit already existed on local `date`
    pub fn existed_on(&self, date: NaiveDate) -> bool {
        self.created_at.with_timezone(&Local).date_naive() <= date
    }
}

impl From<BackendHabit> for Habit {
    fn from(habit: BackendHabit) -> Self {
        Self {
            completed_dates: parse_completed(&habit.is_completed),
            id: habit.id,
            name: habit.name,
            user_id: habit.user_id,
            created_at: habit.created_at,
            updated_at: habit.updated_at,
        }
    }
}

/// Response of `GET /habits/{id}/metrics`
#[derive(Debug, Clone, Deserialize)]
pub struct BackendHabitMetrics {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, rename = "isCompleted", deserialize_with = "null_as_empty")]
    pub is_completed: Vec<CompletedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitMetrics {
    pub id: String,
    pub name: String,
    pub completed_dates: BTreeSet<NaiveDate>,
}

impl From<BackendHabitMetrics> for HabitMetrics {
    fn from(metrics: BackendHabitMetrics) -> Self {
        Self {
            completed_dates: parse_completed(&metrics.is_completed),
            id: metrics.id,
            name: metrics.name,
        }
    }
}

/// Parse a completion date given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp. Timestamps map to their calendar date in the local zone, the
/// same zone "today" is taken in.
pub fn parse_completion_date(value: &str) -> Option<NaiveDate> {
    parse_completion_date_in(value, &Local)
}

/// Like [`parse_completion_date`], bucketing timestamps in `zone`
pub fn parse_completion_date_in<Tz: TimeZone>(value: &str, zone: &Tz) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(zone).date_naive())
}

/// A `null` list decodes the same as a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn parse_completed(entries: &[CompletedDate]) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .filter_map(|entry| {
            let parsed = parse_completion_date(&entry.date);
            if parsed.is_none() {
                warn!("Skipping unparsable completion date: {}", entry.date);
            }
            parsed
        })
        .collect()
}
