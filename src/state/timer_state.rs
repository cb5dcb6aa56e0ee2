//! Timer state, durations and session records

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Allowed focus length in minutes
pub const FOCUS_MINUTES_RANGE: RangeInclusive<u32> = 5..=120;
/// Allowed rest length in minutes
pub const REST_MINUTES_RANGE: RangeInclusive<u32> = 5..=30;
/// Durations move on a grid of this many minutes
pub const DURATION_STEP_MINUTES: i64 = 5;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_REST_MINUTES: u32 = 5;

/// Lifecycle status of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// The two phases of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Focus,
    Rest,
}

impl TimerMode {
    /// The phase that follows this one
    pub fn complement(self) -> Self {
        match self {
            TimerMode::Focus => TimerMode::Rest,
            TimerMode::Rest => TimerMode::Focus,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::Rest => "rest",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "focus" => Ok(TimerMode::Focus),
            "rest" => Ok(TimerMode::Rest),
            other => Err(format!("unknown timer mode '{}', expected 'focus' or 'rest'", other)),
        }
    }
}

/// Snapshot of the countdown owned by the timer controller
///
/// `session_start` is only present while the timer is running and the
/// current session has not been flushed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub status: TimerStatus,
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub session_start: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Create an idle focus timer for the given durations
    pub fn new(durations: &DurationSettings) -> Self {
        let total = durations.seconds(TimerMode::Focus);
        Self {
            status: TimerStatus::Idle,
            mode: TimerMode::Focus,
            remaining_seconds: total,
            total_seconds: total,
            session_start: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Reset remaining and total to the full length of `mode`
    pub fn load_phase(&mut self, mode: TimerMode, durations: &DurationSettings) {
        let total = durations.seconds(mode);
        self.mode = mode;
        self.total_seconds = total;
        self.remaining_seconds = total;
    }
}

/// Configured focus and rest lengths, always within their bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSettings {
    pub focus_minutes: u32,
    pub rest_minutes: u32,
}

impl DurationSettings {
    /// Build settings, snapping both values to the step grid and clamping
    /// them into range
    pub fn new(focus_minutes: u32, rest_minutes: u32) -> Self {
        Self {
            focus_minutes: clamp_to(snap_to_step(focus_minutes as i64), &FOCUS_MINUTES_RANGE),
            rest_minutes: clamp_to(snap_to_step(rest_minutes as i64), &REST_MINUTES_RANGE),
        }
    }

    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::Rest => self.rest_minutes,
        }
    }

    pub fn seconds(&self, mode: TimerMode) -> u32 {
        self.minutes(mode) * 60
    }

    /// Shift one duration by `delta` minutes, clamping to its bounds.
    /// `delta` is rounded to the nearest step first. Returns the resulting
    /// minutes.
    pub fn adjust(&mut self, mode: TimerMode, delta: i32) -> u32 {
        let (slot, range) = match mode {
            TimerMode::Focus => (&mut self.focus_minutes, &FOCUS_MINUTES_RANGE),
            TimerMode::Rest => (&mut self.rest_minutes, &REST_MINUTES_RANGE),
        };
        *slot = clamp_to(snap_to_step(*slot as i64 + snap_to_step(delta as i64)), range);
        *slot
    }
}

impl Default for DurationSettings {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_MINUTES, DEFAULT_REST_MINUTES)
    }
}

/// Round to the nearest multiple of the step, halves rounding up
fn snap_to_step(value: i64) -> i64 {
    (value + DURATION_STEP_MINUTES / 2).div_euclid(DURATION_STEP_MINUTES) * DURATION_STEP_MINUTES
}

fn clamp_to(value: i64, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start() as i64, *range.end() as i64) as u32
}

/// One finished or interrupted phase, handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub kind: TimerMode,
}

impl SessionRecord {
    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }
}
