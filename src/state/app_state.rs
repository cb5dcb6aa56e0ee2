//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{DurationSettings, NoticeBoard, TimerState};
use crate::{habits::Habit, services::ApiClient, timer::TimerController};

/// Shared state behind every HTTP handler and the tick driver
pub struct AppState {
    /// The single timer controller; only its own methods mutate it
    pub timer: Mutex<TimerController>,
    /// Remote API client carrying the authenticated session
    pub api: ApiClient,
    /// Recent notices for the UI
    pub notices: Arc<NoticeBoard>,
    /// Habits as last loaded from the API
    pub habits: Mutex<Vec<Habit>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        timer: TimerController,
        api: ApiClient,
        notices: Arc<NoticeBoard>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            timer: Mutex::new(timer),
            api,
            notices,
            habits: Mutex::new(Vec::new()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Run a controller operation and return whether it applied plus the
    /// resulting snapshot
    pub fn update_timer<F>(&self, action: &str, operation: F) -> Result<(bool, TimerState, DurationSettings), String>
    where
        F: FnOnce(&mut TimerController) -> bool,
    {
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;

        let applied = operation(&mut *timer);
        let snapshot = timer.state().clone();
        let durations = *timer.durations();
        drop(timer);

        if applied {
            self.record_action(action);
        } else {
            debug!("Timer action '{}' ignored in status {:?}", action, snapshot.status);
        }

        Ok((applied, snapshot, durations))
    }

    /// Deliver a tick from the clock subscription
    pub fn deliver_tick(&self, generation: u64) -> Result<bool, String> {
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;
        Ok(timer.on_tick(generation))
    }

    /// Get current timer snapshot
    pub fn get_timer_state(&self) -> Result<(TimerState, DurationSettings), String> {
        self.timer
            .lock()
            .map(|timer| (timer.state().clone(), *timer.durations()))
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Replace the cached habit list
    pub fn set_habits(&self, habits: Vec<Habit>) -> Result<(), String> {
        let mut cached = self
            .habits
            .lock()
            .map_err(|e| format!("Failed to lock habits: {}", e))?;
        *cached = habits;
        Ok(())
    }

    pub fn get_habits(&self) -> Result<Vec<Habit>, String> {
        self.habits
            .lock()
            .map(|habits| habits.clone())
            .map_err(|e| format!("Failed to lock habits: {}", e))
    }

    /// Apply `update` to the cached habit with `id`, if cached
    pub fn update_habit<F, R>(&self, id: &str, update: F) -> Result<Option<R>, String>
    where
        F: FnOnce(&mut Habit) -> R,
    {
        let mut cached = self
            .habits
            .lock()
            .map_err(|e| format!("Failed to lock habits: {}", e))?;
        Ok(cached.iter_mut().find(|habit| habit.id == id).map(update))
    }

    pub fn remove_habit(&self, id: &str) -> Result<(), String> {
        let mut cached = self
            .habits
            .lock()
            .map_err(|e| format!("Failed to lock habits: {}", e))?;
        cached.retain(|habit| habit.id != id);
        Ok(())
    }

    pub fn record_action(&self, action: &str) {
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to record last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
