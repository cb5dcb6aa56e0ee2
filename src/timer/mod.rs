//! Focus/rest timer module
//!
//! The controller owns the countdown and its single tick subscription. Finished
//! phases leave as `SessionRecord`s through a `SessionSink`.

pub mod clock;
pub mod controller;

use std::time::Duration;

use crate::state::SessionRecord;

pub use clock::{Clock, ManualClock, TokioClock};
pub use controller::TimerController;

/// Persistence collaborator for finished sessions.
///
/// `submit` must not block: implementations hand the record off and report
/// the outcome on their own.
pub trait SessionSink: Send + Sync {
    fn submit(&self, record: SessionRecord);
}

/// What the controller does with very short sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Sessions shorter than this are dropped with a notice instead of saved
    pub min_session: Option<Duration>,
}

impl SessionPolicy {
    /// A zero threshold disables the check
    pub fn with_min_seconds(seconds: u64) -> Self {
        Self {
            min_session: (seconds > 0).then(|| Duration::from_secs(seconds)),
        }
    }

    pub fn accepts(&self, record: &SessionRecord) -> bool {
        match self.min_session {
            Some(min) => record
                .duration()
                .to_std()
                .map(|elapsed| elapsed >= min)
                .unwrap_or(false),
            None => true,
        }
    }
}
