//! Timer controller: the focus/rest state machine

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{Clock, SessionPolicy, SessionSink};
use crate::state::{
    DurationSettings, Notice, Notifier, SessionRecord, TimerMode, TimerState, TimerStatus,
};

/// Owns the countdown, its session bookkeeping and the tick subscription.
///
/// Every transition arms or disarms the clock itself. Transitions that are not
/// valid from the current status are ignored and return `false`.
pub struct TimerController {
    state: TimerState,
    durations: DurationSettings,
    policy: SessionPolicy,
    clock: Box<dyn Clock>,
    sink: Arc<dyn SessionSink>,
    notifier: Arc<dyn Notifier>,
    generation: u64,
    armed: bool,
}

impl TimerController {
    pub fn new(
        durations: DurationSettings,
        policy: SessionPolicy,
        clock: Box<dyn Clock>,
        sink: Arc<dyn SessionSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: TimerState::new(&durations),
            durations,
            policy,
            clock,
            sink,
            notifier,
            generation: 0,
            armed: false,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn durations(&self) -> &DurationSettings {
        &self.durations
    }

    /// Generation of the live tick subscription
    pub fn armed_generation(&self) -> Option<u64> {
        self.armed.then_some(self.generation)
    }

    pub fn start(&mut self) -> bool {
        if self.state.status != TimerStatus::Idle {
            return false;
        }

        let mode = self.state.mode;
        self.state.load_phase(mode, &self.durations);
        self.open_session();
        info!("Timer started: {} for {}s", mode, self.state.total_seconds);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.status != TimerStatus::Running {
            return false;
        }

        self.disarm();
        self.flush_open_session();
        self.state.status = TimerStatus::Paused;
        info!("Timer paused with {}s remaining", self.state.remaining_seconds);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.status != TimerStatus::Paused {
            return false;
        }

        self.open_session();
        info!("Timer resumed with {}s remaining", self.state.remaining_seconds);
        true
    }

    pub fn cancel(&mut self) -> bool {
        if self.state.status == TimerStatus::Idle {
            return false;
        }

        self.disarm();
        self.flush_open_session();
        self.state.load_phase(TimerMode::Focus, &self.durations);
        self.state.status = TimerStatus::Idle;
        info!("Timer cancelled");
        true
    }

    /// Valid from any status; always ends up running in `target`
    pub fn switch_mode(&mut self, target: TimerMode) -> bool {
        self.disarm();
        if self.state.is_running() {
            self.flush_open_session();
        }

        self.state.load_phase(target, &self.durations);
        self.open_session();
        info!("Timer switched to {}", target);
        true
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `true` when this tick completed the phase.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds > 0 {
            return false;
        }

        let finished = self.state.mode;
        self.disarm();
        self.flush_open_session();
        self.state.load_phase(finished.complement(), &self.durations);
        self.state.status = TimerStatus::Idle;

        let message = match finished {
            TimerMode::Focus => "Focus session complete, time for a rest",
            TimerMode::Rest => "Rest is over, ready to focus again",
        };
        self.notifier.notify(Notice::success(message));
        info!("Timer phase complete: {} -> {}", finished, self.state.mode);
        true
    }

    /// Tick from the clock subscription tagged `generation`.
    ///
    /// Ticks from a subscription that has since been replaced or disarmed are
    /// dropped, so a late tick can never decrement twice.
    pub fn on_tick(&mut self, generation: u64) -> bool {
        if self.armed_generation() != Some(generation) {
            debug!("Ignoring stale tick from generation {}", generation);
            return false;
        }
        self.tick()
    }

    /// Shift the configured length of `kind` by `delta` minutes while idle
    pub fn adjust_duration(&mut self, kind: TimerMode, delta: i32) -> bool {
        if self.state.status != TimerStatus::Idle {
            return false;
        }

        let minutes = self.durations.adjust(kind, delta);
        if kind == self.state.mode {
            self.state.load_phase(kind, &self.durations);
        }
        debug!("{} duration set to {} minutes", kind, minutes);
        true
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn open_session(&mut self) {
        self.state.session_start = Some(self.now());
        self.state.status = TimerStatus::Running;
        self.arm();
    }

    fn flush_open_session(&mut self) {
        let Some(started_at) = self.state.session_start.take() else {
            return;
        };

        let record = SessionRecord {
            started_at,
            ended_at: self.now(),
            kind: self.state.mode,
        };

        if !self.policy.accepts(&record) {
            debug!(
                "Dropping {} session of {}s below the minimum",
                record.kind,
                record.duration().num_seconds()
            );
            self.notifier
                .notify(Notice::info("Session too short to be saved"));
            return;
        }

        self.sink.submit(record);
    }

    fn arm(&mut self) {
        self.disarm();
        self.generation += 1;
        self.clock.arm(self.generation);
        self.armed = true;
    }

    fn disarm(&mut self) {
        if self.armed {
            self.clock.disarm();
            self.armed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{NoticeBoard, NoticeLevel};
    use crate::timer::ManualClock;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<SessionRecord>>,
    }

    impl RecordingSink {
        fn records(&self) -> Vec<SessionRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl SessionSink for RecordingSink {
        fn submit(&self, record: SessionRecord) {
            self.records.lock().unwrap().push(record);
        }
    }

    struct Harness {
        controller: TimerController,
        clock: ManualClock,
        sink: Arc<RecordingSink>,
        notices: Arc<NoticeBoard>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_policy(SessionPolicy::default())
        }

        fn with_policy(policy: SessionPolicy) -> Self {
            let clock = ManualClock::new(Utc::now());
            let sink = Arc::new(RecordingSink::default());
            let notices = Arc::new(NoticeBoard::new());
            let controller = TimerController::new(
                DurationSettings::default(),
                policy,
                Box::new(clock.clone()),
                sink.clone(),
                notices.clone(),
            );
            Self {
                controller,
                clock,
                sink,
                notices,
            }
        }

        /// One elapsed second followed by its tick
        fn run_ticks(&mut self, count: u32) {
            for _ in 0..count {
                self.clock.advance(1);
                self.controller.tick();
            }
        }
    }

    #[test]
    fn starts_idle_in_focus_with_default_lengths() {
        let harness = Harness::new();
        let state = harness.controller.state();
        assert_eq!(state.status, TimerStatus::Idle);
        assert_eq!(state.mode, TimerMode::Focus);
        assert_eq!(state.remaining_seconds, 1500);
        assert_eq!(state.total_seconds, 1500);
        assert!(state.session_start.is_none());
    }

    #[test]
    fn start_loads_full_phase_and_arms_clock() {
        let mut harness = Harness::new();
        assert!(harness.controller.start());

        let state = harness.controller.state();
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.remaining_seconds, 25 * 60);
        assert_eq!(state.total_seconds, 25 * 60);
        assert!(state.session_start.is_some());
        assert_eq!(harness.clock.armed_generation(), Some(1));

        assert!(!harness.controller.start());
        assert_eq!(harness.clock.armed_generation(), Some(1));
    }

    #[test]
    fn full_focus_phase_flushes_one_record_and_flips_mode() {
        let mut harness = Harness::new();
        harness.controller.start();
        harness.run_ticks(1500);

        let records = harness.sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, TimerMode::Focus);
        assert_eq!(records[0].duration().num_seconds(), 1500);

        let state = harness.controller.state();
        assert_eq!(state.status, TimerStatus::Idle);
        assert_eq!(state.mode, TimerMode::Rest);
        assert_eq!(state.remaining_seconds, 300);
        assert_eq!(state.total_seconds, 300);
        assert!(state.session_start.is_none());
        assert_eq!(harness.clock.armed_generation(), None);

        let notices = harness.notices.recent();
        assert_eq!(notices.last().unwrap().level, NoticeLevel::Success);
    }

    #[test]
    fn completed_phase_waits_for_explicit_start() {
        let mut harness = Harness::new();
        harness.controller.start();
        harness.run_ticks(1500);

        harness.run_ticks(10);
        assert_eq!(harness.controller.state().remaining_seconds, 300);
        assert_eq!(harness.sink.records().len(), 1);

        assert!(harness.controller.start());
        harness.run_ticks(300);
        let records = harness.sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind, TimerMode::Rest);
        assert_eq!(harness.controller.state().mode, TimerMode::Focus);
    }

    #[test]
    fn pause_resume_cancel_records_running_time_only() {
        let mut harness = Harness::new();
        harness.controller.start();
        harness.run_ticks(10);

        assert!(harness.controller.pause());
        assert_eq!(harness.controller.state().status, TimerStatus::Paused);
        assert!(harness.controller.state().session_start.is_none());
        assert_eq!(harness.clock.armed_generation(), None);

        // Time spent paused is not attributed to any record
        harness.clock.advance(120);
        harness.controller.tick();
        assert_eq!(harness.controller.state().remaining_seconds, 1490);

        assert!(harness.controller.resume());
        harness.run_ticks(5);
        assert!(harness.controller.cancel());

        let records = harness.sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].duration().num_seconds(), 10);
        assert_eq!(records[1].duration().num_seconds(), 5);
        assert!(records[1].started_at >= records[0].ended_at);

        let state = harness.controller.state();
        assert_eq!(state.status, TimerStatus::Idle);
        assert_eq!(state.mode, TimerMode::Focus);
        assert_eq!(state.remaining_seconds, 1500);
    }

    #[test]
    fn cancel_while_running_ends_record_at_cancel_instant() {
        let mut harness = Harness::new();
        harness.controller.start();
        harness.run_ticks(42);

        let cancel_at = harness.clock.now();
        harness.controller.cancel();

        let records = harness.sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ended_at, cancel_at);
    }

    #[test]
    fn cancel_while_idle_is_a_no_op() {
        let mut harness = Harness::new();
        assert!(!harness.controller.cancel());
        assert!(harness.sink.records().is_empty());
    }

    #[test]
    fn cancel_while_paused_flushes_nothing_more() {
        let mut harness = Harness::new();
        harness.controller.start();
        harness.run_ticks(3);
        harness.controller.pause();
        harness.controller.cancel();

        assert_eq!(harness.sink.records().len(), 1);
        assert_eq!(harness.controller.state().status, TimerStatus::Idle);
    }

    #[test]
    fn cancel_from_rest_returns_to_focus() {
        let mut harness = Harness::new();
        harness.controller.switch_mode(TimerMode::Rest);
        harness.run_ticks(2);
        harness.controller.cancel();

        let state = harness.controller.state();
        assert_eq!(state.mode, TimerMode::Focus);
        assert_eq!(state.total_seconds, 1500);
    }

    #[test]
    fn switch_mode_flushes_session_being_left() {
        let mut harness = Harness::new();
        harness.controller.start();
        harness.run_ticks(30);

        assert!(harness.controller.switch_mode(TimerMode::Rest));

        let records = harness.sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, TimerMode::Focus);
        assert_eq!(records[0].duration().num_seconds(), 30);

        let state = harness.controller.state();
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.mode, TimerMode::Rest);
        assert_eq!(state.remaining_seconds, 300);
        assert!(state.session_start.is_some());
        assert_eq!(harness.clock.armed_generation(), Some(2));
    }

    #[test]
    fn switch_mode_from_idle_or_paused_flushes_nothing() {
        let mut harness = Harness::new();
        harness.controller.switch_mode(TimerMode::Rest);
        assert!(harness.sink.records().is_empty());

        harness.run_ticks(4);
        harness.controller.pause();
        assert_eq!(harness.sink.records().len(), 1);

        harness.controller.switch_mode(TimerMode::Focus);
        assert_eq!(harness.sink.records().len(), 1);
        assert_eq!(harness.controller.state().status, TimerStatus::Running);
    }

    #[test]
    fn invalid_transitions_are_ignored() {
        let mut harness = Harness::new();
        assert!(!harness.controller.pause());
        assert!(!harness.controller.resume());
        assert!(!harness.controller.tick());

        harness.controller.start();
        assert!(!harness.controller.resume());
        assert_eq!(harness.controller.state().status, TimerStatus::Running);
    }

    #[test]
    fn adjust_duration_only_while_idle() {
        let mut harness = Harness::new();
        assert!(harness.controller.adjust_duration(TimerMode::Focus, 5));
        assert_eq!(harness.controller.state().total_seconds, 30 * 60);
        assert_eq!(harness.controller.state().remaining_seconds, 30 * 60);

        // Editing the other phase leaves the loaded one alone
        assert!(harness.controller.adjust_duration(TimerMode::Rest, 5));
        assert_eq!(harness.controller.durations().rest_minutes, 10);
        assert_eq!(harness.controller.state().total_seconds, 30 * 60);

        harness.controller.start();
        assert!(!harness.controller.adjust_duration(TimerMode::Focus, 5));
        assert_eq!(harness.controller.durations().focus_minutes, 30);

        harness.controller.pause();
        assert!(!harness.controller.adjust_duration(TimerMode::Focus, -5));
        assert_eq!(harness.controller.durations().focus_minutes, 30);
    }

    #[test]
    fn adjust_duration_clamps() {
        let mut harness = Harness::new();
        harness.controller.adjust_duration(TimerMode::Focus, 1000);
        harness.controller.adjust_duration(TimerMode::Rest, -1000);
        assert_eq!(harness.controller.durations().focus_minutes, 120);
        assert_eq!(harness.controller.durations().rest_minutes, 5);
    }

    #[test]
    fn stale_ticks_are_dropped() {
        let mut harness = Harness::new();
        harness.controller.start();
        let first = harness.controller.armed_generation().unwrap();

        harness.controller.pause();
        harness.controller.resume();
        let second = harness.controller.armed_generation().unwrap();
        assert_ne!(first, second);

        assert!(!harness.controller.on_tick(first));
        assert_eq!(harness.controller.state().remaining_seconds, 1500);

        harness.controller.on_tick(second);
        assert_eq!(harness.controller.state().remaining_seconds, 1499);
    }

    #[test]
    fn short_sessions_are_dropped_when_policy_says_so() {
        let mut harness = Harness::with_policy(SessionPolicy::with_min_seconds(10));
        harness.controller.start();
        harness.run_ticks(9);
        harness.controller.pause();

        assert!(harness.sink.records().is_empty());
        let notices = harness.notices.recent();
        assert_eq!(notices.last().unwrap().message, "Session too short to be saved");
        assert_eq!(harness.controller.state().status, TimerStatus::Paused);

        harness.controller.resume();
        harness.run_ticks(10);
        harness.controller.cancel();
        assert_eq!(harness.sink.records().len(), 1);
    }

    #[test]
    fn zero_minimum_keeps_every_session() {
        let mut harness = Harness::with_policy(SessionPolicy::with_min_seconds(0));
        harness.controller.start();
        harness.controller.cancel();
        let records = harness.sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration().num_seconds(), 0);
    }
}
