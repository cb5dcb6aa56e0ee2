//! Clock collaborators: current time plus the single one-second tick subscription

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{
    runtime::Handle,
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

/// Source of time and of the repeating tick that drives the countdown.
///
/// At most one subscription is live: `arm` replaces any previous one and
/// tags every tick it produces with `generation`.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;

    fn arm(&mut self, generation: u64);

    fn disarm(&mut self);
}

/// Wall clock backed by a tokio interval task
pub struct TokioClock {
    ticks: mpsc::UnboundedSender<u64>,
    runtime: Handle,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl TokioClock {
    /// Ticks are delivered on `ticks` once per second
    pub fn new(ticks: mpsc::UnboundedSender<u64>, runtime: Handle) -> Self {
        Self::with_period(ticks, runtime, Duration::from_secs(1))
    }

    pub fn with_period(ticks: mpsc::UnboundedSender<u64>, runtime: Handle, period: Duration) -> Self {
        Self {
            ticks,
            runtime,
            period,
            task: None,
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn arm(&mut self, generation: u64) {
        self.disarm();

        let ticks = self.ticks.clone();
        let period = self.period;
        debug!("Arming tick subscription (generation {})", generation);
        self.task = Some(self.runtime.spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                if ticks.send(generation).is_err() {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Disarming tick subscription");
            task.abort();
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Deterministic clock whose time only moves when told to.
///
/// Clones share the same time and subscription, so a test can keep a
/// handle while the controller owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    armed: Arc<Mutex<Option<u64>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            armed: Arc::new(Mutex::new(None)),
        }
    }

    pub fn advance(&self, seconds: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now += chrono::Duration::seconds(seconds);
        }
    }

    /// Generation of the live subscription, if any
    pub fn armed_generation(&self) -> Option<u64> {
        self.armed.lock().ok().and_then(|armed| *armed)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }

    fn arm(&mut self, generation: u64) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = Some(generation);
        }
    }

    fn disarm(&mut self) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = None;
        }
    }
}
