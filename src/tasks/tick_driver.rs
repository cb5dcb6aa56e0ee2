//! Tick driver background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::state::AppState;

/// Feeds clock ticks into the timer controller.
///
/// Ticks carry the generation of the subscription that produced them; the
/// controller drops any that no longer match.
pub async fn tick_driver_task(state: Arc<AppState>, mut ticks: mpsc::UnboundedReceiver<u64>) {
    info!("Starting tick driver task");

    while let Some(generation) = ticks.recv().await {
        match state.deliver_tick(generation) {
            Ok(true) => {
                if let Ok((timer, _)) = state.get_timer_state() {
                    info!("Phase complete, next up: {} ({}s)", timer.mode, timer.total_seconds);
                }
                state.record_action("complete");
            }
            Ok(false) => {}
            Err(e) => error!("Failed to deliver tick: {}", e),
        }
    }

    info!("Tick channel closed, tick driver stopping");
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use tokio::{runtime::Handle, sync::mpsc, time::sleep};

    use super::*;
    use crate::{
        services::{ApiClient, AuthSession},
        state::{DurationSettings, NoticeBoard, SessionRecord, TimerStatus},
        timer::{SessionPolicy, SessionSink, TimerController, TokioClock},
    };

    #[derive(Default)]
    struct CountingSink {
        records: Mutex<Vec<SessionRecord>>,
    }

    impl SessionSink for CountingSink {
        fn submit(&self, record: SessionRecord) {
            self.records.lock().unwrap().push(record);
        }
    }

    fn remaining(state: &AppState) -> u32 {
        state.get_timer_state().unwrap().0.remaining_seconds
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_flow_from_tokio_clock_into_the_controller() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(CountingSink::default());
        let notices = Arc::new(NoticeBoard::new());
        let controller = TimerController::new(
            DurationSettings::default(),
            SessionPolicy::default(),
            Box::new(TokioClock::new(tx, Handle::current())),
            sink.clone(),
            notices.clone(),
        );
        let api = ApiClient::new("http://127.0.0.1:9", AuthSession::in_memory(), Duration::from_secs(1)).unwrap();
        let state = Arc::new(AppState::new(controller, api, notices, 0, "127.0.0.1".to_string()));
        let total = state.get_timer_state().unwrap().0.total_seconds;

        tokio::spawn(tick_driver_task(state.clone(), rx));

        state.update_timer("start", |timer| timer.start()).unwrap();
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(remaining(&state), total - 3);

        let (applied, timer, _) = state.update_timer("pause", |timer| timer.pause()).unwrap();
        assert!(applied);
        assert_eq!(timer.status, TimerStatus::Paused);

        // Nothing lands while paused
        sleep(Duration::from_secs(10)).await;
        assert_eq!(remaining(&state), total - 3);

        state.update_timer("resume", |timer| timer.resume()).unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(remaining(&state), total - 5);

        // Re-arming by switching mode drops the old subscription
        state
            .update_timer("switch-mode", |timer| timer.switch_mode(crate::state::TimerMode::Rest))
            .unwrap();
        let rest_total = state.get_timer_state().unwrap().0.total_seconds;
        sleep(Duration::from_millis(4500)).await;
        assert_eq!(remaining(&state), rest_total - 4);

        assert_eq!(sink.records.lock().unwrap().len(), 2);
    }
}
