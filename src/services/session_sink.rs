//! Saves finished timer sessions to the tracker API

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error, info};

use super::api_client::{ApiClient, ClientError};
use crate::{
    state::{Notice, Notifier, SessionRecord, TimerMode},
    timer::SessionSink,
};

/// Posts each record on its own task; the outcome becomes a notice
pub struct ApiSessionSink {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    runtime: Handle,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl ApiSessionSink {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>, runtime: Handle) -> Self {
        Self {
            client,
            notifier,
            runtime,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every submission that is still running
    pub async fn drain(&self) {
        let pending: Vec<JoinHandle<()>> = match self.in_flight.lock() {
            Ok(mut in_flight) => in_flight.drain(..).collect(),
            Err(e) => {
                error!("Failed to lock in-flight submissions: {}", e);
                return;
            }
        };

        if !pending.is_empty() {
            info!("Waiting for {} session submission(s)", pending.len());
            join_all(pending).await;
        }
    }
}

impl SessionSink for ApiSessionSink {
    fn submit(&self, record: SessionRecord) {
        let client = self.client.clone();
        let notifier = Arc::clone(&self.notifier);

        let task = self.runtime.spawn(async move {
            debug!(
                "Saving {} session {} -> {}",
                record.kind, record.started_at, record.ended_at
            );
            match client.save_focus_session(&record).await {
                Ok(()) => notifier.notify(Notice::success(saved_message(record.kind))),
                Err(ClientError::Unauthenticated) => {
                    notifier.notify(Notice::failure("Sign in to save your sessions"))
                }
                Err(e) => {
                    error!("Failed to save {} session: {}", record.kind, e);
                    notifier.notify(Notice::failure(format!("Could not save session: {}", e)));
                }
            }
        });

        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.retain(|task| !task.is_finished());
            in_flight.push(task);
        }
    }
}

fn saved_message(kind: TimerMode) -> &'static str {
    match kind {
        TimerMode::Focus => "Focus time saved",
        TimerMode::Rest => "Rest time saved",
    }
}
