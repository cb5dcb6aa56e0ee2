//! Transient user-facing notices

use std::{collections::VecDeque, sync::Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// How many notices are kept for `/notices`
pub const NOTICE_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Failure,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Failure, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }
}

/// Receives human-readable outcomes. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices, keeps the most recent ones and broadcasts them
#[derive(Debug)]
pub struct NoticeBoard {
    recent: Mutex<VecDeque<Notice>>,
    tx: broadcast::Sender<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            recent: Mutex::new(VecDeque::with_capacity(NOTICE_CAPACITY)),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Most recent notices, oldest first
    pub fn recent(&self) -> Vec<Notice> {
        self.recent
            .lock()
            .map(|recent| recent.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Failure => warn!("Notice: {}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => info!("Notice: {}", notice.message),
        }

        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() == NOTICE_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(notice.clone());
        }

        // No subscribers is fine
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_notices() {
        let board = NoticeBoard::new();
        for i in 0..(NOTICE_CAPACITY + 5) {
            board.notify(Notice::info(format!("notice {}", i)));
        }

        let recent = board.recent();
        assert_eq!(recent.len(), NOTICE_CAPACITY);
        assert_eq!(recent[0].message, "notice 5");
        assert_eq!(recent.last().unwrap().message, format!("notice {}", NOTICE_CAPACITY + 4));
    }

    #[tokio::test]
    async fn subscribers_receive_notices() {
        let board = NoticeBoard::new();
        let mut rx = board.subscribe();

        board.notify(Notice::failure("Could not save focus session"));

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Failure);
        assert_eq!(notice.message, "Could not save focus session");
    }
}
