//! State management module
//!
//! Timer data types, the notice board and the shared application state.

pub mod app_state;
pub mod notice_board;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use notice_board::{Notice, NoticeBoard, NoticeLevel, Notifier};
pub use timer_state::{DurationSettings, SessionRecord, TimerMode, TimerState, TimerStatus};
