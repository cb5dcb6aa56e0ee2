//! Elite Tracker - local companion daemon for the habit and focus tracker
//!
//! This library provides the focus/rest timer controller, the client for the
//! remote tracker API and the local HTTP surface that ties them together.

pub mod api;
pub mod config;
pub mod habits;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use timer::TimerController;
pub use utils::signals::shutdown_signal;
