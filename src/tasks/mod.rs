//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod tick_driver;

// Re-export main functions
pub use tick_driver::tick_driver_task;
