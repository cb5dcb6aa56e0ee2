//! External service access
//!
//! The remote tracker API client, the authenticated session it carries and
//! the sink that saves finished timer sessions through it.

pub mod api_client;
pub mod auth;
pub mod session_sink;

// Re-export main types
pub use api_client::{ApiClient, ClientError};
pub use auth::{ApiUser, AuthSession, UserData};
pub use session_sink::ApiSessionSink;
