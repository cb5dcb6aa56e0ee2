//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{state::DurationSettings, timer::SessionPolicy};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "elite-tracker")]
#[command(about = "Local companion daemon for the elite tracker: focus timer and habits")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, env = "ELITE_PORT", default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "ELITE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the tracker API
    #[arg(long, env = "ELITE_API_URL", default_value = "http://localhost:3333")]
    pub api_url: String,

    /// Where the signed-in session is kept
    #[arg(long, env = "ELITE_SESSION_FILE", default_value = "data/session.json")]
    pub session_file: PathBuf,

    /// Focus length in minutes (5-120, in steps of 5)
    #[arg(long, env = "ELITE_FOCUS_MINUTES", default_value = "25")]
    pub focus_minutes: u32,

    /// Rest length in minutes (5-30, in steps of 5)
    #[arg(long, env = "ELITE_REST_MINUTES", default_value = "5")]
    pub rest_minutes: u32,

    /// Sessions shorter than this many seconds are not saved (0 keeps all)
    #[arg(long, env = "ELITE_MIN_SESSION_SECS", default_value = "0")]
    pub min_session_secs: u64,

    /// Timeout for calls to the tracker API, in seconds
    #[arg(long, env = "ELITE_REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments and environment
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Configured durations, snapped to 5 minutes and clamped into their bounds
    pub fn durations(&self) -> DurationSettings {
        DurationSettings::new(self.focus_minutes, self.rest_minutes)
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy::with_min_seconds(self.min_session_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
