//! Elite Tracker - local companion daemon for the habit and focus tracker
//!
//! This is the main entry point for the elite-tracker application.

use std::sync::Arc;
use tokio::{net::TcpListener, runtime::Handle, sync::mpsc};
use tracing::{error, info};

use elite_tracker::{
    api::create_router,
    config::Config,
    services::{ApiClient, ApiSessionSink, AuthSession},
    state::{AppState, NoticeBoard},
    tasks::tick_driver_task,
    timer::{TimerController, TokioClock},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("elite_tracker={},tower_http=info", config.log_level()))
        .init();

    let durations = config.durations();
    info!("Starting elite-tracker v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, api={}, focus={}min, rest={}min",
        config.host, config.port, config.api_url, durations.focus_minutes, durations.rest_minutes
    );

    // Restore the signed-in session and hand it to the API client
    let session = AuthSession::load(&config.session_file).await;
    let api = ApiClient::new(&config.api_url, session, config.request_timeout())?;

    let notices = Arc::new(NoticeBoard::new());
    let sink = Arc::new(ApiSessionSink::new(api.clone(), notices.clone(), Handle::current()));

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let clock = TokioClock::new(tick_tx, Handle::current());
    let controller = TimerController::new(
        durations,
        config.session_policy(),
        Box::new(clock),
        sink.clone(),
        notices.clone(),
    );

    let state = Arc::new(AppState::new(
        controller,
        api,
        notices,
        config.port,
        config.host.clone(),
    ));

    // Start the tick driver background task
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(tick_state, tick_rx).await;
    });

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start|pause|resume|cancel - Timer controls");
    info!("  POST /timer/mode/:mode                - Switch to focus or rest");
    info!("  POST /timer/durations                 - Adjust durations while idle");
    info!("  GET  /habits, /habits/:id/calendar    - Habits and monthly metrics");
    info!("  POST /auth/sign-in                    - Exchange an OAuth code");
    info!("  GET  /status                          - Current status");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Save whatever session is still open before exiting
    if let Err(e) = state.update_timer("shutdown", |timer| timer.cancel()) {
        error!("Failed to stop timer on shutdown: {}", e);
    }
    sink.drain().await;

    info!("Server shutdown complete");
    Ok(())
}
