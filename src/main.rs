//! Project Timer - per-project time tracking daemon
//!
//! This is the main entry point for the project-timer application.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};

use project_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::{display_ticker_task, idle_alarm_task, inactivity_poll_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("project_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting project-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, storage={}, poll={}s",
        config.host,
        config.port,
        config.storage_dir().display(),
        config.poll_interval
    );

    let state = Arc::new(AppState::open(&config));
    match state.init() {
        Ok(Some(outcome)) => info!("{}", outcome.message()),
        Ok(None) => {}
        Err(e) => error!("Failed to initialize tracker: {}", e),
    }

    // Background tasks
    tokio::spawn(idle_alarm_task(Arc::clone(&state)));
    tokio::spawn(display_ticker_task(Arc::clone(&state)));
    if config.poll_interval > 0 {
        tokio::spawn(inactivity_poll_task(
            Arc::clone(&state),
            Duration::from_secs(config.poll_interval),
        ));
    }

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start | /stop | /toggle | /reset");
    info!("  POST /history            - Write (and optionally open) the history page");
    info!("  POST /auto-start/toggle  - Flip auto start");
    info!("  POST /config/inactivity  - Set the inactivity timeout (minutes in body)");
    info!("  POST /activity           - Report user activity");
    info!("  POST /context            - Report the open project");
    info!("  GET  /status | /history | /health");

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

    if let Err(e) = state.shutdown() {
        error!("Failed to save tracked time on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
