//! Workout Timer - A multi-mode interval timer served over local HTTP
//!
//! This is the main entry point for the workout-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use workout_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("workout_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting workout-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.tick_period()));

    if let Some(preset) = &config.preset {
        state.select_preset(preset)?;
        if config.autostart {
            state.start()?;
        }
    }

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /presets          - List timer presets");
    info!("  POST   /timer/preset/:id - Select a preset");
    info!("  POST   /timer/manual     - Select a mode by hand");
    info!("  POST   /timer/start      - Start the timer");
    info!("  POST   /timer/pause      - Pause or resume");
    info!("  POST   /timer/reset      - Reset to the initial state");
    info!("  POST   /timer/adjust     - Add or remove seconds");
    info!("  POST   /timer/split      - Log a stopwatch split");
    info!("  GET    /timer            - Current timer snapshot");
    info!("  DELETE /timer            - Discard the timer");
    info!("  GET    /timer/events     - Timer cues (SSE)");
    info!("  GET    /status           - Server status");
    info!("  GET    /health           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // dropping the session cancels any running tick task
    state.discard()?;
    info!("Server shutdown complete");
    Ok(())
}
