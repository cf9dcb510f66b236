//! Focus Buddy - A focus-session timer served over HTTP
//! 
//! This is the main entry point for the focus-buddy application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use focus_buddy::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{check_player_available, PlayerChannel},
    tasks::{spawn_session_driver, Action},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_buddy={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-buddy server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, work={}min, rest={}min, volume={}",
          config.host, config.port, config.work, config.rest, config.volume);

    // Ambient audio is optional; a missing player only means silence
    match &config.ambience {
        Some(path) => {
            if let Err(e) = check_player_available(&config.player).await {
                warn!("{}", e);
            }
            info!("Ambience source: {}", path.display());
        }
        None => warn!("No --ambience file given, ambient audio will stay silent"),
    }

    // Start the session driver background task
    let channel = PlayerChannel::new(config.player.clone(), config.ambience.clone());
    let (session, driver) = spawn_session_driver(channel, config.session_defaults());

    // Create application state
    let state = Arc::new(AppState::new(
        session,
        config.access_token.clone(),
        config.port,
        config.host.clone(),
    ));

    if !state.auth_required() {
        warn!("No access token configured, session endpoints are open to anyone");
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /session               - Current session snapshot");
    info!("  POST /session/start-pause   - Start or pause the countdown");
    info!("  POST /session/reset         - Refill the current phase");
    info!("  PUT  /session/work          - Set Work minutes");
    info!("  PUT  /session/rest          - Set Rest minutes");
    info!("  POST /session/audio/toggle  - Toggle ambient audio");
    info!("  PUT  /session/audio/volume  - Set ambient volume");
    info!("  POST /logout                - Discard the session");
    info!("  GET  /health                - Health check");

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

    // Leave the page: silence the ambience before exiting
    if let Err(e) = state.perform("shutdown", Action::Discard).await {
        warn!("Failed to discard session on shutdown: {}", e);
    }
    drop(state);
    driver.abort();

    info!("Server shutdown complete");
    Ok(())
}
