pub mod api; // HTTP surface for the site widget
pub mod chat; // Scripted assistant: store, responder, widget
pub mod config;
pub mod confirmation; // Inquiry confirmation email
pub mod core_state; // Session registry shared by handlers
pub mod models;
pub mod prescreening; // Three-step participant form

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Server entry point: configure logging, serve the API until Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ServerConfig::from_env().map_err(|e| e.to_string())?;
    let bind_addr = config.bind_addr;
    let core = Arc::new(core_state::CoreState::new(config));

    let mut server = api::server::start_server_on(Arc::clone(&core), bind_addr).await?;
    tracing::info!(
        addr = %server.session.server_addr,
        "Serving chat widget API"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    Ok(())
}
