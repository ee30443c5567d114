use airmap_server::core::init_logger;
use airmap_server::{router, AppState, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let _log_guard = init_logger(config.log_dir.as_deref())?;

    let state = AppState::load(&config)?;
    let app = router(state, &config);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    log::info!("Server running on port {}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
