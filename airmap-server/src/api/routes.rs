//! Route table and middleware.

use airmap::provider::http::GENERATE_PATH;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::error::panic_response;
use crate::api::handlers;
use crate::core::config::ServerConfig;
use crate::core::state::AppState;

/// Builds the application router.
///
/// In production, paths that match no route are served from the client
/// bundle, and unknown files fall back to its `index.html`.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let mut routes = Router::new()
        .route(GENERATE_PATH, post(handlers::generate_maps))
        .route("/health", get(handlers::health));

    if config.production {
        log::info!("Serving client bundle from {}", config.static_dir.display());
        let index = ServeFile::new(config.static_dir.join("index.html"));
        routes = routes.fallback_service(ServeDir::new(&config.static_dir).fallback(index));
    }

    routes
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}
