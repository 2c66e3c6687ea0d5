//! # HTTP API for Label Layouts
//!
//! JSON endpoints over the layout repository, the renderer and the logo
//! store, for an editor front end.
//!
//! ## Usage
//!
//! ```bash
//! etiket serve --listen 0.0.0.0:8080 --data-file data/layouts.json
//! ```
//!
//! The owner scope is picked with the `user` query parameter; without it a
//! request acts on the tenant-wide layouts.

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::{EtiketError, Result};

/// Largest accepted logo upload.
const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

/// Build the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.asset_dir);

    Router::new()
        .route("/api/health", get(handlers::health))
        // Layouts
        .route(
            "/api/layouts",
            get(handlers::layouts::list).post(handlers::layouts::create),
        )
        .route("/api/layouts/defaults", get(handlers::layouts::defaults))
        .route(
            "/api/layouts/:id",
            get(handlers::layouts::get)
                .put(handlers::layouts::update)
                .delete(handlers::layouts::delete),
        )
        .route(
            "/api/layouts/:id/default",
            post(handlers::layouts::set_default),
        )
        // Preview
        .route("/api/preview", post(handlers::preview::render))
        // Logo upload
        .route(
            "/api/logos",
            post(handlers::logos::upload).layer(DefaultBodyLimit::max(MAX_LOGO_BYTES)),
        )
        .nest_service("/assets", assets)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use etiket::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), etiket::EtiketError> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::open(config.clone()).await?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            EtiketError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        data_file = %config.data_file.display(),
        asset_dir = %config.asset_dir.display(),
        "etiket HTTP server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| EtiketError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
