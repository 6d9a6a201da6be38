//! # HTTP Server for Poster Previews and Orders
//!
//! JSON API over the compositor, the print PDF assembler and the
//! fulfillment client.
//!
//! ## Usage
//!
//! ```bash
//! MAPBOX_TOKEN=... GELATO_API_KEY=... mapposter serve --listen 0.0.0.0:8080
//! ```
//!
//! ## Routes
//!
//! | Method | Path          | Purpose                                    |
//! |--------|---------------|--------------------------------------------|
//! | POST   | `/api/poster` | Preview PNG (JSON) or print PDF            |
//! | POST   | `/api/orders` | Forward an order to the fulfillment API    |
//! | GET    | `/api/orders` | Look up an order by `orderId`              |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{Router, routing::post};
use log::info;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::PosterError;

/// Build the API router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/poster", post(handlers::poster::generate))
        .route(
            "/api/orders",
            post(handlers::orders::create).get(handlers::orders::get),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use mapposter::caption::FontConfig;
/// use mapposter::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), mapposter::error::PosterError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     mapbox_token: std::env::var("MAPBOX_TOKEN").unwrap_or_default(),
///     gelato_api_key: std::env::var("GELATO_API_KEY").unwrap_or_default(),
///     fonts: FontConfig::default(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), PosterError> {
    let listen_addr = config.listen_addr.clone();
    if config.mapbox_token.is_empty() {
        log::warn!("MAPBOX_TOKEN is not set; poster requests will fail");
    }
    let app = router(Arc::new(AppState::new(config)?));

    info!("mapposter HTTP server listening on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
