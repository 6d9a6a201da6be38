//! Server state and configuration.

use std::sync::Arc;

use crate::caption::{FontConfig, FontSet};
use crate::error::PosterError;
use crate::services::{Fulfillment, GelatoClient, MapProvider, MapboxClient};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Mapbox access token for geocoding and static maps
    pub mapbox_token: String,
    /// Fulfillment API key sent as `X-API-KEY`
    pub gelato_api_key: String,
    /// Candidate caption font files
    pub fonts: FontConfig,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Caption faces, resolved once at startup.
    pub fonts: Arc<FontSet>,
    pub maps: Arc<dyn MapProvider>,
    pub fulfillment: Arc<dyn Fulfillment>,
}

impl AppState {
    /// Resolve fonts and build the real HTTP clients.
    pub fn new(config: ServerConfig) -> Result<Self, PosterError> {
        let fonts = Arc::new(FontSet::load(&config.fonts));
        let maps = Arc::new(MapboxClient::new(config.mapbox_token.clone())?);
        let fulfillment = Arc::new(GelatoClient::new(config.gelato_api_key.clone())?);
        Ok(Self::with_services(config, fonts, maps, fulfillment))
    }

    pub fn with_services(
        config: ServerConfig,
        fonts: Arc<FontSet>,
        maps: Arc<dyn MapProvider>,
        fulfillment: Arc<dyn Fulfillment>,
    ) -> Self {
        Self {
            config,
            fonts,
            maps,
            fulfillment,
        }
    }
}
