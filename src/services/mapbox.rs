//! Geocoding and static map rasters from Mapbox.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PosterError;

pub const MAPBOX_API: &str = "https://api.mapbox.com";

/// Predefined map styles. Any other style id is passed through as `Custom`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MapStyle {
    Streets,
    Outdoors,
    Light,
    #[default]
    Dark,
    Satellite,
    SatelliteStreets,
    NavigationDay,
    NavigationNight,
    Custom(String),
}

impl MapStyle {
    pub fn id(&self) -> &str {
        match self {
            MapStyle::Streets => "streets-v12",
            MapStyle::Outdoors => "outdoors-v12",
            MapStyle::Light => "light-v11",
            MapStyle::Dark => "dark-v11",
            MapStyle::Satellite => "satellite-v9",
            MapStyle::SatelliteStreets => "satellite-streets-v12",
            MapStyle::NavigationDay => "navigation-day-v1",
            MapStyle::NavigationNight => "navigation-night-v1",
            MapStyle::Custom(id) => id,
        }
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MapStyle {
    type Err = std::convert::Infallible;

    /// Accepts style ids (`dark-v11`) and short names (`dark`, `black_white`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.to_lowercase().replace('_', "-").as_str() {
            "" | "dark" | "dark-v11" | "monochrome" => MapStyle::Dark,
            "streets" | "streets-v12" => MapStyle::Streets,
            "outdoors" | "outdoors-v12" => MapStyle::Outdoors,
            "light" | "light-v11" | "black-white" => MapStyle::Light,
            "satellite" | "satellite-v9" => MapStyle::Satellite,
            "satellite-streets" | "satellite-streets-v12" => MapStyle::SatelliteStreets,
            "navigation-day" | "navigation-day-v1" => MapStyle::NavigationDay,
            "navigation-night" | "navigation-night-v1" => MapStyle::NavigationNight,
            _ => MapStyle::Custom(s.to_string()),
        })
    }
}

/// Static map request options.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub width: u32,
    pub height: u32,
    pub zoom: f64,
    pub style: MapStyle,
    pub show_marker: bool,
    /// Hex colour without `#`.
    pub marker_color: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            width: 400,
            height: 600,
            zoom: 14.0,
            style: MapStyle::Dark,
            show_marker: true,
            marker_color: "000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
}

/// A fetched map raster.
#[derive(Debug, Clone)]
pub struct MapImage {
    /// Request URL with the access token removed.
    pub url: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Source of map rasters for a location.
#[async_trait]
pub trait MapProvider: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<GeocodeResult, PosterError>;

    async fn static_map(&self, longitude: f64, latitude: f64, options: &MapOptions) -> Result<MapImage, PosterError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    center: [f64; 2],
    place_name: String,
}

/// Mapbox geocoding and Static Images API client.
pub struct MapboxClient {
    http: reqwest::Client,
    token: String,
    base: String,
}

impl MapboxClient {
    pub fn new(token: impl Into<String>) -> Result<Self, PosterError> {
        Self::with_base(token, MAPBOX_API)
    }

    pub fn with_base(token: impl Into<String>, base: impl Into<String>) -> Result<Self, PosterError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mapposter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PosterError::Upstream(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            http,
            token: token.into(),
            base: base.into().trim_end_matches('/').to_string(),
        })
    }

    fn ensure_token(&self) -> Result<(), PosterError> {
        if self.token.is_empty() {
            return Err(PosterError::Upstream("MAPBOX_TOKEN is not configured".into()));
        }
        Ok(())
    }

    /// Geocoding URL without the token.
    pub fn geocode_url(&self, location: &str) -> Result<Url, PosterError> {
        let mut url = parse_url(&format!("{}/geocoding/v5/mapbox.places", self.base))?;
        url.path_segments_mut()
            .map_err(|_| PosterError::Upstream(format!("cannot-be-a-base URL: {}", self.base)))?
            .push(&format!("{}.json", location));
        url.query_pairs_mut().append_pair("limit", "1");
        Ok(url)
    }

    /// Static image URL without the token.
    pub fn static_map_url(&self, longitude: f64, latitude: f64, options: &MapOptions) -> Result<Url, PosterError> {
        let marker = if options.show_marker {
            format!("pin-s+{}({},{})/", options.marker_color, longitude, latitude)
        } else {
            String::new()
        };
        parse_url(&format!(
            "{}/styles/v1/mapbox/{}/static/{}{},{},{}/{}x{}@2x",
            self.base,
            options.style.id().trim(),
            marker,
            longitude,
            latitude,
            options.zoom,
            options.width,
            options.height
        ))
    }

    fn authorized(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut().append_pair("access_token", &self.token);
        url
    }
}

fn parse_url(s: &str) -> Result<Url, PosterError> {
    Url::parse(s).map_err(|e| PosterError::Upstream(format!("invalid URL {}: {}", s, e)))
}

#[async_trait]
impl MapProvider for MapboxClient {
    async fn geocode(&self, location: &str) -> Result<GeocodeResult, PosterError> {
        self.ensure_token()?;
        let url = self.geocode_url(location)?;
        debug!("Geocoding '{}'", location);

        let response = self
            .http
            .get(self.authorized(&url))
            .send()
            .await
            .map_err(|e| PosterError::Upstream(format!("geocoding request failed: {}", e)))?;
        if !response.status().is_success() {
            warn!("Geocoding '{}' failed with {}", location, response.status());
            return Err(PosterError::Upstream("Failed to geocode location".into()));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| PosterError::Upstream(format!("invalid geocoding response: {}", e)))?;
        first_match(body)
    }

    async fn static_map(&self, longitude: f64, latitude: f64, options: &MapOptions) -> Result<MapImage, PosterError> {
        self.ensure_token()?;
        let url = self.static_map_url(longitude, latitude, options)?;
        debug!("Fetching static map {}", url);

        let response = self
            .http
            .get(self.authorized(&url))
            .send()
            .await
            .map_err(|e| PosterError::SourceImageUnavailable(format!("map request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(PosterError::SourceImageUnavailable(format!(
                "Failed to fetch map image: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PosterError::SourceImageUnavailable(format!("map download failed: {}", e)))?;

        Ok(MapImage {
            url: url.to_string(),
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

fn first_match(body: GeocodeResponse) -> Result<GeocodeResult, PosterError> {
    let feature = body.features.into_iter().next().ok_or(PosterError::LocationNotFound)?;
    let [longitude, latitude] = feature.center;
    Ok(GeocodeResult {
        latitude,
        longitude,
        place_name: feature.place_name,
    })
}
