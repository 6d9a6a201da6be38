//! Poster generation endpoint.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use image::DynamicImage;
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::super::state::AppState;
use super::{JsonError, json_error, status_for};
use crate::compose::{self, PosterOptions};
use crate::error::PosterError;
use crate::print::{self, PrintSize};
use crate::services::{MapOptions, MapStyle, format_display_date};
use crate::shape::Shape;

/// Marker colour for the pinned location.
const MARKER_COLOR: &str = "ff0000";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PosterRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub text: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub style: Option<String>,
    pub zoom: Option<f64>,
    pub shape: Option<String>,
    pub format: Option<String>,
    pub size: Option<String>,
}

impl PosterRequest {
    fn wants_pdf(&self) -> bool {
        self.format.as_deref() == Some("pdf")
    }

    fn shape(&self) -> Shape {
        match self.shape.as_deref() {
            None | Some("") => Shape::default(),
            Some(s) => s.parse().unwrap_or_else(|e| {
                warn!("{}; using rectangle", e);
                Shape::default()
            }),
        }
    }
}

enum Rendered {
    Png(Vec<u8>),
    Pdf(Vec<u8>),
}

fn generation_error(err: PosterError) -> JsonError {
    warn!("Error generating poster: {}", err);
    (
        status_for(&err),
        Json(json!({
            "error": "Failed to generate poster",
            "message": err.to_string(),
            "kind": err.kind(),
        })),
    )
}

/// POST /api/poster - Compose a poster for a location.
///
/// Returns the preview as a PNG data URI, or the print PDF when
/// `format` is `"pdf"`.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PosterRequest>,
) -> Result<Response, JsonError> {
    let location = req.location.as_deref().map(str::trim).unwrap_or_default();
    if location.is_empty() {
        return Err(json_error(StatusCode::BAD_REQUEST, "Location is required"));
    }

    let print_size = if req.wants_pdf() {
        let size = req.size.as_deref().unwrap_or_default();
        Some(size.parse::<PrintSize>().map_err(|_| {
            json_error(
                StatusCode::BAD_REQUEST,
                format!(
                    "Valid size is required for PDF format. Supported sizes: {}",
                    PrintSize::supported()
                ),
            )
        })?)
    } else {
        None
    };

    let place = state.maps.geocode(location).await.map_err(generation_error)?;
    let map_options = MapOptions {
        style: req.style.as_deref().unwrap_or_default().parse().unwrap_or(MapStyle::Dark),
        zoom: req.zoom.unwrap_or(14.0),
        marker_color: MARKER_COLOR.to_string(),
        ..Default::default()
    };
    let map = state
        .maps
        .static_map(place.longitude, place.latitude, &map_options)
        .await
        .map_err(generation_error)?;

    let options = PosterOptions {
        title: req.title.clone().unwrap_or_default(),
        date: format_display_date(req.date.as_deref().unwrap_or_default()),
        text: req.text.clone().unwrap_or_default(),
        name: req.name.clone().unwrap_or_default(),
        location: place.place_name.clone(),
        shape: req.shape(),
        ..Default::default()
    };
    info!(
        "Poster for '{}': shape={}, date='{}', format={}",
        options.location,
        options.shape.name(),
        options.date,
        print_size.map(|s| s.as_str()).unwrap_or("png")
    );

    let fonts = state.fonts.clone();
    let map_bytes = map.bytes.clone();
    let render_options = options.clone();
    let rendered = tokio::task::spawn_blocking(move || -> Result<Rendered, PosterError> {
        let poster = compose::compose(&map_bytes, &render_options, fonts)?;
        Ok(match print_size {
            Some(size) => Rendered::Pdf(print::to_print_pdf(&DynamicImage::ImageRgba8(poster), size)?),
            None => Rendered::Png(compose::encode_png(&poster)?),
        })
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to generate poster", "message": format!("Task error: {}", e)})),
        )
    })?
    .map_err(generation_error)?;

    match rendered {
        Rendered::Pdf(pdf) => {
            let size = print_size.map(|s| s.as_str()).unwrap_or_default();
            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"poster-{}.pdf\"", size),
                    ),
                ],
                pdf,
            )
                .into_response())
        }
        Rendered::Png(png) => Ok(Json(json!({
            "success": true,
            "title": options.title,
            "text": options.text,
            "location": place.place_name,
            "coordinates": {
                "latitude": place.latitude,
                "longitude": place.longitude,
            },
            "mapImageUrl": map.url,
            "mapImageDataUrl": compose::data_uri(&map.content_type, &map.bytes),
            "posterDataUrl": compose::png_data_uri(&png),
        }))
        .into_response()),
    }
}
