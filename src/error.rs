//! # Error Types
//!
//! This module defines the error type used throughout the mapposter library.
//!
//! Every variant carries a stable machine-readable [`kind`](PosterError::kind)
//! so HTTP callers can branch on the failure without parsing messages.

use thiserror::Error;

/// Main error type for poster operations
#[derive(Debug, Error)]
pub enum PosterError {
    /// A geometry generator was asked for a zero-sized image
    #[error("Invalid dimension: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// The map raster could not be fetched or decoded
    #[error("Source image unavailable: {0}")]
    SourceImageUnavailable(String),

    /// Requested print size is not one of the supported trim sizes
    #[error("Unsupported poster size: {requested}. Supported sizes: {supported}")]
    UnsupportedSize { requested: String, supported: String },

    /// Content still exceeds its target box after the corrective rescale
    #[error("Composition overflow: {0}")]
    CompositionOverflow(String),

    /// Font data could not be loaded; rendering falls back to the bitmap face
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    /// Geocoding returned no match for the location
    #[error("Location not found")]
    LocationNotFound,

    /// An external service (map provider, fulfillment API) failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The fulfillment API answered with a non-success status
    #[error("Fulfillment request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        details: serde_json::Value,
    },

    /// Image or document encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PosterError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PosterError::InvalidDimension { .. } => "InvalidDimension",
            PosterError::SourceImageUnavailable(_) => "SourceImageUnavailable",
            PosterError::UnsupportedSize { .. } => "UnsupportedSize",
            PosterError::CompositionOverflow(_) => "CompositionOverflow",
            PosterError::FontUnavailable(_) => "FontUnavailable",
            PosterError::LocationNotFound => "LocationNotFound",
            PosterError::Upstream(_) => "Upstream",
            PosterError::Rejected { .. } => "Rejected",
            PosterError::Encode(_) => "Encode",
            PosterError::Io(_) => "Io",
        }
    }

    /// True when the caller sent something we cannot serve (4xx territory).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PosterError::InvalidDimension { .. }
                | PosterError::UnsupportedSize { .. }
                | PosterError::LocationNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        let err = PosterError::UnsupportedSize {
            requested: "11x14".into(),
            supported: "8x10".into(),
        };
        assert_eq!(err.kind(), "UnsupportedSize");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_overflow_is_server_error() {
        let err = PosterError::CompositionOverflow("too big".into());
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Composition overflow: too big");
    }
}
