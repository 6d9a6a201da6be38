//! # mapposter - Map Poster Compositor
//!
//! mapposter turns a raster map into a framed-print poster. It provides:
//!
//! - **Shape masks**: rectangle, circle and heart crops with stroke borders
//! - **Captions**: up to three centred lines (text, name, date)
//! - **Composition**: bounds-checked layer stacking onto a fixed canvas
//! - **Print PDFs**: 300 ppi trim, 0.125 in bleed, sRGB-tagged single page
//! - **Services**: Mapbox map rasters and Gelato print orders over HTTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use image::DynamicImage;
//! use mapposter::{
//!     caption::{FontConfig, FontSet},
//!     compose::{self, PosterOptions},
//!     print::{self, PrintSize},
//!     shape::Shape,
//! };
//!
//! let fonts = Arc::new(FontSet::load(&FontConfig::default()));
//! let map = std::fs::read("map.png")?;
//!
//! let options = PosterOptions {
//!     text: "Our Day".into(),
//!     date: "June 1, 2024".into(),
//!     shape: Shape::Heart,
//!     ..Default::default()
//! };
//! let poster = compose::compose(&map, &options, fonts)?;
//! std::fs::write("poster.png", compose::encode_png(&poster)?)?;
//!
//! let pdf = print::to_print_pdf(&DynamicImage::ImageRgba8(poster), PrintSize::Size12x16)?;
//! std::fs::write("poster-12x16.pdf", pdf)?;
//!
//! # Ok::<(), mapposter::error::PosterError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`shape`] | Shape masks and borders |
//! | [`caption`] | Caption layout and rasterization |
//! | [`compose`] | Canvas geometry and layer composition |
//! | [`print`] | Print PDF assembly |
//! | [`services`] | Map provider, date formatting, fulfillment |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod caption;
pub mod compose;
pub mod error;
pub mod print;
pub mod server;
pub mod services;
pub mod shape;

// Re-exports for convenience
pub use compose::{PosterOptions, compose};
pub use error::PosterError;
pub use print::{PrintSize, to_print_pdf};
pub use shape::Shape;
