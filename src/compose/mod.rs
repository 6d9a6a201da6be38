//! # Canvas Compositor
//!
//! Builds the preview poster: background fill, the cover-fitted map inside
//! the padded map box (masked to the chosen shape), the shape border on top,
//! and the caption in the text region below.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mapposter::caption::FontSet;
//! use mapposter::compose::{PosterOptions, compose, encode_png};
//! use mapposter::shape::Shape;
//!
//! let map = std::fs::read("map.png").unwrap();
//! let options = PosterOptions {
//!     text: "Our Day".into(),
//!     date: "June 1, 2024".into(),
//!     shape: Shape::Heart,
//!     ..Default::default()
//! };
//! let poster = compose(&map, &options, Arc::new(FontSet::fallback())).unwrap();
//! let png = encode_png(&poster).unwrap();
//! ```

pub mod canvas;
pub mod color;
pub mod composite;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use log::warn;
use std::io::Cursor;
use std::sync::Arc;

use crate::caption::{CaptionBlock, FontSet, render_caption};
use crate::error::PosterError;
use crate::shape::{self, Shape};
pub use canvas::{Canvas, PlacementBox};
pub use color::{color_or, parse_hex_color};
pub use composite::{Composite, CompositeBuilder, CompositeItem, LayerKind, Verdict};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 1200;

/// Everything needed to lay out one poster besides the map raster.
#[derive(Debug, Clone, PartialEq)]
pub struct PosterOptions {
    pub title: String,
    pub date: String,
    pub text: String,
    pub name: String,
    /// Shown alongside the preview; not drawn on the poster.
    pub location: String,
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub text_color: String,
    pub shape: Shape,
}

impl Default for PosterOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            text: String::new(),
            name: String::new(),
            location: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background_color: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            shape: Shape::default(),
        }
    }
}

impl PosterOptions {
    pub fn caption(&self) -> CaptionBlock {
        CaptionBlock::new(self.text.clone(), self.name.clone(), self.date.clone())
    }
}

/// Decode the map and compose the flattened poster.
pub fn compose(
    map_bytes: &[u8],
    options: &PosterOptions,
    fonts: Arc<FontSet>,
) -> Result<RgbaImage, PosterError> {
    let map = decode_map(map_bytes)?;
    Ok(assemble(&map, options, fonts)?.flatten())
}

pub fn decode_map(bytes: &[u8]) -> Result<DynamicImage, PosterError> {
    if bytes.is_empty() {
        return Err(PosterError::SourceImageUnavailable("empty map image".into()));
    }
    image::load_from_memory(bytes).map_err(|e| PosterError::SourceImageUnavailable(e.to_string()))
}

/// Build the validated layer list for a poster without flattening it.
pub fn assemble(
    map: &DynamicImage,
    options: &PosterOptions,
    fonts: Arc<FontSet>,
) -> Result<Composite, PosterError> {
    let background = color_or(&options.background_color, color::WHITE);
    let text_color = color_or(&options.text_color, color::BLACK);
    let canvas = Canvas::new(options.width, options.height, background)?;

    if map.width() == 0 || map.height() == 0 {
        return Err(PosterError::SourceImageUnavailable("map image has no pixels".into()));
    }

    let mut builder = CompositeBuilder::new(canvas);
    let map_box = canvas.map_box();
    if map_box.width == 0 || map_box.height == 0 {
        warn!(
            "Map box is {}x{} on a {}x{} canvas; rendering without the map",
            map_box.width, map_box.height, canvas.width, canvas.height
        );
    } else {
        let mut placed = map
            .resize_to_fill(map_box.width, map_box.height, FilterType::Lanczos3)
            .to_rgba8();
        if options.shape.clips() {
            let mask = shape::mask(map_box.width, map_box.height, options.shape)?;
            for (px, m) in placed.pixels_mut().zip(mask.pixels()) {
                px.0[3] = ((px.0[3] as u16 * m.0[0] as u16 + 127) / 255) as u8;
            }
        }
        let border = shape::border(map_box.width, map_box.height, options.shape)?;

        builder = builder
            .push(CompositeItem::new(LayerKind::Map, placed, map_box.left as i64, map_box.top as i64))
            .push(CompositeItem::new(LayerKind::Border, border, map_box.left as i64, map_box.top as i64));
    }

    let text_box = canvas.text_box();
    let caption = render_caption(text_box.width, text_box.height, &options.caption().lines(), fonts)?;
    if !caption.is_empty() {
        builder = builder.push(CompositeItem::new(
            LayerKind::Caption,
            caption.rasterize(text_color),
            text_box.left as i64,
            text_box.top as i64,
        ));
    }

    builder.build()
}

/// Lossless PNG encoding of a composed poster.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, PosterError> {
    let mut png_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| PosterError::Encode(format!("PNG encoding failed: {}", e)))?;
    Ok(png_bytes)
}

/// `data:` URI for PNG bytes.
pub fn png_data_uri(png: &[u8]) -> String {
    data_uri("image/png", png)
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn map_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        }))
    }

    fn fonts() -> Arc<FontSet> {
        Arc::new(FontSet::fallback())
    }

    #[test]
    fn test_default_options() {
        let options = PosterOptions::default();
        assert_eq!((options.width, options.height), (800, 1200));
        assert_eq!(options.shape, Shape::Rectangle);
    }

    #[test]
    fn test_map_placed_in_box() {
        let options = PosterOptions::default();
        let composite = assemble(&map_image(400, 600), &options, fonts()).unwrap();
        let map = composite.layer(LayerKind::Map).unwrap();
        assert_eq!((map.left, map.top), (40, 45));
        assert_eq!(map.image.dimensions(), (720, 810));
    }

    #[test]
    fn test_caption_skipped_when_empty() {
        let composite = assemble(&map_image(10, 10), &PosterOptions::default(), fonts()).unwrap();
        assert!(composite.layer(LayerKind::Caption).is_none());
        assert!(composite.layer(LayerKind::Border).is_some());
    }

    #[test]
    fn test_circle_clips_corners() {
        let options = PosterOptions {
            shape: Shape::Circle,
            ..Default::default()
        };
        let composite = assemble(&map_image(50, 50), &options, fonts()).unwrap();
        let map = &composite.layer(LayerKind::Map).unwrap().image;
        assert_eq!(map.get_pixel(0, 0).0[3], 0);
        let (w, h) = map.dimensions();
        assert_eq!(map.get_pixel(w / 2, h / 2).0[3], 255);
    }

    #[test]
    fn test_undecodable_map() {
        let err = compose(b"not an image", &PosterOptions::default(), fonts()).unwrap_err();
        assert_eq!(err.kind(), "SourceImageUnavailable");
        let err = compose(&[], &PosterOptions::default(), fonts()).unwrap_err();
        assert_eq!(err.kind(), "SourceImageUnavailable");
    }

    #[test]
    fn test_png_data_uri() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(png_data_uri(&png).starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_tiny_canvas_renders_without_map() {
        let options = PosterOptions {
            width: 800,
            height: 1,
            text: "Our Day".into(),
            ..Default::default()
        };
        let composite = assemble(&map_image(40, 60), &options, fonts()).unwrap();
        assert!(composite.layer(LayerKind::Map).is_none());
        assert!(composite.layer(LayerKind::Border).is_none());
        assert_eq!(composite.flatten().dimensions(), (800, 1));

        // Two rows already leave a one-pixel map box
        let options = PosterOptions { height: 2, ..options };
        let composite = assemble(&map_image(40, 60), &options, fonts()).unwrap();
        assert_eq!(composite.layer(LayerKind::Map).unwrap().image.dimensions(), (720, 1));
    }
}
