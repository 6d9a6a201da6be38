//! # Print PDF Assembler
//!
//! Converts a composed poster into a single-page, press-ready PDF:
//!
//! - trim size at 300 pixels per inch for one of the supported [`PrintSize`]s
//! - 0.125 in of white bleed on every side
//! - transparency flattened against white, RGB, tagged sRGB
//! - the poster contain-fitted and centred inside the trim box
//!
//! ## Geometry
//!
//! ```text
//! ┌───────────── canvas (trim + 75 px) ───────────────┐
//! │  ┌──────────────── trim box ──────────────────┐   │
//! │  │        margin (only on the short axis)     │   │
//! │  │  ┌──────────────────────────────────────┐  │   │
//! │  │  │            fitted poster             │  │   │
//! │  │  └──────────────────────────────────────┘  │   │
//! │  └────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────┘
//! ```

pub mod pdf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PosterError;
pub use pdf::{DocumentInfo, PageBoxes};

/// Output resolution in pixels per inch.
pub const DPI: u32 = 300;

/// Bleed added to each side, in inches.
pub const BLEED_INCHES: f64 = 0.125;

pub const POINTS_PER_INCH: f64 = 72.0;

/// Supported trim sizes (inches, portrait).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrintSize {
    #[serde(rename = "8x10")]
    Size8x10,
    #[serde(rename = "12x16")]
    Size12x16,
    #[serde(rename = "16x20")]
    Size16x20,
    #[serde(rename = "18x24")]
    Size18x24,
    #[serde(rename = "24x36")]
    Size24x36,
}

impl PrintSize {
    pub const ALL: [PrintSize; 5] = [
        PrintSize::Size8x10,
        PrintSize::Size12x16,
        PrintSize::Size16x20,
        PrintSize::Size18x24,
        PrintSize::Size24x36,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrintSize::Size8x10 => "8x10",
            PrintSize::Size12x16 => "12x16",
            PrintSize::Size16x20 => "16x20",
            PrintSize::Size18x24 => "18x24",
            PrintSize::Size24x36 => "24x36",
        }
    }

    /// Trim (width, height) in inches.
    pub fn trim_inches(self) -> (u32, u32) {
        match self {
            PrintSize::Size8x10 => (8, 10),
            PrintSize::Size12x16 => (12, 16),
            PrintSize::Size16x20 => (16, 20),
            PrintSize::Size18x24 => (18, 24),
            PrintSize::Size24x36 => (24, 36),
        }
    }

    /// Comma-separated list for error messages.
    pub fn supported() -> String {
        Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    }

    pub fn spec(self) -> PrintSpec {
        let (w, h) = self.trim_inches();
        PrintSpec {
            trim_width_in: w as f64,
            trim_height_in: h as f64,
            dpi: DPI,
            bleed_in: BLEED_INCHES,
        }
    }
}

impl fmt::Display for PrintSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintSize {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == wanted)
            .ok_or_else(|| PosterError::UnsupportedSize {
                requested: s.to_string(),
                supported: Self::supported(),
            })
    }
}

/// Trim, resolution and bleed for one print.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintSpec {
    pub trim_width_in: f64,
    pub trim_height_in: f64,
    pub dpi: u32,
    pub bleed_in: f64,
}

impl PrintSpec {
    pub fn trim_pixels(&self) -> (u32, u32) {
        (
            (self.trim_width_in * self.dpi as f64).round() as u32,
            (self.trim_height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Bleed across both sides of an axis. Rounded once so the canvas stays
    /// at exactly `dpi` over the page.
    pub fn total_bleed_pixels(&self) -> u32 {
        (2.0 * self.bleed_in * self.dpi as f64).round() as u32
    }

    /// Offset of the trim box from the canvas top-left corner.
    pub fn bleed_offset(&self) -> u32 {
        (self.bleed_in * self.dpi as f64).round() as u32
    }

    pub fn canvas_pixels(&self) -> (u32, u32) {
        let (tw, th) = self.trim_pixels();
        let bleed = self.total_bleed_pixels();
        (tw + bleed, th + bleed)
    }

    /// Page boxes in points, computed from inches so they are exact.
    pub fn page_boxes(&self) -> PageBoxes {
        PageBoxes {
            media_width: (self.trim_width_in + 2.0 * self.bleed_in) * POINTS_PER_INCH,
            media_height: (self.trim_height_in + 2.0 * self.bleed_in) * POINTS_PER_INCH,
            bleed: self.bleed_in * POINTS_PER_INCH,
        }
    }
}

/// Where the fitted poster lands, in trim-box pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub left: u32,
    pub top: u32,
}

/// Contain-fit a `src_w` × `src_h` raster into the trim box and centre it.
///
/// One corrective down-scale is allowed if rounding overshoots the trim box;
/// anything still too large is a `CompositionOverflow`.
pub fn place(src_w: u32, src_h: u32, trim_w: u32, trim_h: u32) -> Result<Placement, PosterError> {
    if src_w == 0 || src_h == 0 {
        return Err(PosterError::InvalidDimension {
            width: src_w,
            height: src_h,
        });
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let trim_aspect = trim_w as f64 / trim_h as f64;

    let (mut width, mut height) = if src_aspect > trim_aspect {
        (trim_w, (trim_w as f64 / src_aspect).round() as u32)
    } else {
        ((trim_h as f64 * src_aspect).round() as u32, trim_h)
    };

    if width > trim_w || height > trim_h {
        let scale = (trim_w as f64 / width as f64).min(trim_h as f64 / height as f64);
        debug!("Corrective rescale by {:.6} for {}x{}", scale, width, height);
        width = (width as f64 * scale).floor() as u32;
        height = (height as f64 * scale).floor() as u32;
        if width > trim_w || height > trim_h {
            return Err(PosterError::CompositionOverflow(format!(
                "{}x{} still exceeds {}x{} trim after rescale",
                width, height, trim_w, trim_h
            )));
        }
    }

    let width = width.max(1);
    let height = height.max(1);
    Ok(Placement {
        width,
        height,
        left: (trim_w - width).div_ceil(2),
        top: (trim_h - height).div_ceil(2),
    })
}

/// Composite over opaque white and drop alpha.
pub fn flatten_to_rgb(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let a = a as u32;
        let over = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// Build the print canvas: white, trim + bleed, poster centred in the trim box.
pub fn print_canvas(poster: &DynamicImage, spec: &PrintSpec) -> Result<RgbImage, PosterError> {
    let flat = flatten_to_rgb(&poster.to_rgba8());
    let (trim_w, trim_h) = spec.trim_pixels();
    let (canvas_w, canvas_h) = spec.canvas_pixels();
    let bleed = spec.bleed_offset();

    let placement = place(flat.width(), flat.height(), trim_w, trim_h)?;
    let left = bleed + placement.left;
    let top = bleed + placement.top;
    if left + placement.width > canvas_w || top + placement.height > canvas_h {
        return Err(PosterError::CompositionOverflow(format!(
            "image {}x{} at ({}, {}) exceeds canvas {}x{}",
            placement.width, placement.height, left, top, canvas_w, canvas_h
        )));
    }

    let fitted = if flat.dimensions() == (placement.width, placement.height) {
        flat
    } else {
        imageops::resize(&flat, placement.width, placement.height, FilterType::CatmullRom)
    };

    let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, Rgb([255, 255, 255]));
    imageops::replace(&mut canvas, &fitted, left as i64, top as i64);
    Ok(canvas)
}

/// Render a poster as a print-ready PDF for `size`.
pub fn to_print_pdf(poster: &DynamicImage, size: PrintSize) -> Result<Vec<u8>, PosterError> {
    let spec = size.spec();
    let canvas = print_canvas(poster, &spec)?;
    let boxes = spec.page_boxes();
    let pdf = pdf::write_image_page(&canvas, boxes, &DocumentInfo::default())?;

    info!(
        "Print PDF {}: canvas {}x{} px, page {}x{} pt, {} bytes",
        size,
        canvas.width(),
        canvas.height(),
        boxes.media_width,
        boxes.media_height,
        pdf.len()
    );
    Ok(pdf)
}

/// Parse the size first, then decode the poster bytes and render.
pub fn print_pdf_from_bytes(poster: &[u8], size: &str) -> Result<Vec<u8>, PosterError> {
    let size: PrintSize = size.parse()?;
    let img = image::load_from_memory(poster).map_err(|e| PosterError::SourceImageUnavailable(e.to_string()))?;
    to_print_pdf(&img, size)
}
