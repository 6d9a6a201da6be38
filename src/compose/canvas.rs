//! Canvas geometry: map region, text region, and the padded map box.
//!
//! ```text
//! ┌──────────────────────────┐  ─┬─
//! │  ┌────────────────────┐  │   │ v_pad
//! │  │                    │  │   │
//! │  │     map box        │  │   │ map region
//! │  │                    │  │   │ floor(0.75 h)
//! │  └────────────────────┘  │   │
//! │                          │  ─┴─
//! │        caption           │     text region
//! └──────────────────────────┘     h - map region
//! ```

use image::Rgba;

use crate::error::PosterError;

/// Share of the canvas height given to the map region.
pub const MAP_REGION_FRACTION: f64 = 0.75;

/// Padding around the map box, as a fraction of the region on each side.
pub const MAP_PADDING_FRACTION: f64 = 0.05;

/// A pixel rectangle placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PlacementBox {
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Poster canvas dimensions and fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Result<Self, PosterError> {
        if width == 0 || height == 0 {
            return Err(PosterError::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            background,
        })
    }

    /// Height of the map region (top of the canvas).
    pub fn map_region_height(&self) -> u32 {
        (self.height as f64 * MAP_REGION_FRACTION).floor() as u32
    }

    /// Height of the text region; takes the rounding remainder.
    pub fn text_region_height(&self) -> u32 {
        self.height - self.map_region_height()
    }

    /// The padded box the map is placed in.
    pub fn map_box(&self) -> PlacementBox {
        let region = self.map_region_height();
        let h_pad = (self.width as f64 * MAP_PADDING_FRACTION).floor() as u32;
        let v_pad = (region as f64 * MAP_PADDING_FRACTION).floor() as u32;

        PlacementBox {
            left: h_pad,
            top: v_pad,
            width: self.width.saturating_sub(2 * h_pad),
            height: region.saturating_sub(2 * v_pad),
        }
    }

    /// The text region as a box.
    pub fn text_box(&self) -> PlacementBox {
        PlacementBox {
            left: 0,
            top: self.map_region_height(),
            width: self.width,
            height: self.text_region_height(),
        }
    }
}
