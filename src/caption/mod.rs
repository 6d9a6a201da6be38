//! # Text Layer Renderer
//!
//! Lays out the poster caption (free text, name, date) into a [`CaptionLayer`]:
//! a list of positioned text elements plus the faces needed to draw them. The
//! layer is rasterized on demand to exactly the size of the text region.
//!
//! ## Layout
//!
//! ```text
//! y =  80  ── free text (36px regular) ──
//! y = 130  ──   name    (36px bold)    ──
//! y = 180  ──   date    (20px regular) ──
//! ```
//!
//! Lines with empty or whitespace-only text are skipped and the lines after
//! them move up; there is never a blank gap where a line would have been.

mod face;
pub mod fonts;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::PosterError;
pub use face::{LineRender, render_line};
pub use fonts::{Face, FontConfig, FontSet};

/// Vertical centre of the first rendered line, in pixels from the region top.
pub const FIRST_LINE_OFFSET: f32 = 80.0;

/// Advance between consecutive rendered lines.
pub const LINE_HEIGHT: f32 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// One caption line request.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub text: String,
    pub weight: FontWeight,
    /// Pixel height of the line.
    pub size: f32,
}

impl CaptionLine {
    pub fn new(text: impl Into<String>, weight: FontWeight, size: f32) -> Self {
        Self {
            text: text.into(),
            weight,
            size,
        }
    }

    /// True if the line produces no text element.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The three caption fields in their fixed drawing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionBlock {
    pub text: String,
    pub name: String,
    pub date: String,
}

impl CaptionBlock {
    pub fn new(text: impl Into<String>, name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: name.into(),
            date: date.into(),
        }
    }

    /// All three lines with their default styles, blank ones included.
    pub fn lines(&self) -> Vec<CaptionLine> {
        vec![
            CaptionLine::new(self.text.clone(), FontWeight::Regular, 36.0),
            CaptionLine::new(self.name.clone(), FontWeight::Bold, 36.0),
            CaptionLine::new(self.date.clone(), FontWeight::Regular, 20.0),
        ]
    }
}

/// A laid-out line: text centred on (`x`, `y`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub weight: FontWeight,
    pub size: f32,
    pub x: f32,
    pub y: f32,
}

/// Laid-out caption with the faces it draws with.
#[derive(Debug, Clone)]
pub struct CaptionLayer {
    width: u32,
    height: u32,
    elements: Vec<TextElement>,
    fonts: Arc<FontSet>,
}

/// Lay out caption lines in a `width` × `height` box.
pub fn render_caption(
    width: u32,
    height: u32,
    lines: &[CaptionLine],
    fonts: Arc<FontSet>,
) -> Result<CaptionLayer, PosterError> {
    if width == 0 || height == 0 {
        return Err(PosterError::InvalidDimension { width, height });
    }

    let centre_x = width as f32 / 2.0;
    let mut y = FIRST_LINE_OFFSET;
    let mut elements = Vec::new();

    for line in lines.iter().filter(|l| !l.is_blank()) {
        elements.push(TextElement {
            text: line.text.trim().to_string(),
            weight: line.weight,
            size: line.size,
            x: centre_x,
            y,
        });
        y += LINE_HEIGHT;
    }

    Ok(CaptionLayer {
        width,
        height,
        elements,
        fonts,
    })
}

impl CaptionLayer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Rasterize onto a transparent image of exactly the layer size.
    ///
    /// Text that runs past the edges is clipped.
    pub fn rasterize(&self, color: Rgba<u8>) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        let [r, g, b, a] = color.0;

        for el in &self.elements {
            let line = render_line(
                self.fonts.face(el.weight),
                el.weight,
                &el.text,
                el.size,
                self.width as usize,
            );
            let left = (el.x - line.width as f32 / 2.0).round() as i64;
            let top = (el.y - line.height as f32 / 2.0).round() as i64;

            for ly in 0..line.height {
                let y = top + ly as i64;
                if y < 0 || y >= self.height as i64 {
                    continue;
                }
                for lx in 0..line.width {
                    let x = left + lx as i64;
                    if x < 0 || x >= self.width as i64 {
                        continue;
                    }
                    let coverage = line.data[ly * line.width + lx];
                    if coverage <= 0.0 {
                        continue;
                    }
                    let src_a = coverage * a as f32 / 255.0;
                    let px = img.get_pixel_mut(x as u32, y as u32);
                    let dst_a = px.0[3] as f32 / 255.0;
                    let out_a = src_a + dst_a * (1.0 - src_a);
                    *px = Rgba([r, g, b, (out_a * 255.0).round() as u8]);
                }
            }
        }

        img
    }
}
