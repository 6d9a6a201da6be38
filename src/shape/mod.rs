//! # Shape Mask Engine
//!
//! Alpha masks and stroke borders for the crop shapes a poster map can take.
//!
//! Each [`Shape`] variant maps to a [`ShapeGeometry`] implementation that
//! produces an outline [`Path`] for a given box. Masks and borders are both
//! derived from that outline, so adding a shape means adding one geometry.
//!
//! ```
//! use mapposter::shape::{self, Shape};
//!
//! let mask = shape::mask(200, 300, Shape::Heart).unwrap();
//! assert_eq!(mask.dimensions(), (200, 300));
//! ```

pub mod path;
mod raster;

use std::f32::consts::PI;
use std::str::FromStr;

use image::{GrayImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::PosterError;
pub use path::{Path, Point, pt};

/// Border stroke width in pixels.
pub const STROKE_WIDTH: f32 = 4.0;

/// Border stroke colour.
pub const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Crop shapes for the map region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Rectangle,
    Circle,
    Heart,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Rectangle, Shape::Circle, Shape::Heart];

    pub fn name(self) -> &'static str {
        self.geometry().name()
    }

    /// The geometry backing this shape.
    pub fn geometry(self) -> &'static dyn ShapeGeometry {
        match self {
            Shape::Rectangle => &Rectangle,
            Shape::Circle => &Circle,
            Shape::Heart => &Heart,
        }
    }

    /// Whether the map must be clipped to this shape's mask.
    pub fn clips(self) -> bool {
        self != Shape::Rectangle
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rectangle" | "rect" => Ok(Shape::Rectangle),
            "circle" => Ok(Shape::Circle),
            "heart" => Ok(Shape::Heart),
            other => Err(format!("unknown shape '{}'", other)),
        }
    }
}

/// Outline generator for one crop shape.
///
/// Implementations are pure functions of the target box.
pub trait ShapeGeometry: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filled outline used for the mask.
    fn outline(&self, width: f32, height: f32) -> Path;

    /// Outline stroked for the border. Defaults to [`outline`](Self::outline).
    fn stroke_outline(&self, width: f32, height: f32, _stroke_width: f32) -> Path {
        self.outline(width, height)
    }
}

/// Full-box rectangle.
pub struct Rectangle;

impl ShapeGeometry for Rectangle {
    fn name(&self) -> &'static str {
        "rectangle"
    }

    fn outline(&self, width: f32, height: f32) -> Path {
        rect_path(0.0, 0.0, width, height)
    }

    /// Inset by half the stroke so the border never clips at the edge.
    fn stroke_outline(&self, width: f32, height: f32, stroke_width: f32) -> Path {
        let inset = stroke_width / 2.0;
        rect_path(inset, inset, width - inset, height - inset)
    }
}

fn rect_path(x0: f32, y0: f32, x1: f32, y1: f32) -> Path {
    Path::new()
        .move_to(pt(x0, y0))
        .line_to(pt(x1, y0))
        .line_to(pt(x1, y1))
        .line_to(pt(x0, y1))
        .close()
}

/// Centred circle with radius `min(width, height) / 2`.
pub struct Circle;

/// Maximum gap between the polygon chord and the true circle, in pixels.
const CIRCLE_SAGITTA: f32 = 0.1;

impl ShapeGeometry for Circle {
    fn name(&self) -> &'static str {
        "circle"
    }

    /// Inscribed polygon: every vertex lies on the circle, so the filled
    /// area never extends past it.
    fn outline(&self, width: f32, height: f32) -> Path {
        let cx = width / 2.0;
        let cy = height / 2.0;
        let r = width.min(height) / 2.0;

        let steps = if r > CIRCLE_SAGITTA {
            (PI / (1.0 - CIRCLE_SAGITTA / r).acos()).ceil() as usize
        } else {
            0
        }
        .clamp(32, 4096);

        let mut path = Path::new().move_to(pt(cx + r, cy));
        for i in 1..steps {
            let a = 2.0 * PI * i as f32 / steps as f32;
            path = path.line_to(pt(cx + r * a.cos(), cy + r * a.sin()));
        }
        path.close()
    }
}

/// Vertical heart scaled to 85% of the width and 90% of the height.
pub struct Heart;

const HEART_SCALE_X: f32 = 0.85;
const HEART_SCALE_Y: f32 = 0.90;

/// Left half of the heart as cubic segments, in units of the scaled box
/// relative to its centre. The right half mirrors it.
const HEART_TIP: (f32, f32) = (0.0, 0.25);
const HEART_LEFT: [[(f32, f32); 3]; 2] = [
    [(-0.12, 0.08), (-0.42, -0.12), (-0.42, -0.32)],
    [(-0.42, -0.58), (-0.15, -0.58), (0.0, -0.38)],
];

impl ShapeGeometry for Heart {
    fn name(&self) -> &'static str {
        "heart"
    }

    fn outline(&self, width: f32, height: f32) -> Path {
        let cx = width / 2.0;
        let cy = height / 2.0;
        let sx = width * HEART_SCALE_X;
        let sy = height * HEART_SCALE_Y;
        let at = |(u, v): (f32, f32)| pt(cx + u * sx, cy + v * sy);

        let mut path = Path::new().move_to(at(HEART_TIP));
        for [c1, c2, end] in HEART_LEFT {
            path = path.cubic_to(at(c1), at(c2), at(end));
        }

        // Walk the left half backwards, mirrored, to come down the right side
        let mirror = |(u, v): (f32, f32)| at((-u, v));
        for i in (0..HEART_LEFT.len()).rev() {
            let [c1, c2, _] = HEART_LEFT[i];
            let end = if i == 0 { HEART_TIP } else { HEART_LEFT[i - 1][2] };
            path = path.cubic_to(mirror(c2), mirror(c1), mirror(end));
        }

        path.close()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), PosterError> {
    if width == 0 || height == 0 {
        return Err(PosterError::InvalidDimension { width, height });
    }
    Ok(())
}

/// Binary alpha mask: 255 inside the shape, 0 outside.
pub fn mask(width: u32, height: u32, shape: Shape) -> Result<GrayImage, PosterError> {
    check_dimensions(width, height)?;

    let outline = shape.geometry().outline(width as f32, height as f32);
    let data = raster::fill(&outline.flatten(), width, height);

    GrayImage::from_raw(width, height, data).ok_or(PosterError::InvalidDimension { width, height })
}

/// Stroke-only border image, transparent everywhere but the outline.
pub fn border(width: u32, height: u32, shape: Shape) -> Result<RgbaImage, PosterError> {
    check_dimensions(width, height)?;

    let outline = shape
        .geometry()
        .stroke_outline(width as f32, height as f32, STROKE_WIDTH);
    let coverage = raster::stroke(&outline.flatten(), width, height, STROKE_WIDTH);

    let [r, g, b, a] = STROKE_COLOR.0;
    let mut img = RgbaImage::new(width, height);
    for (pixel, &c) in img.pixels_mut().zip(coverage.iter()) {
        if c > 0 {
            *pixel = Rgba([r, g, b, ((a as u16 * c as u16) / 255) as u8]);
        }
    }
    Ok(img)
}
