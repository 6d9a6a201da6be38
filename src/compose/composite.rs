//! Layer list with an explicit bounds-validation pass.

use image::{RgbaImage, imageops};
use log::warn;

use super::canvas::Canvas;
use crate::error::PosterError;

/// Layer kinds in z-order (lowest drawn first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    Map,
    Border,
    Caption,
}

impl LayerKind {
    /// The map is the primary layer; the rest are decoration.
    pub fn is_primary(self) -> bool {
        self == LayerKind::Map
    }
}

/// Outcome of checking an item against the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop,
}

/// An image placed at a top-left offset on the canvas.
#[derive(Debug, Clone)]
pub struct CompositeItem {
    pub kind: LayerKind,
    pub image: RgbaImage,
    pub left: i64,
    pub top: i64,
}

impl CompositeItem {
    pub fn new(kind: LayerKind, image: RgbaImage, left: i64, top: i64) -> Self {
        Self {
            kind,
            image,
            left,
            top,
        }
    }

    /// Keep the item only if its whole bounding box lies on the canvas.
    pub fn validate(&self, canvas: &Canvas) -> Verdict {
        let (w, h) = self.image.dimensions();
        let inside = self.left >= 0
            && self.top >= 0
            && self.left + w as i64 <= canvas.width as i64
            && self.top + h as i64 <= canvas.height as i64;
        if inside { Verdict::Keep } else { Verdict::Drop }
    }
}

/// Collects layers, then validates them all in [`build`](Self::build).
#[derive(Debug)]
pub struct CompositeBuilder {
    canvas: Canvas,
    items: Vec<CompositeItem>,
}

impl CompositeBuilder {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            items: Vec::new(),
        }
    }

    pub fn push(mut self, item: CompositeItem) -> Self {
        self.items.push(item);
        self
    }

    /// Run the validate pass.
    ///
    /// Out-of-bounds secondary layers are dropped with a warning. An
    /// out-of-bounds map layer fails with `CompositionOverflow`.
    pub fn build(self) -> Result<Composite, PosterError> {
        let canvas = self.canvas;
        let mut kept = Vec::with_capacity(self.items.len());

        for item in self.items {
            match item.validate(&canvas) {
                Verdict::Keep => kept.push(item),
                Verdict::Drop if item.kind.is_primary() => {
                    let (w, h) = item.image.dimensions();
                    return Err(PosterError::CompositionOverflow(format!(
                        "{:?} layer {}x{} at ({}, {}) exceeds {}x{} canvas",
                        item.kind, w, h, item.left, item.top, canvas.width, canvas.height
                    )));
                }
                Verdict::Drop => {
                    warn!(
                        "Dropping {:?} layer at ({}, {}): outside {}x{} canvas",
                        item.kind, item.left, item.top, canvas.width, canvas.height
                    );
                }
            }
        }

        // Stable sort keeps push order within one kind
        kept.sort_by_key(|item| item.kind);
        Ok(Composite {
            canvas,
            items: kept,
        })
    }
}

/// Validated, z-ordered layers ready to flatten.
#[derive(Debug, Clone)]
pub struct Composite {
    canvas: Canvas,
    items: Vec<CompositeItem>,
}

impl Composite {
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn items(&self) -> &[CompositeItem] {
        &self.items
    }

    /// First kept layer of the given kind.
    pub fn layer(&self, kind: LayerKind) -> Option<&CompositeItem> {
        self.items.iter().find(|item| item.kind == kind)
    }

    /// Fill the background and alpha-blend every layer in z-order.
    pub fn flatten(&self) -> RgbaImage {
        let mut out = RgbaImage::from_pixel(self.canvas.width, self.canvas.height, self.canvas.background);
        for item in &self.items {
            imageops::overlay(&mut out, &item.image, item.left, item.top);
        }
        out
    }
}
