//! # Poster Pipeline Tests
//!
//! End-to-end checks of the compositor and the print PDF assembler using
//! synthetic map rasters, so nothing here touches the network or needs font
//! files on disk (captions render with the bitmap face).

use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Document, Object};
use pretty_assertions::assert_eq;
use std::sync::Arc;

use mapposter::caption::{CaptionBlock, FontSet, render_caption};
use mapposter::compose::{self, Canvas, LayerKind, PosterOptions, assemble};
use mapposter::print::{self, PrintSize};
use mapposter::shape::{self, Shape};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// A 400x600 map-like gradient, encoded as PNG.
fn map_png() -> Vec<u8> {
    compose::encode_png(&map_raster(400, 600)).unwrap()
}

fn map_raster(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x * 255 / w) as u8, (y * 255 / h) as u8, 90, 255])
    })
}

fn fonts() -> Arc<FontSet> {
    Arc::new(FontSet::fallback())
}

/// Read a page box from the first page of a PDF.
fn page_box(pdf: &[u8], name: &[u8]) -> Vec<f64> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    page.get(name)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => *r as f64,
            other => panic!("not a number: {:?}", other),
        })
        .collect()
}

/// Non-white extent (first, last) along a row or column of the print canvas.
fn ink_extent(canvas: &RgbImage, positions: impl Iterator<Item = (u32, u32)>, axis_x: bool) -> (u32, u32) {
    let inked: Vec<u32> = positions
        .filter(|&(x, y)| *canvas.get_pixel(x, y) != Rgb([255, 255, 255]))
        .map(|(x, y)| if axis_x { x } else { y })
        .collect();
    (inked[0], inked[inked.len() - 1])
}

fn heart_options() -> PosterOptions {
    PosterOptions {
        text: "Our Day".into(),
        name: "".into(),
        date: "June 1, 2024".into(),
        shape: Shape::Heart,
        ..Default::default()
    }
}

// ============================================================================
// SHAPES AND CAPTIONS
// ============================================================================

#[test]
fn test_mask_and_border_sizes_for_all_shapes() {
    for shape in Shape::ALL {
        for (w, h) in [(1, 1), (3, 200), (720, 810), (513, 77)] {
            assert_eq!(shape::mask(w, h, shape).unwrap().dimensions(), (w, h), "{:?}", shape);
            assert_eq!(shape::border(w, h, shape).unwrap().dimensions(), (w, h), "{:?}", shape);
        }
    }
}

#[test]
fn test_blank_caption_line_compacts() {
    let full = CaptionBlock::new("Our Day", "Ana", "June 1, 2024");
    let partial = CaptionBlock::new("Our Day", " \t", "June 1, 2024");

    let a = render_caption(800, 300, &full.lines(), fonts()).unwrap();
    let b = render_caption(800, 300, &partial.lines(), fonts()).unwrap();

    assert!(b.elements().len() < a.elements().len());
    let offsets: Vec<f32> = b.elements().iter().map(|e| e.y).collect();
    assert_eq!(offsets, vec![80.0, 130.0]);
}

// ============================================================================
// COMPOSITION
// ============================================================================

#[test]
fn test_map_lies_within_padded_box() {
    for (w, h) in [(800, 1200), (640, 480), (1001, 1501)] {
        let options = PosterOptions {
            width: w,
            height: h,
            ..Default::default()
        };
        let composite = assemble(&DynamicImage::ImageRgba8(map_raster(400, 600)), &options, fonts()).unwrap();
        let map_box = Canvas::new(w, h, Rgba([255, 255, 255, 255])).unwrap().map_box();
        let layer = composite.layer(LayerKind::Map).unwrap();
        let (lw, lh) = layer.image.dimensions();

        assert!(layer.left >= map_box.left as i64 && layer.top >= map_box.top as i64);
        assert!(layer.left + lw as i64 <= map_box.right() as i64);
        assert!(layer.top + lh as i64 <= map_box.bottom() as i64);
    }
}

#[test]
fn test_rectangle_leaves_map_unmasked() {
    let source = DynamicImage::ImageRgba8(map_raster(400, 600));
    let composite = assemble(&source, &PosterOptions::default(), fonts()).unwrap();
    let layer = composite.layer(LayerKind::Map).unwrap();

    let expected = source.resize_to_fill(720, 810, FilterType::Lanczos3).to_rgba8();
    assert!(layer.image == expected);
    assert!(layer.image.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn test_heart_end_to_end() {
    let options = heart_options();
    let map = compose::decode_map(&map_png()).unwrap();
    let composite = assemble(&map, &options, fonts()).unwrap();

    // Flattened output has the canvas size
    let poster = composite.flatten();
    assert_eq!(poster.dimensions(), (800, 1200));

    // Two caption lines: text and date
    let caption = render_caption(800, 300, &options.caption().lines(), fonts()).unwrap();
    let texts: Vec<&str> = caption.elements().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Our Day", "June 1, 2024"]);
    assert!(composite.layer(LayerKind::Caption).is_some());

    // Map alpha is zero everywhere outside the heart
    let layer = composite.layer(LayerKind::Map).unwrap();
    let (w, h) = layer.image.dimensions();
    let mask = shape::mask(w, h, Shape::Heart).unwrap();
    let mut outside = 0;
    for (px, m) in layer.image.pixels().zip(mask.pixels()) {
        if m.0[0] == 0 {
            outside += 1;
            assert_eq!(px.0[3], 0);
        }
    }
    assert!(outside > 0);

    // Background shows through at the map box corners
    assert_eq!(*poster.get_pixel(45, 50), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_caption_drawn_in_text_region() {
    let png = compose::compose(&map_png(), &heart_options(), fonts()).unwrap();
    let text_region_ink = (900..1200)
        .flat_map(|y| (0..800).map(move |x| (x, y)))
        .filter(|&(x, y)| png.get_pixel(x, y).0[0] < 128)
        .count();
    assert!(text_region_ink > 0);
}

#[test]
fn test_degenerate_canvas_rejected() {
    let options = PosterOptions {
        width: 0,
        ..Default::default()
    };
    let err = compose::compose(&map_png(), &options, fonts()).unwrap_err();
    assert_eq!(err.kind(), "InvalidDimension");
}

// ============================================================================
// PRINT PDF
// ============================================================================

#[test]
fn test_page_points_for_every_size() {
    for size in PrintSize::ALL {
        let (w_in, h_in) = size.trim_inches();
        let boxes = size.spec().page_boxes();
        assert_eq!(boxes.media_width, (w_in as f64 + 2.0 * 0.125) * 72.0);
        assert_eq!(boxes.media_height, (h_in as f64 + 2.0 * 0.125) * 72.0);
    }
}

#[test]
fn test_pdf_8x10_from_matching_aspect() {
    let poster = DynamicImage::ImageRgba8(map_raster(80, 100));
    let pdf_bytes = print::to_print_pdf(&poster, PrintSize::Size8x10).unwrap();

    assert!(pdf_bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(page_box(&pdf_bytes, b"MediaBox"), vec![0.0, 0.0, 594.0, 738.0]);
    assert_eq!(page_box(&pdf_bytes, b"TrimBox"), vec![9.0, 9.0, 585.0, 729.0]);

    let placement = print::place(80, 100, 2400, 3000).unwrap();
    assert_eq!((placement.left, placement.top), (0, 0));
    assert_eq!((placement.width, placement.height), (2400, 3000));
}

#[test]
fn test_matching_aspect_has_no_margin_on_canvas() {
    let poster = DynamicImage::ImageRgba8(RgbaImage::from_pixel(80, 100, Rgba([30, 60, 90, 255])));
    let canvas = print::print_canvas(&poster, &PrintSize::Size8x10.spec()).unwrap();
    assert_eq!(canvas.dimensions(), (2475, 3075));

    // Ink starts right at the bleed offset and fills the whole trim box
    let row = ink_extent(&canvas, (0..2475).map(|x| (x, 1500)), true);
    let column = ink_extent(&canvas, (0..3075).map(|y| (1200, y)), false);
    assert_eq!(row, (38, 2437));
    assert_eq!(column, (38, 3037));
}

#[test]
fn test_square_source_has_equal_margins() {
    let placement = print::place(500, 500, 2400, 3000).unwrap();
    let right = 2400 - placement.left - placement.width;
    let bottom = 3000 - placement.top - placement.height;
    assert_eq!(placement.left, right);
    assert_eq!(placement.top, bottom);

    let poster = DynamicImage::ImageRgba8(RgbaImage::from_pixel(500, 500, Rgba([30, 60, 90, 255])));
    let canvas = print::print_canvas(&poster, &PrintSize::Size8x10.spec()).unwrap();
    let (top, last) = ink_extent(&canvas, (0..3075).map(|y| (1200, y)), false);
    let trim_top = 38;
    let trim_bottom = 38 + 3000 - 1;
    assert_eq!(top - trim_top, trim_bottom - last);
    assert_eq!(top - trim_top, 300);
}

#[test]
fn test_unsupported_size_fails_first() {
    let err = print::print_pdf_from_bytes(b"", "11x14").unwrap_err();
    assert_eq!(err.kind(), "UnsupportedSize");
}
