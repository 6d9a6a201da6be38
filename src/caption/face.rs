//! Single-line text rasterization.
//!
//! Renders a line of text to an anti-aliased coverage buffer using either an
//! outline face (ab_glyph) or the Spleen bitmap fallback, scaled to the
//! requested pixel height.

use ab_glyph::{Font, GlyphId, ScaleFont, point};
use spleen_font::{FONT_12X24, PSF2Font};

use super::fonts::Face;
use super::FontWeight;

/// Spleen glyph cell dimensions.
const CELL_W: usize = 12;
const CELL_H: usize = 24;

/// Rendered line as coverage values (0.0 = empty, 1.0 = full ink).
#[derive(Debug, Clone)]
pub struct LineRender {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl LineRender {
    fn blank(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    fn add(&mut self, x: i64, y: i64, coverage: f32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let idx = y as usize * self.width + x as usize;
            self.data[idx] = (self.data[idx] + coverage).min(1.0);
        }
    }

    pub fn has_ink(&self) -> bool {
        self.data.iter().any(|&v| v > 0.0)
    }
}

/// Render one line of text with the given face.
///
/// A line wider than `max_width` keeps only its centre `max_width` columns,
/// so the buffer never outgrows the region it is drawn into.
pub fn render_line(face: &Face, weight: FontWeight, text: &str, pixel_height: f32, max_width: usize) -> LineRender {
    match face {
        Face::Outline(font) => render_outline(font, text, pixel_height, max_width),
        Face::Bitmap => render_bitmap(text, weight, pixel_height, max_width),
    }
}

/// Columns `(skip, width)` kept from a line `full` pixels wide.
fn centre_window(full: usize, max_width: usize) -> (usize, usize) {
    let max_width = max_width.max(1);
    if full <= max_width {
        (0, full)
    } else {
        ((full - max_width) / 2, max_width)
    }
}

/// Kerned caret position and advance of each glyph.
fn layout_outline<F: Font>(font: &F, text: &str, pixel_height: f32) -> impl Iterator<Item = (GlyphId, f32, f32)> {
    let scaled = font.as_scaled(pixel_height);
    let mut caret_x = 0.0f32;
    let mut prev: Option<GlyphId> = None;

    text.chars().map(move |ch| {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev_id) = prev {
            caret_x += scaled.kern(prev_id, glyph_id);
        }
        let x = caret_x;
        let advance = scaled.h_advance(glyph_id);
        caret_x += advance;
        prev = Some(glyph_id);
        (glyph_id, x, advance)
    })
}

fn render_outline<F: Font>(font: &F, text: &str, pixel_height: f32, max_width: usize) -> LineRender {
    let scaled = font.as_scaled(pixel_height);
    let ascent = scaled.ascent();
    let descent = scaled.descent();

    let full = layout_outline(font, text, pixel_height)
        .last()
        .map(|(_, x, advance)| x + advance)
        .unwrap_or(0.0);
    let (skip, width) = centre_window(full.ceil() as usize, max_width);
    let mut out = LineRender::blank(width, (ascent - descent).ceil() as usize);

    // Glyph ink can overhang its advance; keep a one-em margin when culling
    let first = skip as f32 - pixel_height;
    let last = (skip + width) as f32 + pixel_height;

    for (glyph_id, glyph_x, advance) in layout_outline(font, text, pixel_height) {
        if glyph_x > last {
            break;
        }
        if glyph_x + advance < first {
            continue;
        }
        let glyph = glyph_id.with_scale_and_position(pixel_height, point(glyph_x - skip as f32, ascent));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                out.add(
                    px as i64 + bounds.min.x as i64,
                    py as i64 + bounds.min.y as i64,
                    coverage,
                );
            });
        }
    }

    out
}

/// Spleen glyphs scaled nearest-neighbour to the pixel height. Bold is a
/// one-step horizontal double strike.
fn render_bitmap(text: &str, weight: FontWeight, pixel_height: f32, max_width: usize) -> LineRender {
    let scale = (pixel_height / CELL_H as f32).max(1.0 / CELL_H as f32);
    let cell_w = ((CELL_W as f32 * scale).round() as usize).max(1);
    let cell_h = ((CELL_H as f32 * scale).round() as usize).max(1);
    let strike = if weight == FontWeight::Bold {
        (scale.round() as i64).max(1)
    } else {
        0
    };

    let full = text.chars().count() * cell_w + strike as usize;
    let (skip, width) = centre_window(full, max_width);
    let mut out = LineRender::blank(width, cell_h);

    let Ok(mut spleen) = PSF2Font::new(FONT_12X24) else {
        return out;
    };

    for (i, ch) in text.chars().enumerate() {
        let origin_x = (i * cell_w) as i64 - skip as i64;
        if origin_x >= width as i64 {
            break;
        }
        if origin_x + cell_w as i64 + strike < 0 {
            continue;
        }

        let cell = if ch == ' ' {
            vec![false; CELL_W * CELL_H]
        } else {
            let utf8 = ch.to_string();
            match spleen.glyph_for_utf8(utf8.as_bytes()) {
                Some(glyph) => cell_from_rows(glyph),
                None => missing_cell(),
            }
        };

        for dy in 0..cell_h {
            for dx in 0..cell_w {
                let sx = dx * CELL_W / cell_w;
                let sy = dy * CELL_H / cell_h;
                if cell[sy * CELL_W + sx] {
                    for s in 0..=strike {
                        out.add(origin_x + dx as i64 + s, dy as i64, 1.0);
                    }
                }
            }
        }
    }

    out
}

/// Copy a Spleen glyph's rows into a 12x24 cell.
fn cell_from_rows<R, I>(rows: R) -> Vec<bool>
where
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = bool>,
{
    let mut cell = vec![false; CELL_W * CELL_H];
    for (row_y, row) in rows.into_iter().enumerate() {
        for (col_x, on) in row.into_iter().enumerate() {
            if row_y < CELL_H && col_x < CELL_W {
                cell[row_y * CELL_W + col_x] = on;
            }
        }
    }
    cell
}

/// Box outline for characters Spleen lacks.
fn missing_cell() -> Vec<bool> {
    let mut cell = vec![false; CELL_W * CELL_H];
    for x in 1..CELL_W - 1 {
        cell[4 * CELL_W + x] = true;
        cell[(CELL_H - 5) * CELL_W + x] = true;
    }
    for y in 4..CELL_H - 4 {
        cell[y * CELL_W + 1] = true;
        cell[y * CELL_W + CELL_W - 2] = true;
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_line_has_ink() {
        let line = render_line(&Face::Bitmap, FontWeight::Regular, "Our Day", 36.0, 800);
        assert_eq!(line.height, 36);
        assert_eq!(line.width, 7 * 18);
        assert_eq!(line.data.len(), line.width * line.height);
        assert!(line.has_ink());
    }

    #[test]
    fn test_bitmap_bold_is_heavier() {
        let regular = render_line(&Face::Bitmap, FontWeight::Regular, "Name", 36.0, 800);
        let bold = render_line(&Face::Bitmap, FontWeight::Bold, "Name", 36.0, 800);
        let ink = |l: &LineRender| l.data.iter().filter(|&&v| v > 0.0).count();
        assert!(ink(&bold) > ink(&regular));
    }

    #[test]
    fn test_space_only_has_no_ink() {
        let line = render_line(&Face::Bitmap, FontWeight::Regular, "   ", 20.0, 800);
        assert!(!line.has_ink());
    }

    #[test]
    fn test_empty_text_still_has_buffer() {
        let line = render_line(&Face::Bitmap, FontWeight::Regular, "", 20.0, 800);
        assert!(line.width >= 1);
        assert!(line.height >= 1);
    }

    #[test]
    fn test_long_line_is_capped_at_max_width() {
        let text = "W".repeat(200_000);
        let line = render_line(&Face::Bitmap, FontWeight::Regular, &text, 36.0, 800);
        assert_eq!(line.width, 800);
        assert_eq!(line.height, 36);
        assert_eq!(line.data.len(), 800 * 36);
        assert!(line.has_ink());
    }

    #[test]
    fn test_window_keeps_the_centre() {
        assert_eq!(centre_window(100, 800), (0, 100));
        assert_eq!(centre_window(1000, 800), (100, 800));
        assert_eq!(centre_window(10, 0), (4, 1));
    }

    fn outline_faces() -> (Face, Face) {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fonts/");
        let load = |name: &str| {
            let bytes = std::fs::read(format!("{}{}", dir, name)).unwrap();
            Face::Outline(ab_glyph::FontArc::try_from_vec(bytes).unwrap())
        };
        (load("DejaVuSans.ttf"), load("DejaVuSans-Bold.ttf"))
    }

    #[test]
    fn test_outline_line_has_ink() {
        let (regular, _) = outline_faces();
        let line = render_line(&regular, FontWeight::Regular, "Our Day", 36.0, 800);
        assert!(line.width > 36 && line.width < 800);
        assert!(line.height >= 36);
        assert_eq!(line.data.len(), line.width * line.height);
        assert!(line.has_ink());
        assert!(line.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_outline_bold_differs_from_regular() {
        let (regular, bold) = outline_faces();
        let a = render_line(&regular, FontWeight::Regular, "Ana & Sam", 36.0, 800);
        let b = render_line(&bold, FontWeight::Bold, "Ana & Sam", 36.0, 800);
        let ink = |l: &LineRender| l.data.iter().sum::<f32>();
        assert!(ink(&b) > ink(&a));
    }

    #[test]
    fn test_outline_long_line_is_capped() {
        let (regular, _) = outline_faces();
        let text = "W".repeat(200_000);
        let line = render_line(&regular, FontWeight::Regular, &text, 36.0, 800);
        assert_eq!(line.width, 800);
        assert!(line.has_ink());
    }
}
