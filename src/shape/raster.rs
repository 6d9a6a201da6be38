//! Scanline fill and distance-field stroke for flattened outlines.
//!
//! Both rasterizers sample at pixel centres (x + 0.5, y + 0.5) and return a
//! row-major `u8` buffer of exactly `width * height` bytes.

use rayon::prelude::*;

use super::path::Point;

/// Fill closed polylines with the even-odd rule. Inside = 255, outside = 0.
pub fn fill(polylines: &[Vec<Point>], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let mut data = vec![0u8; w * height as usize];

    data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let sy = y as f32 + 0.5;
        let mut crossings: Vec<f32> = Vec::new();

        for poly in polylines {
            for edge in poly.windows(2) {
                let (a, b) = (edge[0], edge[1]);
                // Half-open on y so shared vertices count once
                if (a.y <= sy) != (b.y <= sy) {
                    let t = (sy - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let start = ((span[0] - 0.5).ceil().max(0.0) as usize).min(w);
            let end = ((span[1] - 0.5).ceil().max(0.0) as usize).min(w);
            if start < end {
                row[start..end].fill(255);
            }
        }
    });

    data
}

/// Stroke polylines centred on the outline with the given width.
///
/// Coverage falls off over one pixel at the stroke edge.
pub fn stroke(polylines: &[Vec<Point>], width: u32, height: u32, stroke_width: f32) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let half = stroke_width / 2.0;
    let mut coverage = vec![0.0f32; (w * h) as usize];

    for poly in polylines {
        for edge in poly.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            let reach = half + 1.0;
            let x0 = ((a.x.min(b.x) - reach).floor() as i64).max(0);
            let x1 = ((a.x.max(b.x) + reach).ceil() as i64).min(w - 1);
            let y0 = ((a.y.min(b.y) - reach).floor() as i64).max(0);
            let y1 = ((a.y.max(b.y) + reach).ceil() as i64).min(h - 1);

            for py in y0..=y1 {
                for px in x0..=x1 {
                    let d = dist_to_segment(px as f32 + 0.5, py as f32 + 0.5, a, b);
                    let c = (half + 0.5 - d).clamp(0.0, 1.0);
                    let idx = (py * w + px) as usize;
                    if c > coverage[idx] {
                        coverage[idx] = c;
                    }
                }
            }
        }
    }

    coverage.iter().map(|&c| (c * 255.0).round() as u8).collect()
}

/// Distance from a point to a line segment.
pub fn dist_to_segment(px: f32, py: f32, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-10 {
        return ((px - a.x).powi(2) + (py - a.y).powi(2)).sqrt();
    }

    // Project onto the segment, clamped to its endpoints
    let t = (((px - a.x) * dx + (py - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;

    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::path::pt;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point> {
        vec![pt(x0, y0), pt(x1, y0), pt(x1, y1), pt(x0, y1), pt(x0, y0)]
    }

    #[test]
    fn test_fill_square_exact_pixels() {
        let data = fill(&[square(2.0, 2.0, 6.0, 6.0)], 8, 8);
        assert_eq!(data.len(), 64);
        let inside = data.iter().filter(|&&v| v == 255).count();
        assert_eq!(inside, 16);
        assert_eq!(data[2 * 8 + 2], 255);
        assert_eq!(data[6 * 8 + 6], 0);
    }

    #[test]
    fn test_fill_out_of_bounds_is_clipped() {
        let data = fill(&[square(-5.0, -5.0, 50.0, 50.0)], 4, 4);
        assert!(data.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_stroke_stays_near_outline() {
        let data = stroke(&[square(10.0, 10.0, 30.0, 30.0)], 40, 40, 4.0);
        // On the outline
        assert_eq!(data[10 * 40 + 20], 255);
        // Centre of the square is untouched
        assert_eq!(data[20 * 40 + 20], 0);
    }

    #[test]
    fn test_dist_to_segment() {
        let d = dist_to_segment(5.0, 3.0, pt(0.0, 0.0), pt(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-6);
        let d = dist_to_segment(13.0, 4.0, pt(0.0, 0.0), pt(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);
    }
}
