//! Outline paths for crop shapes.
//!
//! A [`Path`] is a list of move/line/cubic/close commands in pixel space.
//! Rasterizers never see curves: [`Path::flatten`] turns every subpath into
//! a closed polyline first.

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Shorthand constructor.
#[inline]
pub fn pt(x: f32, y: f32) -> Point {
    Point { x, y }
}

/// A single path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic Bézier with two control points and an end point.
    CubicTo(Point, Point, Point),
    Close,
}

/// An outline made of one or more subpaths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

/// Target maximum length of a flattened curve step, in pixels.
const FLATTEN_STEP: f32 = 2.0;
const MIN_CURVE_STEPS: usize = 8;
const MAX_CURVE_STEPS: usize = 512;

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.segments.push(Segment::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.segments.push(Segment::LineTo(p));
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, end: Point) -> Self {
        self.segments.push(Segment::CubicTo(c1, c2, end));
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(Segment::Close);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Flatten into closed polylines, one per subpath.
    ///
    /// Each returned polyline repeats its first point at the end so
    /// consecutive pairs cover every edge, including the closing one.
    pub fn flatten(&self) -> Vec<Vec<Point>> {
        let mut polylines = Vec::new();
        let mut current: Vec<Point> = Vec::new();

        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => {
                    finish_subpath(&mut current, &mut polylines);
                    current.push(p);
                }
                Segment::LineTo(p) => current.push(p),
                Segment::CubicTo(c1, c2, end) => {
                    let Some(&start) = current.last() else {
                        current.push(end);
                        continue;
                    };
                    let hull = seg_len(start, c1) + seg_len(c1, c2) + seg_len(c2, end);
                    let steps = ((hull / FLATTEN_STEP).ceil() as usize)
                        .clamp(MIN_CURVE_STEPS, MAX_CURVE_STEPS);
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        current.push(cubic_point(start, c1, c2, end, t));
                    }
                }
                Segment::Close => finish_subpath(&mut current, &mut polylines),
            }
        }
        finish_subpath(&mut current, &mut polylines);

        polylines
    }
}

fn finish_subpath(current: &mut Vec<Point>, out: &mut Vec<Vec<Point>>) {
    if current.len() >= 2 {
        let first = current[0];
        if current.last() != Some(&first) {
            current.push(first);
        }
        out.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[inline]
fn seg_len(a: Point, b: Point) -> f32 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Evaluate a cubic Bézier at `t`.
fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    pt(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}
