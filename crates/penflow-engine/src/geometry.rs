//! Geometry primitives shared by every node kind
//!
//! A [`ColoredPath`] is one continuous pen-down stroke. Generators assign
//! the color well; transformers only ever carry it along.

use serde::{Deserialize, Serialize};

/// Highest valid ink well index
pub const MAX_WELL: u8 = 3;

/// A point in drawing space (millimeters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.sub(other).length()
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// A polyline with an optional ink well
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColoredPath {
    pub points: Vec<Point>,
    /// `None` means "inherit the downstream default"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl ColoredPath {
    pub fn new(points: Vec<Point>, color: Option<u8>) -> Self {
        Self { points, color }
    }

    /// A path is drawable when it has at least two finite points
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2 && self.points.iter().all(Point::is_finite)
    }

    /// Apply `transform` to every point, keeping the color
    pub fn map_points(&self, transform: impl Fn(Point) -> Point) -> ColoredPath {
        ColoredPath {
            points: self.points.iter().copied().map(transform).collect(),
            color: self.color,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Drop paths that cannot be drawn (fewer than two points or non-finite)
pub fn drawable(paths: Vec<ColoredPath>) -> Vec<ColoredPath> {
    paths.into_iter().filter(ColoredPath::is_drawable).collect()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Bounding box of every point in `paths`
pub fn bounds(paths: &[ColoredPath]) -> Option<Bounds> {
    points_bounds(paths.iter().flat_map(|p| p.points.iter().copied()))
}

/// Bounding box of an arbitrary point sequence
pub fn points_bounds(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut b = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in iter {
        b.min_x = b.min_x.min(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_x = b.max_x.max(p.x);
        b.max_y = b.max_y.max(p.y);
    }
    Some(b)
}

/// Mean of every point in `paths`
pub fn centroid(paths: &[ColoredPath]) -> Option<Point> {
    let mut sum = Point::default();
    let mut count = 0usize;
    for p in paths.iter().flat_map(|p| p.points.iter()) {
        sum = sum.add(*p);
        count += 1;
    }
    (count > 0).then(|| sum.scale(1.0 / count as f64))
}

/// Merge adjacent points closer than `tolerance`
///
/// The last point of the input is always kept so closed outlines stay closed.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        match out.last() {
            Some(last) if last.distance(*p) < tolerance => {
                if i == points.len() - 1 && out.len() > 1 {
                    let n = out.len();
                    out[n - 1] = *p;
                }
            }
            _ => out.push(*p),
        }
    }
    out
}

/// A 2D affine transform stored as the matrix `[a c e; b d f]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(dx: f64, dy: f64) -> Self {
        Affine {
            e: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees` about the origin
    pub fn rotate(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Affine {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees` about `pivot`
    pub fn rotate_about(degrees: f64, pivot: Point) -> Self {
        Affine::translate(-pivot.x, -pivot.y)
            .then(Affine::rotate(degrees))
            .then(Affine::translate(pivot.x, pivot.y))
    }

    /// Axis-aligned scale about `pivot`
    pub fn scale_about(sx: f64, sy: f64, pivot: Point) -> Self {
        Affine::translate(-pivot.x, -pivot.y)
            .then(Affine::scale(sx, sy))
            .then(Affine::translate(pivot.x, pivot.y))
    }

    /// `self` followed by `next`
    pub fn then(self, next: Affine) -> Affine {
        Affine {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }
}

/// Apply one transform to a whole collection
pub fn transform_paths(paths: &[ColoredPath], transform: &Affine) -> Vec<ColoredPath> {
    paths.iter().map(|p| p.map_points(|pt| transform.apply(pt))).collect()
}
