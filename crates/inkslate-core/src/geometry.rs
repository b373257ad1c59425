//! Geometry primitives for hit testing and invalidation.
//!
//! Positions and rectangles are plain kurbo types. This module adds the
//! pieces erasing needs on top of them:
//! - [`Range`]: an accumulating bounding box used for repaint invalidation
//! - [`EraserDisk`]: the circular eraser footprint with clipping helpers
//! - distance helpers for segments and polylines

use kurbo::{Point, Rect, Vec2};

/// Tolerance for degenerate lengths and boundary contact.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Check whether two rectangles overlap, edges included.
///
/// Unlike `Rect::intersect(..).area() > 0.0` this also accepts rectangles
/// with zero width or height, which is what a perfectly horizontal or
/// vertical stroke has.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < GEOMETRY_EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline.
///
/// A single point polyline is treated as a dot; an empty one is infinitely far away.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Bounding box of a set of points, `None` when there are no points.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p)),
    )
}

/// Accumulated invalidation area.
///
/// Starts empty and grows as points or rectangles are added. An empty range
/// means nothing has to be repainted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    bounds: Option<Rect>,
}

impl Range {
    /// Create an empty range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the range to include a point.
    pub fn add_point(&mut self, point: Point) {
        self.bounds = Some(match self.bounds {
            Some(r) => r.union_pt(point),
            None => Rect::from_points(point, point),
        });
    }

    /// Grow the range to include a rectangle.
    pub fn add_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.bounds = Some(match self.bounds {
            Some(r) => r.union(rect),
            None => rect,
        });
    }

    /// Check if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Return a copy grown by `margin` on every side.
    pub fn inflated(self, margin: f64) -> Self {
        Self {
            bounds: self.bounds.map(|r| r.inflate(margin, margin)),
        }
    }

    /// The covered rectangle, if any.
    pub fn to_rect(self) -> Option<Rect> {
        self.bounds
    }
}

/// Circular eraser footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraserDisk {
    /// Center in page coordinates.
    pub center: Point,
    /// Radius (half the eraser thickness).
    pub radius: f64,
}

impl EraserDisk {
    /// Create a disk from its center and radius.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Axis-aligned square enclosing the disk, used as the broad-phase filter.
    pub fn bounding_square(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius * 2.0, self.radius * 2.0))
    }

    /// Check if a point lies strictly inside the disk.
    ///
    /// Points on the boundary are outside.
    pub fn contains(&self, point: Point) -> bool {
        (point - self.center).hypot2() + GEOMETRY_EPSILON < self.radius * self.radius
    }

    /// Check if any part of a polyline comes within the radius.
    pub fn touches_polyline(&self, points: &[Point]) -> bool {
        point_to_polyline_dist(self.center, points) <= self.radius
    }

    /// Clip the segment `a→b` against the disk.
    ///
    /// Returns the parameter interval `(t0, t1)`, clamped to `[0, 1]`, of the
    /// part of the segment lying inside the disk, or `None` when the segment
    /// stays outside or only touches the boundary. Zero-length segments are
    /// classified by a single point test and report either the whole segment
    /// or nothing.
    pub fn clip_segment(&self, a: Point, b: Point) -> Option<(f64, f64)> {
        let d: Vec2 = b - a;
        let len_sq = d.hypot2();
        if len_sq < GEOMETRY_EPSILON {
            return self.contains(a).then_some((0.0, 1.0));
        }

        // |a + t*d - c|^2 = r^2, with the halved linear coefficient
        let f = a - self.center;
        let half_b = f.dot(d);
        let c = f.hypot2() - self.radius * self.radius;
        let disc = half_b * half_b - len_sq * c;
        if disc <= 0.0 {
            return None;
        }

        let root = disc.sqrt();
        let t0 = ((-half_b - root) / len_sq).max(0.0);
        let t1 = ((-half_b + root) / len_sq).min(1.0);
        if (t1 - t0) * len_sq.sqrt() <= GEOMETRY_EPSILON {
            return None;
        }
        Some((t0, t1))
    }
}
