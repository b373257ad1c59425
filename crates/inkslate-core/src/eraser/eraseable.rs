//! Partial erasure of a single stroke.
//!
//! An [`EraseableStroke`] holds the surviving pieces of one stroke while a
//! gesture is carving it up. Every call to [`EraseableStroke::erase`] clips
//! the current pieces against a circle and returns the area that changed.

use crate::geometry::{EraserDisk, GEOMETRY_EPSILON, Range, points_bounds, rects_intersect};
use crate::shapes::Stroke;
use kurbo::{Point, Rect};

/// A contiguous surviving piece of a stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePart {
    /// Points of the piece.
    pub points: Vec<Point>,
    /// Pressures parallel to `points`, empty for uniform width.
    pub pressures: Vec<f64>,
}

impl StrokePart {
    /// Number of points in the piece.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the piece's points.
    pub fn bounds(&self) -> Option<Rect> {
        points_bounds(&self.points)
    }

    /// Total length along the piece.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).hypot()).sum()
    }

    /// Position and pressure at parameter `t` along the edge starting at `index`.
    fn interpolate(&self, index: usize, t: f64) -> (Point, Option<f64>) {
        let a = self.points[index];
        let b = self.points[index + 1];
        let pressure = match (self.pressures.get(index), self.pressures.get(index + 1)) {
            (Some(pa), Some(pb)) => Some(pa + (pb - pa) * t),
            _ => None,
        };
        (a.lerp(b, t), pressure)
    }

    fn vertex(&self, index: usize) -> (Point, Option<f64>) {
        (self.points[index], self.pressures.get(index).copied())
    }
}

/// What a stroke looks like after an erase has been written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErasureOutcome {
    /// Nothing survived; the stroke must leave its layer.
    Emptied,
    /// One piece survived and replaces the stroke's geometry.
    Single,
    /// The stroke fell apart into this many pieces.
    Split(usize),
}

/// Live erasure state of one stroke.
#[derive(Debug, Clone)]
pub struct EraseableStroke {
    parts: Vec<StrokePart>,
    /// Half the widest rendered width, added around changed areas.
    half_width: f64,
}

impl EraseableStroke {
    /// Seed the engine with the stroke's full geometry as a single part.
    pub fn new(stroke: &Stroke) -> Self {
        let part = stroke.to_part();
        Self {
            parts: if part.is_empty() { Vec::new() } else { vec![part] },
            half_width: stroke.max_width() / 2.0,
        }
    }

    /// Surviving parts, in stroke order.
    pub fn parts(&self) -> &[StrokePart] {
        &self.parts
    }

    /// Check if nothing of the stroke survives.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Classify the current parts for write-back.
    pub fn outcome(&self) -> ErasureOutcome {
        match self.parts.len() {
            0 => ErasureOutcome::Emptied,
            1 => ErasureOutcome::Single,
            n => ErasureOutcome::Split(n),
        }
    }

    /// Erase everything inside the circle at (`x`, `y`) with `radius`.
    ///
    /// Returns the area whose pixels changed, widened by half the stroke
    /// width, or `None` when no surviving geometry was touched.
    pub fn erase(&mut self, x: f64, y: f64, radius: f64) -> Option<Rect> {
        let disk = EraserDisk::new(Point::new(x, y), radius);
        let square = disk.bounding_square();
        let mut changed = Range::new();

        let results: Vec<Option<Vec<StrokePart>>> = self
            .parts
            .iter()
            .map(|part| {
                if !part.bounds().is_some_and(|b| rects_intersect(b, square)) {
                    return None;
                }
                erase_part(part, &disk, &mut changed)
            })
            .collect();

        if results.iter().all(Option::is_none) {
            return None;
        }

        let old = std::mem::take(&mut self.parts);
        for (part, result) in old.into_iter().zip(results) {
            match result {
                Some(pieces) => self.parts.extend(pieces),
                None => self.parts.push(part),
            }
        }

        log::trace!(
            "Erased at ({:.2}, {:.2}) r={:.2}: {} part(s) left",
            x,
            y,
            radius,
            self.parts.len()
        );
        changed.inflated(self.half_width).to_rect()
    }
}

/// Accumulates the points of the piece currently being built.
#[derive(Default)]
struct PartBuilder {
    points: Vec<Point>,
    pressures: Vec<f64>,
}

impl PartBuilder {
    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, (point, pressure): (Point, Option<f64>)) {
        self.points.push(point);
        if let Some(p) = pressure {
            self.pressures.push(p);
        }
    }

    /// Close the current piece; pieces without any length are dropped.
    fn finish_into(&mut self, pieces: &mut Vec<StrokePart>) {
        let mut part = StrokePart {
            points: std::mem::take(&mut self.points),
            pressures: std::mem::take(&mut self.pressures),
        };
        if part.pressures.len() != part.points.len() {
            part.pressures.clear();
        }
        if part.len() >= 2 && part.length() > GEOMETRY_EPSILON {
            pieces.push(part);
        }
    }
}

/// Clip one part against the disk.
///
/// Returns `None` when the part is untouched, otherwise the pieces that
/// survive (possibly none). Everything removed is added to `changed`.
fn erase_part(part: &StrokePart, disk: &EraserDisk, changed: &mut Range) -> Option<Vec<StrokePart>> {
    if let [only] = part.points.as_slice() {
        if disk.contains(*only) {
            changed.add_point(*only);
            return Some(Vec::new());
        }
        return None;
    }

    let mut pieces = Vec::new();
    let mut current = PartBuilder::default();
    let mut touched = false;

    for i in 0..part.len().saturating_sub(1) {
        match disk.clip_segment(part.points[i], part.points[i + 1]) {
            None => {
                if current.is_empty() {
                    current.push(part.vertex(i));
                }
                current.push(part.vertex(i + 1));
            }
            Some((t0, t1)) => {
                touched = true;
                let enter = part.interpolate(i, t0);
                let exit = part.interpolate(i, t1);
                changed.add_point(enter.0);
                changed.add_point(exit.0);

                // Edge starts outside: keep it up to the boundary
                if t0 > 0.0 {
                    if current.is_empty() {
                        current.push(part.vertex(i));
                    }
                    current.push(enter);
                }
                current.finish_into(&mut pieces);

                // Edge leaves the disk again: start a new piece at the boundary
                if t1 < 1.0 {
                    current.push(exit);
                    current.push(part.vertex(i + 1));
                }
            }
        }
    }

    if !touched {
        return None;
    }
    current.finish_into(&mut pieces);
    Some(pieces)
}
