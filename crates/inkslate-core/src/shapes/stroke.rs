//! Freehand ink stroke.

use super::{ElementId, ElementTrait, StrokeStyle};
use crate::eraser::{ErasureOutcome, EraseableStroke, StrokePart};
use crate::geometry::{EraserDisk, points_bounds};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand ink stroke (series of points).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ElementId,
    /// Points along the stroke.
    pub points: Vec<Point>,
    /// Per-point pressure, parallel to `points`. Empty means uniform width.
    #[serde(default)]
    pub pressures: Vec<f64>,
    /// Style properties.
    pub style: StrokeStyle,
    /// Live erasure state while the stroke is being partially erased.
    #[serde(skip)]
    eraseable: Option<EraseableStroke>,
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            pressures: Vec::new(),
            style: StrokeStyle::default(),
            eraseable: None,
        }
    }

    /// Create from points with per-point pressure.
    ///
    /// Pressure values are ignored unless there is exactly one per point.
    pub fn with_pressures(points: Vec<Point>, pressures: Vec<f64>) -> Self {
        let mut stroke = Self::from_points(points);
        if pressures.len() == stroke.points.len() {
            stroke.pressures = pressures;
        }
        stroke
    }

    /// Builder-style setter for the style.
    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    /// Add a point to the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check if the stroke carries usable pressure values.
    pub fn has_pressure(&self) -> bool {
        !self.pressures.is_empty() && self.pressures.len() == self.points.len()
    }

    /// Widest rendered width anywhere along the stroke.
    pub fn max_width(&self) -> f64 {
        if self.has_pressure() {
            let max_pressure = self.pressures.iter().copied().fold(0.0_f64, f64::max);
            self.style.width * max_pressure.max(1.0)
        } else {
            self.style.width
        }
    }

    /// The erasure engine attached to this stroke, if erasing has started.
    pub fn eraseable(&self) -> Option<&EraseableStroke> {
        self.eraseable.as_ref()
    }

    /// Detach the erasure engine.
    pub fn take_eraseable(&mut self) -> Option<EraseableStroke> {
        self.eraseable.take()
    }

    /// Whole geometry of the stroke as a single part.
    pub fn to_part(&self) -> StrokePart {
        StrokePart {
            points: self.points.clone(),
            pressures: if self.has_pressure() {
                self.pressures.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Store an updated erasure engine and write its surviving parts back.
    ///
    /// A single surviving part replaces the stroke's points in place. Several
    /// parts stay on the engine and are drawn as separate pieces until the
    /// stroke is split. When nothing survives the caller must remove the
    /// stroke from its layer.
    pub fn commit_erasure(&mut self, engine: EraseableStroke) -> ErasureOutcome {
        let outcome = engine.outcome();
        if let ErasureOutcome::Single = outcome {
            if let Some(part) = engine.parts().first() {
                self.replace_geometry(part);
            }
        }
        self.eraseable = Some(engine);
        outcome
    }

    /// Cut the disk out of this stroke, attaching an engine on first contact.
    ///
    /// Returns the changed area and how the stroke looks afterwards, or `None`
    /// when nothing was removed. A miss leaves the stroke as it was, without
    /// an engine if it had none before.
    pub fn erase(&mut self, disk: &EraserDisk) -> Option<(Rect, ErasureOutcome)> {
        let (mut engine, fresh) = match self.eraseable.take() {
            Some(engine) => (engine, false),
            None => (EraseableStroke::new(self), true),
        };
        match engine.erase(disk.center.x, disk.center.y, disk.radius) {
            Some(changed) => Some((changed, self.commit_erasure(engine))),
            None => {
                if !fresh {
                    self.eraseable = Some(engine);
                }
                None
            }
        }
    }

    /// Replace points and pressures with those of a part.
    pub fn replace_geometry(&mut self, part: &StrokePart) {
        self.points = part.points.clone();
        self.pressures = part.pressures.clone();
    }

    /// Build one new stroke per part, all sharing this stroke's style.
    pub fn split_into(&self, parts: &[StrokePart]) -> Vec<Stroke> {
        parts
            .iter()
            .map(|part| Stroke {
                id: Uuid::new_v4(),
                points: part.points.clone(),
                pressures: part.pressures.clone(),
                style: self.style.clone(),
                eraseable: None,
            })
            .collect()
    }

    /// Geometry currently drawn for this stroke.
    ///
    /// Once erasing has started this is the set of surviving parts, otherwise
    /// the whole point sequence.
    pub fn live_parts(&self) -> Vec<&[Point]> {
        match &self.eraseable {
            Some(engine) => engine.parts().iter().map(|p| p.points.as_slice()).collect(),
            None if self.points.is_empty() => Vec::new(),
            None => vec![self.points.as_slice()],
        }
    }

    /// Check whether the eraser disk touches the live geometry.
    pub fn intersects(&self, disk: &EraserDisk) -> bool {
        self.live_parts()
            .into_iter()
            .any(|points| disk.touches_polyline(points))
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTrait for Stroke {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let half_width = self.max_width() / 2.0;
        self.live_parts()
            .into_iter()
            .filter_map(points_bounds)
            .reduce(|acc, r| acc.union(r))
            .map(|r| r.inflate(half_width, half_width))
            .unwrap_or(Rect::ZERO)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.intersects(&EraserDisk::new(point, tolerance))
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for points in self.live_parts() {
            let Some((first, rest)) = points.split_first() else {
                continue;
            };
            path.move_to(*first);
            for point in rest {
                path.line_to(*point);
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(xs: &[f64]) -> Stroke {
        Stroke::from_points(xs.iter().map(|&x| Point::new(x, 0.0)).collect())
    }

    #[test]
    fn test_bounds_include_width() {
        let stroke = Stroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);

        let bounds = stroke.bounds();
        assert!((bounds.x0 + 1.0).abs() < f64::EPSILON);
        assert!((bounds.y0 + 1.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 101.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 101.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pressure_widens_stroke() {
        let stroke = Stroke::with_pressures(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            vec![1.0, 2.0],
        );
        assert!(stroke.has_pressure());
        assert!((stroke.max_width() - 4.0).abs() < f64::EPSILON);

        // Mismatched pressure counts are dropped
        let stroke = Stroke::with_pressures(vec![Point::new(0.0, 0.0)], vec![1.0, 2.0]);
        assert!(!stroke.has_pressure());
    }

    #[test]
    fn test_hit_test_uses_centerline() {
        let stroke = line(&[0.0, 100.0]);
        assert!(stroke.hit_test(Point::new(50.0, 0.0), 5.0));
        assert!(stroke.hit_test(Point::new(50.0, 5.0), 5.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_commit_single_part_replaces_points() {
        let mut stroke = line(&[0.0, 1.0, 2.0, 3.0]);
        let mut engine = EraseableStroke::new(&stroke);
        engine.erase(3.0, 0.0, 0.5);

        assert_eq!(stroke.commit_erasure(engine), ErasureOutcome::Single);
        assert_eq!(stroke.points.len(), 4);
        assert!((stroke.points[3].x - 2.5).abs() < 1e-9);
        assert!(stroke.eraseable().is_some());
    }

    #[test]
    fn test_split_parts_are_drawn_separately() {
        let style = StrokeStyle {
            width: 5.0,
            ..StrokeStyle::default()
        };
        let mut stroke = line(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).with_style(style.clone());
        let mut engine = EraseableStroke::new(&stroke);
        engine.erase(3.0, 0.0, 0.6);

        assert_eq!(stroke.commit_erasure(engine), ErasureOutcome::Split(2));
        assert_eq!(stroke.live_parts().len(), 2);
        // Original points are untouched until the stroke is split
        assert_eq!(stroke.points.len(), 7);
        assert!(!stroke.hit_test(Point::new(3.0, 0.0), 0.3));

        let pieces = stroke.split_into(stroke.eraseable().unwrap().parts());
        assert_eq!(pieces.len(), 2);
        assert_ne!(pieces[0].id(), stroke.id());
        assert_eq!(pieces[1].style, style);
    }

    #[test]
    fn test_erase_attaches_engine_only_on_change() {
        let mut stroke = line(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(stroke.erase(&EraserDisk::new(Point::new(3.0, 4.0), 1.0)).is_none());
        assert!(stroke.eraseable().is_none());

        let (changed, outcome) = stroke.erase(&EraserDisk::new(Point::new(3.0, 0.0), 0.6)).unwrap();
        assert_eq!(outcome, ErasureOutcome::Split(2));
        assert!(changed.x0 <= 2.4 && changed.x1 >= 3.6);

        // A later miss keeps the parts cut so far
        assert!(stroke.erase(&EraserDisk::new(Point::new(3.0, 4.0), 1.0)).is_none());
        assert_eq!(stroke.eraseable().map(|e| e.parts().len()), Some(2));
    }

    #[test]
    fn test_path_has_one_subpath_per_part() {
        let mut stroke = line(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut engine = EraseableStroke::new(&stroke);
        engine.erase(3.0, 0.0, 0.6);
        stroke.commit_erasure(engine);

        let moves = stroke
            .to_path()
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }
}
