//! Drawable elements placed on page layers.

mod image;
mod stroke;

pub use image::Image;
pub use stroke::Stroke;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 8-bit RGBA ink color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// Style properties for ink strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: InkColor,
    /// Nominal stroke width (scaled per point by pressure).
    pub width: f64,
    /// Overall opacity, 0.0 to 1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl StrokeStyle {
    /// Color to draw with, opacity applied.
    pub fn color(&self) -> Color {
        let alpha = (f64::from(self.color.a) * self.opacity.clamp(0.0, 1.0)) as u8;
        Color::from_rgba8(self.color.r, self.color.g, self.color.b, alpha)
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: InkColor::BLACK,
            width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Common behavior of everything that can sit on a layer.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Get the bounding box in page coordinates, including rendered width.
    fn bounds(&self) -> Rect;

    /// Check if a point comes within `tolerance` of this element's geometry.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;
}

/// Enum wrapper for all element types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Element {
    Stroke(Stroke),
    Image(Image),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Stroke(e) => e.id(),
            Element::Image(e) => e.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Element::Stroke(e) => e.bounds(),
            Element::Image(e) => e.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Element::Stroke(e) => e.hit_test(point, tolerance),
            Element::Image(e) => e.hit_test(point, tolerance),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Element::Stroke(e) => e.to_path(),
            Element::Image(e) => e.to_path(),
        }
    }

    /// Borrow the stroke, if this element is one.
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Element::Stroke(s) => Some(s),
            _ => None,
        }
    }

    /// Mutably borrow the stroke, if this element is one.
    pub fn as_stroke_mut(&mut self) -> Option<&mut Stroke> {
        match self {
            Element::Stroke(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Stroke> for Element {
    fn from(stroke: Stroke) -> Self {
        Element::Stroke(stroke)
    }
}

impl From<Image> for Element {
    fn from(image: Image) -> Self {
        Element::Image(image)
    }
}
