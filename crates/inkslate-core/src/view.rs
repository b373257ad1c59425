//! Repaint requests from the editing core to whatever draws the page.

use crate::geometry::Range;
use crate::shapes::Element;
use kurbo::Rect;
use std::sync::Mutex;

/// Something that can be told which areas need to be redrawn.
///
/// Requests are fire-and-forget; overlapping or repeated rectangles are fine.
pub trait Redrawable: Send + Sync {
    /// Request a repaint of a page area.
    fn repaint_rect(&self, rect: Rect);

    /// Request a repaint of the area an element covers.
    fn repaint_element(&self, element: &Element) {
        self.repaint_rect(element.bounds());
    }
}

/// Collects dirty rectangles between renders.
#[derive(Debug, Default)]
pub struct DirtyRegion {
    regions: Mutex<Vec<Rect>>,
}

impl DirtyRegion {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the rectangles gathered so far.
    pub fn take_regions(&self) -> Vec<Rect> {
        match self.regions.lock() {
            Ok(mut regions) => regions.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    /// Union of all pending rectangles without draining them.
    pub fn union(&self) -> Option<Rect> {
        let mut range = Range::new();
        if let Ok(regions) = self.regions.lock() {
            for rect in regions.iter() {
                range.add_rect(*rect);
            }
        }
        range.to_rect()
    }

    /// Number of pending rectangles.
    pub fn len(&self) -> usize {
        self.regions.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Redrawable for DirtyRegion {
    fn repaint_rect(&self, rect: Rect) {
        // Elements without geometry report Rect::ZERO
        if rect == Rect::ZERO {
            return;
        }
        match self.regions.lock() {
            Ok(mut regions) => regions.push(rect),
            Err(poisoned) => poisoned.into_inner().push(rect),
        }
    }
}
