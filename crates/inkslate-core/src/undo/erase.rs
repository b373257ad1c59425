//! Undo action for partial erasing.

use super::UndoAction;
use crate::document::{Document, page_mut};
use crate::eraser::ErasureOutcome;
use crate::error::DocumentResult;
use crate::shapes::{ElementId, ElementTrait, Stroke};

#[derive(Debug, Clone)]
struct ErasedStroke {
    layer: usize,
    /// The stroke as it was before the eraser first touched it.
    original: Stroke,
    /// Index of the stroke when it was first touched.
    index: usize,
    /// Strokes that replaced the original once the action was sealed.
    edited: Vec<Stroke>,
}

impl ErasedStroke {
    /// Edited in place: same element, new geometry.
    fn is_in_place(&self) -> bool {
        matches!(self.edited.as_slice(), [only] if only.id() == self.original.id())
    }
}

/// Element order changed: the original left `index` (and pieces may have
/// been inserted there).
#[derive(Debug, Clone, Copy)]
struct Restructure {
    entry: usize,
    index: usize,
}

/// Strokes partially erased during one gesture.
///
/// Strokes are recorded the first time the eraser touches them. While the
/// gesture runs they keep their live erasure state; [`EraseUndoAction::finalize`]
/// turns that state into plain strokes and remembers them as the result.
#[derive(Debug, Clone)]
pub struct EraseUndoAction {
    page: usize,
    entries: Vec<ErasedStroke>,
    /// Changes to element order, oldest first.
    restructures: Vec<Restructure>,
    finalized: bool,
}

impl EraseUndoAction {
    pub fn new(page: usize) -> Self {
        Self {
            page,
            entries: Vec::new(),
            restructures: Vec::new(),
            finalized: false,
        }
    }

    /// Record the untouched state of a stroke found at `index` on `layer`.
    pub fn add_original(&mut self, layer: usize, original: Stroke, index: usize) {
        self.entries.push(ErasedStroke {
            layer,
            original,
            index,
            edited: Vec::new(),
        });
    }

    /// Record that a recorded stroke was erased completely and removed from
    /// its layer at `index`.
    pub fn record_removal(&mut self, id: ElementId, index: usize) {
        if let Some(entry) = self.entries.iter().position(|e| e.original.id() == id) {
            self.restructures.push(Restructure { entry, index });
        }
    }

    /// Check if a stroke has already been recorded.
    pub fn contains(&self, id: ElementId) -> bool {
        self.entries.iter().any(|e| e.original.id() == id)
    }

    /// Number of recorded strokes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the action has been sealed.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Strokes recorded as the result of the erasure, once sealed.
    pub fn edited(&self) -> impl Iterator<Item = &Stroke> {
        self.entries.iter().flat_map(|e| e.edited.iter())
    }

    /// Seal the action: detach erasure engines and split strokes that fell
    /// apart into separate strokes. Calling it again does nothing.
    pub fn finalize(&mut self, document: &Document) -> DocumentResult<()> {
        if self.finalized {
            return Ok(());
        }

        let mut pages = document.lock()?;
        let page = page_mut(&mut pages, self.page)?;

        for (i, entry) in self.entries.iter_mut().enumerate() {
            let layer = page.layer_mut(entry.layer)?;
            let id = entry.original.id();
            let Some(index) = layer.index_of(id) else {
                // Erased completely while the gesture was running
                continue;
            };
            let Some(stroke) = layer.stroke_mut(id) else {
                continue;
            };

            let Some(engine) = stroke.take_eraseable() else {
                entry.edited = vec![stroke.clone()];
                continue;
            };
            match engine.outcome() {
                ErasureOutcome::Emptied => {
                    layer.remove_element(id);
                    self.restructures.push(Restructure { entry: i, index });
                }
                ErasureOutcome::Single => {
                    entry.edited = vec![stroke.clone()];
                }
                ErasureOutcome::Split(_) => {
                    let pieces = stroke.split_into(engine.parts());
                    layer.remove_element(id);
                    for (offset, piece) in pieces.iter().enumerate() {
                        layer.insert_at(index + offset, piece.clone());
                    }
                    entry.edited = pieces;
                    self.restructures.push(Restructure { entry: i, index });
                }
            }
        }

        self.finalized = true;
        log::debug!(
            "Sealed erase action: {} stroke(s) in, {} out",
            self.entries.len(),
            self.entries.iter().map(|e| e.edited.len()).sum::<usize>()
        );
        Ok(())
    }
}

impl UndoAction for EraseUndoAction {
    fn undo(&mut self, document: &Document) -> DocumentResult<()> {
        let mut pages = document.lock()?;
        let page = page_mut(&mut pages, self.page)?;
        for entry in &self.entries {
            page.layer(entry.layer)?;
        }

        // Newest order change first, each one restores the original at the
        // index it was taken from
        for change in self.restructures.iter().rev() {
            let entry = &self.entries[change.entry];
            let layer = page.layer_mut(entry.layer)?;
            for piece in &entry.edited {
                layer.remove_element(piece.id());
            }
            layer.insert_at(change.index, entry.original.clone());
        }

        // Everything else is still in its slot and only needs its geometry back
        for entry in &self.entries {
            let layer = page.layer_mut(entry.layer)?;
            if layer
                .replace_element(entry.original.id(), entry.original.clone())
                .is_none()
            {
                layer.insert_at(entry.index, entry.original.clone());
            }
        }
        Ok(())
    }

    fn redo(&mut self, document: &Document) -> DocumentResult<()> {
        let mut pages = document.lock()?;
        let page = page_mut(&mut pages, self.page)?;
        for entry in &self.entries {
            page.layer(entry.layer)?;
        }

        for entry in self.entries.iter().filter(|e| e.is_in_place()) {
            page.layer_mut(entry.layer)?
                .replace_element(entry.original.id(), entry.edited[0].clone());
        }

        for change in &self.restructures {
            let entry = &self.entries[change.entry];
            let layer = page.layer_mut(entry.layer)?;
            let index = layer
                .remove_element(entry.original.id())
                .map(|(i, _)| i)
                .unwrap_or(change.index);
            for (offset, piece) in entry.edited.iter().enumerate() {
                layer.insert_at(index + offset, piece.clone());
            }
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Erase stroke"
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::page_ref;
    use crate::eraser::EraseableStroke;
    use crate::shapes::Element;
    use kurbo::Point;

    fn straight(xs: &[f64]) -> Stroke {
        Stroke::from_points(xs.iter().map(|&x| Point::new(x, 0.0)).collect())
    }

    fn layer_strokes(doc: &Document) -> Vec<Stroke> {
        let pages = doc.read().unwrap();
        page_ref(&pages, 0).unwrap().layers()[0]
            .elements()
            .iter()
            .filter_map(Element::as_stroke)
            .cloned()
            .collect()
    }

    /// Attach an engine to the stroke `id`, erase with it and commit, the
    /// way the erase handler does.
    fn erase_in_doc(doc: &Document, action: &mut EraseUndoAction, id: ElementId, x: f64, r: f64) {
        let mut pages = doc.lock().unwrap();
        let layer = pages[0].layer_mut(0).unwrap();
        let index = layer.index_of(id).unwrap();
        let stroke = layer.stroke_mut(id).unwrap();
        if !action.contains(id) {
            action.add_original(0, stroke.clone(), index);
        }
        let mut engine = stroke
            .eraseable()
            .cloned()
            .unwrap_or_else(|| EraseableStroke::new(stroke));
        engine.erase(x, 0.0, r);
        if stroke.commit_erasure(engine) == ErasureOutcome::Emptied {
            layer.remove_element(id);
            action.record_removal(id, index);
        }
    }

    #[test]
    fn test_finalize_splits_and_undo_restores() {
        let doc = Document::new();
        let before = straight(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let other = straight(&[10.0, 11.0]);
        let id = before.id();
        {
            let mut pages = doc.lock().unwrap();
            let layer = pages[0].layer_mut(0).unwrap();
            layer.add_element(before.clone());
            layer.add_element(other.clone());
        }

        let mut action = EraseUndoAction::new(0);
        erase_in_doc(&doc, &mut action, id, 3.0, 0.6);
        action.finalize(&doc).unwrap();
        assert!(action.is_finalized());

        let strokes = layer_strokes(&doc);
        assert_eq!(strokes.len(), 3);
        assert!(strokes.iter().all(|s| s.eraseable().is_none()));
        assert_eq!(strokes[2].id(), other.id());
        assert_eq!(action.edited().count(), 2);

        action.undo(&doc).unwrap();
        let strokes = layer_strokes(&doc);
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].id(), id);
        assert_eq!(strokes[0].points, before.points);

        action.redo(&doc).unwrap();
        let strokes = layer_strokes(&doc);
        assert_eq!(strokes.len(), 3);
        assert!((strokes[0].points.last().unwrap().x - 2.4).abs() < 1e-9);
        assert_eq!(strokes[2].id(), other.id());
    }

    #[test]
    fn test_in_place_and_removed_strokes_round_trip() {
        let doc = Document::new();
        let a = straight(&[0.0, 1.0, 2.0, 3.0]);
        let b = straight(&[20.0, 21.0]);
        let c = straight(&[40.0, 41.0, 42.0]);
        let ids = [a.id(), b.id(), c.id()];
        {
            let mut pages = doc.lock().unwrap();
            let layer = pages[0].layer_mut(0).unwrap();
            layer.add_element(a.clone());
            layer.add_element(b.clone());
            layer.add_element(c.clone());
        }

        let mut action = EraseUndoAction::new(0);
        // Trim the end of a, wipe b entirely
        erase_in_doc(&doc, &mut action, ids[0], 3.0, 0.5);
        erase_in_doc(&doc, &mut action, ids[1], 20.5, 5.0);
        action.finalize(&doc).unwrap();

        let strokes = layer_strokes(&doc);
        assert_eq!(strokes.iter().map(|s| s.id()).collect::<Vec<_>>(), vec![ids[0], ids[2]]);
        assert!((strokes[0].points[3].x - 2.5).abs() < 1e-9);

        action.undo(&doc).unwrap();
        let strokes = layer_strokes(&doc);
        assert_eq!(strokes.iter().map(|s| s.id()).collect::<Vec<_>>(), ids.to_vec());
        assert_eq!(strokes[0].points, a.points);

        action.redo(&doc).unwrap();
        let strokes = layer_strokes(&doc);
        assert_eq!(strokes.iter().map(|s| s.id()).collect::<Vec<_>>(), vec![ids[0], ids[2]]);
        assert!((strokes[0].points[3].x - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_split_before_removed_neighbour() {
        // a is split at seal time after b, recorded later, was removed
        let doc = Document::new();
        let a = straight(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = straight(&[20.0, 21.0]);
        let c = straight(&[40.0, 41.0]);
        let original = vec![a.id(), b.id(), c.id()];
        {
            let mut pages = doc.lock().unwrap();
            let layer = pages[0].layer_mut(0).unwrap();
            layer.add_element(a);
            layer.add_element(b);
            layer.add_element(c);
        }

        let mut action = EraseUndoAction::new(0);
        erase_in_doc(&doc, &mut action, original[0], 3.0, 0.6);
        erase_in_doc(&doc, &mut action, original[1], 20.5, 5.0);
        action.finalize(&doc).unwrap();
        assert_eq!(layer_strokes(&doc).len(), 3);

        action.undo(&doc).unwrap();
        let ids: Vec<_> = layer_strokes(&doc).iter().map(|s| s.id()).collect();
        assert_eq!(ids, original);
    }

    #[test]
    fn test_finalize_twice_is_noop() {
        let doc = Document::new();
        let mut action = EraseUndoAction::new(0);
        action.finalize(&doc).unwrap();
        action.finalize(&doc).unwrap();
        assert!(action.is_finalized());
        assert!(action.is_empty());
    }
}
