//! Erase gesture handling.
//!
//! One [`EraseHandler`] lives for one pointer gesture. Each pointer position
//! is fed to [`EraseHandler::erase`]; the touched strokes are either cut by
//! their [`EraseableStroke`](super::EraseableStroke) engine or deleted outright, depending on the
//! eraser mode at that moment. All changes of a gesture end up in at most one
//! delete action and one erase action on the undo stack.
//!
//! The document lock is never held while an undo action is locked; undo and
//! redo take them the other way round.

use super::ErasureOutcome;
use crate::document::{Document, page_mut, page_ref};
use crate::error::{DocumentError, DocumentResult};
use crate::geometry::{EraserDisk, rects_intersect};
use crate::shapes::{ElementId, ElementTrait};
use crate::tools::{EraserMode, EraserSettings};
use crate::undo::{DeleteUndoAction, EraseUndoAction, SharedAction, UndoRedoHandler};
use crate::view::Redrawable;
use kurbo::Point;
use std::sync::{Arc, Mutex, MutexGuard};

/// Erases strokes on one page for the duration of a gesture.
///
/// Dropping the handler ends the gesture and seals its erase action.
pub struct EraseHandler {
    document: Arc<Document>,
    page: usize,
    settings: Arc<dyn EraserSettings>,
    view: Arc<dyn Redrawable>,
    undo: Arc<Mutex<UndoRedoHandler>>,
    delete_action: Option<Arc<Mutex<DeleteUndoAction>>>,
    erase_action: Option<Arc<Mutex<EraseUndoAction>>>,
}

impl EraseHandler {
    pub fn new(
        document: Arc<Document>,
        page: usize,
        settings: Arc<dyn EraserSettings>,
        view: Arc<dyn Redrawable>,
        undo: Arc<Mutex<UndoRedoHandler>>,
    ) -> Self {
        Self {
            document,
            page,
            settings,
            view,
            undo,
            delete_action: None,
            erase_action: None,
        }
    }

    /// Erase at (`x`, `y`) in page coordinates.
    pub fn erase(&mut self, x: f64, y: f64) -> DocumentResult<()> {
        let disk = EraserDisk::new(Point::new(x, y), self.settings.thickness() / 2.0);
        let hits = self.strokes_under(&disk)?;
        if hits.is_empty() {
            return Ok(());
        }

        let mode = self.settings.eraser_mode();
        log::debug!(
            "Eraser ({:?}) at ({:.1}, {:.1}) hit {} stroke(s)",
            mode,
            x,
            y,
            hits.len()
        );
        for (layer, id) in hits {
            match mode {
                EraserMode::DeleteStroke => self.delete_stroke(layer, id)?,
                EraserMode::Default => self.erase_stroke(layer, id, &disk)?,
            }
        }
        Ok(())
    }

    /// Seal the gesture's erase action. Safe to call more than once.
    pub fn finalize(&mut self) -> DocumentResult<()> {
        if let Some(action) = &self.erase_action {
            lock(action)?.finalize(&self.document)?;
        }
        self.erase_action = None;
        self.delete_action = None;
        Ok(())
    }

    /// Ids of the strokes the disk touches, with their layer, in layer order.
    ///
    /// Taken as one snapshot before anything is changed.
    fn strokes_under(&self, disk: &EraserDisk) -> DocumentResult<Vec<(usize, ElementId)>> {
        let square = disk.bounding_square();
        let pages = self.document.read()?;
        let page = page_ref(&pages, self.page)?;

        let mut hits = Vec::new();
        let mut remaining = page.selected_layer_count();
        for (index, layer) in page.layers().iter().enumerate() {
            if remaining == 0 {
                break;
            }
            remaining -= 1;

            for stroke in layer.elements().iter().filter_map(|e| e.as_stroke()) {
                if rects_intersect(stroke.bounds(), square) && stroke.intersects(disk) {
                    hits.push((index, stroke.id()));
                }
            }
        }
        Ok(hits)
    }

    fn delete_stroke(&mut self, layer: usize, id: ElementId) -> DocumentResult<()> {
        let removed = {
            let mut pages = self.document.lock()?;
            let target = page_mut(&mut pages, self.page)?.layer_mut(layer)?;
            target.remove_element(id)
        };
        let Some((index, element)) = removed else {
            log::debug!("Stroke {id} already removed");
            return Ok(());
        };

        self.view.repaint_element(&element);
        let action = self.delete_action()?;
        lock(&action)?.add_element(layer, element, index);
        Ok(())
    }

    fn erase_stroke(&mut self, layer: usize, id: ElementId, disk: &EraserDisk) -> DocumentResult<()> {
        let (index, original, changed, outcome) = {
            let mut pages = self.document.lock()?;
            let target = page_mut(&mut pages, self.page)?.layer_mut(layer)?;
            let (Some(index), Some(stroke)) = (target.index_of(id), target.stroke_mut(id)) else {
                log::debug!("Stroke {id} already removed");
                return Ok(());
            };

            // No engine yet means this gesture has not touched the stroke
            let original = stroke.eraseable().is_none().then(|| stroke.clone());
            let Some((changed, outcome)) = stroke.erase(disk) else {
                return Ok(());
            };
            if outcome == ErasureOutcome::Emptied {
                target.remove_element(id);
            }
            (index, original, changed, outcome)
        };

        let action = self.erase_action()?;
        let mut batch = lock(&action)?;
        if let Some(original) = original {
            batch.add_original(layer, original, index);
        }
        if outcome == ErasureOutcome::Emptied {
            batch.record_removal(id, index);
        }
        drop(batch);

        self.view.repaint_rect(changed);
        Ok(())
    }

    fn delete_action(&mut self) -> DocumentResult<Arc<Mutex<DeleteUndoAction>>> {
        if let Some(action) = &self.delete_action {
            return Ok(action.clone());
        }
        let action = Arc::new(Mutex::new(DeleteUndoAction::new(self.page)));
        register(&self.undo, action.clone())?;
        self.delete_action = Some(action.clone());
        Ok(action)
    }

    fn erase_action(&mut self) -> DocumentResult<Arc<Mutex<EraseUndoAction>>> {
        if let Some(action) = &self.erase_action {
            return Ok(action.clone());
        }
        let action = Arc::new(Mutex::new(EraseUndoAction::new(self.page)));
        register(&self.undo, action.clone())?;
        self.erase_action = Some(action.clone());
        Ok(action)
    }
}

impl Drop for EraseHandler {
    fn drop(&mut self) {
        if let Err(e) = self.finalize() {
            log::warn!("Failed to finalize erase gesture: {e}");
        }
    }
}

fn register(undo: &Mutex<UndoRedoHandler>, action: SharedAction) -> DocumentResult<()> {
    lock(undo)?.add_action(action);
    Ok(())
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> DocumentResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| DocumentError::Lock(e.to_string()))
}
