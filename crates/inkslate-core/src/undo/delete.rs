//! Undo action for whole-stroke deletion.

use super::UndoAction;
use crate::document::{Document, page_mut};
use crate::error::DocumentResult;
use crate::shapes::Element;

#[derive(Debug, Clone)]
struct DeletedElement {
    layer: usize,
    element: Element,
    /// Index the element occupied when it was removed.
    index: usize,
}

/// Elements removed from a page, in removal order.
#[derive(Debug, Clone)]
pub struct DeleteUndoAction {
    page: usize,
    deleted: Vec<DeletedElement>,
}

impl DeleteUndoAction {
    pub fn new(page: usize) -> Self {
        Self {
            page,
            deleted: Vec::new(),
        }
    }

    /// Record an element that was just removed from `layer` at `index`.
    pub fn add_element(&mut self, layer: usize, element: Element, index: usize) {
        self.deleted.push(DeletedElement {
            layer,
            element,
            index,
        });
    }

    /// Number of recorded elements.
    pub fn len(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}

impl UndoAction for DeleteUndoAction {
    fn undo(&mut self, document: &Document) -> DocumentResult<()> {
        let mut pages = document.lock()?;
        let page = page_mut(&mut pages, self.page)?;
        for entry in &self.deleted {
            page.layer(entry.layer)?;
        }

        // Later removals saw indices shifted by earlier ones, so reinsert backwards
        for entry in self.deleted.iter().rev() {
            page.layer_mut(entry.layer)?
                .insert_at(entry.index, entry.element.clone());
        }
        Ok(())
    }

    fn redo(&mut self, document: &Document) -> DocumentResult<()> {
        let mut pages = document.lock()?;
        let page = page_mut(&mut pages, self.page)?;
        for entry in &self.deleted {
            page.layer_mut(entry.layer)?
                .remove_element(entry.element.id());
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Delete stroke"
    }

    fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}
