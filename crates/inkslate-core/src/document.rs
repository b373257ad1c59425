//! Document, page and layer containers.

use crate::error::{DocumentError, DocumentResult};
use crate::shapes::{Element, ElementId, Stroke};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default page width (A4 in points).
pub const DEFAULT_PAGE_WIDTH: f64 = 595.0;
/// Default page height (A4 in points).
pub const DEFAULT_PAGE_HEIGHT: f64 = 842.0;

/// An ordered stack of elements (back to front).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    elements: Vec<Element>,
}

impl Layer {
    /// Create a new empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements in draw order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Add an element on top of the layer.
    pub fn add_element(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    /// Insert an element at `index`; indices past the end append.
    pub fn insert_at(&mut self, index: usize, element: impl Into<Element>) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element.into());
    }

    /// Position of an element, if it is on this layer.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    /// Remove an element, returning the index it occupied and the element.
    pub fn remove_element(&mut self, id: ElementId) -> Option<(usize, Element)> {
        let index = self.index_of(id)?;
        Some((index, self.elements.remove(index)))
    }

    /// Put another element into the slot occupied by `id`.
    pub fn replace_element(&mut self, id: ElementId, element: impl Into<Element>) -> Option<usize> {
        let index = self.index_of(id)?;
        self.elements[index] = element.into();
        Some(index)
    }

    /// Get an element by ID.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Get a stroke by ID.
    pub fn stroke(&self, id: ElementId) -> Option<&Stroke> {
        self.get(id).and_then(Element::as_stroke)
    }

    /// Get a mutable stroke by ID.
    pub fn stroke_mut(&mut self, id: ElementId) -> Option<&mut Stroke> {
        self.elements
            .iter_mut()
            .find(|e| e.id() == id)
            .and_then(Element::as_stroke_mut)
    }

    /// Get the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the layer is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A page with its layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    layers: Vec<Layer>,
    /// 1-based number of the selected layer; 0 when none is selected.
    /// Erasing visits the layers up to and including this one.
    selected_layer: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT)
    }
}

impl Page {
    /// Create a page with a single, selected layer.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layers: vec![Layer::new()],
            selected_layer: 1,
        }
    }

    /// Layers, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Append a layer and select it. Returns its index.
    pub fn add_layer(&mut self) -> usize {
        self.layers.push(Layer::new());
        self.selected_layer = self.layers.len();
        self.layers.len() - 1
    }

    pub fn layer(&self, index: usize) -> DocumentResult<&Layer> {
        self.layers
            .get(index)
            .ok_or(DocumentError::LayerNotFound(index))
    }

    pub fn layer_mut(&mut self, index: usize) -> DocumentResult<&mut Layer> {
        self.layers
            .get_mut(index)
            .ok_or(DocumentError::LayerNotFound(index))
    }

    /// How many layers, counted from the bottom, take part in erasing.
    pub fn selected_layer_count(&self) -> usize {
        self.selected_layer
    }

    /// Select a layer by index, or none with `None`.
    pub fn select_layer(&mut self, index: Option<usize>) -> DocumentResult<()> {
        match index {
            Some(i) if i >= self.layers.len() => Err(DocumentError::LayerNotFound(i)),
            Some(i) => {
                self.selected_layer = i + 1;
                Ok(())
            }
            None => {
                self.selected_layer = 0;
                Ok(())
            }
        }
    }
}

/// A document: pages behind a document-wide lock.
///
/// Readers (hit testing, rendering) share the lock; structural changes take it
/// exclusively through [`Document::lock`] and release it when the guard drops.
#[derive(Debug)]
pub struct Document {
    pages: RwLock<Vec<Page>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with a single default page.
    pub fn new() -> Self {
        Self::with_pages(vec![Page::default()])
    }

    /// Create a document from existing pages.
    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self {
            pages: RwLock::new(pages),
        }
    }

    /// Take the exclusive mutation lock.
    pub fn lock(&self) -> DocumentResult<RwLockWriteGuard<'_, Vec<Page>>> {
        self.pages
            .write()
            .map_err(|e| DocumentError::Lock(e.to_string()))
    }

    /// Take the shared read lock.
    pub fn read(&self) -> DocumentResult<RwLockReadGuard<'_, Vec<Page>>> {
        self.pages
            .read()
            .map_err(|e| DocumentError::Lock(e.to_string()))
    }

    /// Number of pages.
    pub fn page_count(&self) -> DocumentResult<usize> {
        Ok(self.read()?.len())
    }
}

/// Look up a page in a locked page list.
pub fn page_ref(pages: &[Page], index: usize) -> DocumentResult<&Page> {
    pages.get(index).ok_or(DocumentError::PageNotFound(index))
}

/// Look up a page mutably in a locked page list.
pub fn page_mut(pages: &mut [Page], index: usize) -> DocumentResult<&mut Page> {
    pages.get_mut(index).ok_or(DocumentError::PageNotFound(index))
}
