//! Inkslate Core Library
//!
//! Document model and stroke eraser for the Inkslate ink annotation editor.

pub mod document;
pub mod eraser;
pub mod error;
pub mod geometry;
pub mod shapes;
pub mod tools;
pub mod undo;
pub mod view;

pub use document::{Document, Layer, Page};
pub use eraser::{EraseHandler, EraseableStroke, ErasureOutcome, StrokePart};
pub use error::{DocumentError, DocumentResult};
pub use geometry::{EraserDisk, Range};
pub use shapes::{Element, ElementId, ElementTrait, Image, InkColor, Stroke, StrokeStyle};
pub use tools::{EraserConfig, EraserMode, EraserSettings, ToolHandler};
pub use undo::{DeleteUndoAction, EraseUndoAction, UndoAction, UndoRedoHandler};
pub use view::{DirtyRegion, Redrawable};
