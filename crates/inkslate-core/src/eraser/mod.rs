//! Stroke eraser: per-stroke erasure engine and the gesture handler that
//! drives it.

mod eraseable;
mod handler;

pub use eraseable::{EraseableStroke, ErasureOutcome, StrokePart};
pub use handler::EraseHandler;
