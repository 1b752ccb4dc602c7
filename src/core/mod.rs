//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Screen model: grid, scroll margins, deferred wrap
//! - Cell representation with attributes and graphic references
//! - Cursor state, pen and the saved-cursor slot
//! - Private mode flags
//! - Reference-counted graphic registry
//! - Scrollback buffer
//! - Deterministic snapshot generation
//!
//! The core is deterministic: the same sequence of operations always
//! produces the same state.

mod cell;
mod cursor;
mod graphics;
pub mod modes;
mod screen;
mod scrollback;
mod snapshot;

pub use cell::{Cell, Color, Hyperlink, Style};
pub use cursor::{Cursor, CursorShape, Pen, SavedCursor};
pub use graphics::{GraphicId, GraphicRegistry, TrackedGraphic};
pub use modes::{MouseMode, PrivateModes};
pub use screen::{Screen, DEFAULT_TAB_WIDTH};
pub use scrollback::{Line, Scrollback};
pub use snapshot::{CellSnapshot, CursorSnapshot, LineSnapshot, Snapshot};
