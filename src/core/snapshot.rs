//! Deterministic snapshots
//!
//! A snapshot is a plain-data copy of what a renderer or test harness needs:
//! rows of cells, the cursor, margins, mode flags and graphic keys. Given the
//! same input, a terminal produces identical snapshots. Graphic payloads stay
//! in the registry; cells only carry their key. Default colors, plain styles
//! and absent references are left out of the JSON form.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, Style};
use super::cursor::{Cursor, CursorShape};
use super::graphics::GraphicId;
use super::screen::Screen;
use super::scrollback::Line;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    pub lines: Vec<LineSnapshot>,
    pub cursor: CursorSnapshot,
    /// Scroll margins, 0-indexed inclusive
    pub margins: (usize, usize),
    /// Private mode codes that are switched on, ascending
    pub modes: Vec<u32>,
    pub title: String,
    pub scrollback_lines: usize,
    pub tracked_objects: usize,
}

/// One grid row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    /// The row continues onto the next one through an autowrap
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wrapped: bool,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub text: String,
    /// 0 for a wide continuation, 2 for a wide lead
    pub width: u8,
    #[serde(default, skip_serializing_if = "Color::is_default")]
    pub fg: Color,
    #[serde(default, skip_serializing_if = "Color::is_default")]
    pub bg: Color,
    #[serde(default, skip_serializing_if = "Style::is_plain")]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphic: Option<GraphicId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub pending_wrap: bool,
    pub visible: bool,
    pub shape: CursorShape,
    pub blinking: bool,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        Self {
            text: cell.content.clone(),
            width: cell.width,
            fg: cell.fg,
            bg: cell.bg,
            style: cell.style,
            hyperlink: (cell.hyperlink_id != 0).then_some(cell.hyperlink_id),
            graphic: cell.graphic,
        }
    }
}

impl From<&Line> for LineSnapshot {
    fn from(line: &Line) -> Self {
        Self {
            wrapped: line.wrapped,
            cells: line.cells.iter().map(CellSnapshot::from).collect(),
        }
    }
}

impl CursorSnapshot {
    fn new(cursor: &Cursor, visible: bool) -> Self {
        Self {
            col: cursor.col,
            row: cursor.row,
            pending_wrap: cursor.pending_wrap,
            visible,
            shape: cursor.shape,
            blinking: cursor.blinking,
        }
    }
}

impl LineSnapshot {
    /// Row text with trailing blanks removed
    pub fn text(&self) -> String {
        let text: String = self
            .cells
            .iter()
            .filter(|cell| cell.width != 0)
            .map(|cell| if cell.text.is_empty() { " " } else { cell.text.as_str() })
            .collect();
        text.trim_end().to_string()
    }
}

impl Snapshot {
    pub fn from_screen(screen: &Screen, title: &str) -> Self {
        let modes = screen.modes();
        Self {
            cols: screen.cols(),
            rows: screen.rows(),
            lines: screen.lines().iter().map(LineSnapshot::from).collect(),
            cursor: CursorSnapshot::new(screen.cursor(), modes.cursor_visible()),
            margins: screen.scroll_region(),
            modes: modes.enabled().collect(),
            title: title.to_string(),
            scrollback_lines: screen.scrollback().len(),
            tracked_objects: screen.graphics().len(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Grid text, one line per row. Trailing empty rows are dropped and the
    /// result always ends in a newline.
    pub fn to_text(&self) -> String {
        let rows: Vec<String> = self.lines.iter().map(LineSnapshot::text).collect();
        let used = rows
            .iter()
            .rposition(|row| !row.is_empty())
            .map_or(0, |last| last + 1);
        let mut text = rows[..used].join("\n");
        text.push('\n');
        text
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&CellSnapshot> {
        self.lines.get(row)?.cells.get(col)
    }
}
