//! Screen model implementation
//!
//! The screen is the visible grid plus the state that shapes how text lands
//! on it: cursor, scroll margins, private modes and the graphic registry.
//! Every path that overwrites or discards a cell (printing, erasing,
//! scrolling, resizing) releases the graphic reference that cell held.

use tracing::{trace, warn};
use unicode_width::UnicodeWidthStr;

use super::cell::Cell;
use super::cursor::{Cursor, SavedCursor};
use super::graphics::{GraphicId, GraphicRegistry};
use super::modes::{self, PrivateModes};
use super::scrollback::{Line, Scrollback};
use crate::parser::{ClearMode, LineClearMode};

/// Default distance between tab stops
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// The main screen structure
#[derive(Debug, Clone)]
pub struct Screen {
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
    grid: Vec<Line>,
    scrollback: Scrollback,
    cursor: Cursor,
    /// Single save slot shared by DECSC and SCP
    saved_cursor: Option<SavedCursor>,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    tab_width: usize,
    modes: PrivateModes,
    graphics: GraphicRegistry,
}

/// Release every graphic reference held by `cells`
fn release_graphics(graphics: &mut GraphicRegistry, cells: &mut [Cell]) {
    for cell in cells {
        if let Some(id) = cell.graphic.take() {
            graphics.release(id);
        }
    }
}

impl Screen {
    /// Create a new screen with the given dimensions. Zero dimensions are
    /// raised to 1.
    pub fn new(cols: usize, rows: usize, scrollback_capacity: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            grid: (0..rows).map(|_| Line::new(cols)).collect(),
            scrollback: Scrollback::new(scrollback_capacity),
            cursor: Cursor::new(),
            saved_cursor: None,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_width: DEFAULT_TAB_WIDTH,
            modes: PrivateModes::new(),
            graphics: GraphicRegistry::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn saved_cursor(&self) -> Option<&SavedCursor> {
        self.saved_cursor.as_ref()
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn modes(&self) -> &PrivateModes {
        &self.modes
    }

    pub fn graphics(&self) -> &GraphicRegistry {
        &self.graphics
    }

    /// Scroll margins as 0-indexed inclusive rows
    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Set the tab stop interval; 0 is treated as 1
    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width.max(1);
    }

    /// Get a cell at the given position
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.grid.get(row)?.cells.get(col)
    }

    pub fn line(&self, row: usize) -> Option<&Line> {
        self.grid.get(row)
    }

    pub fn lines(&self) -> &[Line] {
        &self.grid
    }

    /// Text of a row with trailing blanks trimmed
    pub fn line_text(&self, row: usize) -> Option<String> {
        self.grid.get(row).map(Line::text)
    }

    /// Reset one cell to blank, releasing its graphic
    fn erase_cell(&mut self, col: usize, row: usize) {
        let Some(cell) = self.grid.get_mut(row).and_then(|line| line.cells.get_mut(col)) else {
            return;
        };
        if let Some(id) = cell.erase() {
            self.graphics.release(id);
        }
    }

    fn is_continuation(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_some_and(Cell::is_wide_continuation)
    }

    /// Blank `[start, end)` on a row. Wide characters cut in half by the
    /// range are blanked entirely.
    fn erase_cells(&mut self, row: usize, start: usize, end: usize) {
        let end = end.min(self.cols);
        if start >= end {
            return;
        }
        if start > 0 && self.is_continuation(start, row) {
            self.erase_cell(start - 1, row);
        }
        if end < self.cols && self.is_continuation(end, row) {
            self.erase_cell(end, row);
        }
        for col in start..end {
            self.erase_cell(col, row);
        }
        if start == 0 && end == self.cols {
            if let Some(line) = self.grid.get_mut(row) {
                line.wrapped = false;
            }
        }
    }

    fn pen_cell(&self, content: &str, width: u8) -> Cell {
        Cell {
            content: content.to_string(),
            fg: self.cursor.pen.fg,
            bg: self.cursor.pen.bg,
            style: self.cursor.pen.style,
            hyperlink_id: self.cursor.hyperlink_id,
            graphic: None,
            width,
        }
    }

    /// Write one grapheme cluster at the cursor
    pub fn print(&mut self, grapheme: &str) {
        let width = grapheme.width().min(2);
        if width == 0 {
            self.append_to_previous(grapheme);
            return;
        }
        // A single-column grid cannot hold a wide character
        let width = if self.cols < 2 { 1 } else { width };

        if self.cursor.pending_wrap {
            self.wrap_cursor();
        }

        if width == 2 && self.cursor.col + 1 >= self.cols {
            if self.modes.autowrap() {
                let (col, row) = (self.cursor.col, self.cursor.row);
                self.erase_cells(row, col, col + 1);
                self.wrap_cursor();
            } else {
                self.cursor.col = self.cols - 2;
            }
        }

        let (col, row) = (self.cursor.col, self.cursor.row);
        self.erase_cells(row, col, col + width);

        let lead = self.pen_cell(grapheme, width as u8);
        let continuation = (width == 2).then(|| self.pen_cell("", 0));
        if let Some(line) = self.grid.get_mut(row) {
            if let Some(cell) = line.cells.get_mut(col) {
                *cell = lead;
            }
            if let Some(continuation) = continuation {
                if let Some(cell) = line.cells.get_mut(col + 1) {
                    *cell = continuation;
                }
            }
        }

        let new_col = col + width;
        if new_col >= self.cols {
            self.cursor.col = self.cols - 1;
            self.cursor.pending_wrap = self.modes.autowrap();
        } else {
            self.cursor.col = new_col;
        }
    }

    /// Attach a zero-width cluster to the cell before the cursor
    fn append_to_previous(&mut self, grapheme: &str) {
        let row = self.cursor.row;
        let mut col = if self.cursor.pending_wrap {
            self.cursor.col
        } else if self.cursor.col > 0 {
            self.cursor.col - 1
        } else {
            trace!("zero-width text with nothing to attach to");
            return;
        };
        if col > 0 && self.is_continuation(col, row) {
            col -= 1;
        }
        if let Some(cell) = self.grid.get_mut(row).and_then(|line| line.cells.get_mut(col)) {
            cell.content.push_str(grapheme);
        }
    }

    /// Deferred wrap: column 0 of the next row, scrolling at the bottom margin
    fn wrap_cursor(&mut self) {
        if let Some(line) = self.grid.get_mut(self.cursor.row) {
            line.wrapped = true;
        }
        self.cursor.pending_wrap = false;
        self.cursor.col = 0;
        self.advance_row();
    }

    fn advance_row(&mut self) {
        if self.cursor.row == self.scroll_bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
    }

    /// Handle linefeed (LF). Column and deferred wrap are left alone.
    pub fn linefeed(&mut self) {
        self.advance_row();
    }

    /// Handle carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Handle horizontal tab (HT)
    pub fn tab(&mut self) {
        let col = self.cursor.col;
        let target = ((col / self.tab_width + 1) * self.tab_width).min(self.cols - 1);
        if target != col {
            self.cursor.col = target;
            self.cursor.pending_wrap = false;
        }
    }

    /// Scroll the region up by n lines. Lines leaving the top of a region
    /// that starts at row 0 go to scrollback.
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        let n = n.min(bottom - top + 1);
        for _ in 0..n {
            let mut line = self.grid.remove(top);
            release_graphics(&mut self.graphics, &mut line.cells);
            if top == 0 {
                self.scrollback.push(line);
            }
            self.grid.insert(bottom, Line::new(self.cols));
        }
    }

    /// Move the cursor to a 0-indexed position. In origin mode the row is
    /// relative to the scroll region and confined to it.
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        let (row, max_row) = if self.modes.origin() {
            (self.scroll_top.saturating_add(row), self.scroll_bottom)
        } else {
            (row, self.rows - 1)
        };
        self.cursor.row = row.min(max_row);
        self.cursor.col = col.min(self.cols - 1);
        self.cursor.pending_wrap = false;
    }

    /// Set scroll region (DECSTBM) from 1-indexed inclusive margins
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let last = self.rows - 1;
        let top0 = top.saturating_sub(1).min(last);
        let bottom0 = bottom.saturating_sub(1).min(last);

        if top0 < bottom0 {
            if bottom > self.rows {
                warn!(bottom, rows = self.rows, "scroll region clamped to screen");
            }
            self.scroll_top = top0;
            self.scroll_bottom = bottom0;
        } else {
            warn!(top, bottom, "degenerate scroll region, using full screen");
            self.scroll_top = 0;
            self.scroll_bottom = last;
        }
        self.move_cursor_to(0, 0);
    }

    /// Reset scroll region to full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.move_cursor_to(0, 0);
    }

    /// Erase in display (ED). The cursor does not move.
    pub fn erase_in_display(&mut self, mode: ClearMode) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        let cols = self.cols;
        match mode {
            ClearMode::ToEnd => {
                self.erase_cells(row, col, cols);
                for r in row + 1..self.rows {
                    self.erase_cells(r, 0, cols);
                }
            }
            ClearMode::ToStart => {
                for r in 0..row {
                    self.erase_cells(r, 0, cols);
                }
                self.erase_cells(row, 0, col + 1);
            }
            ClearMode::All | ClearMode::AllAndScrollback => {
                for r in 0..self.rows {
                    self.erase_cells(r, 0, cols);
                }
                if mode == ClearMode::AllAndScrollback {
                    self.scrollback.clear();
                }
            }
        }
    }

    /// Erase in line (EL). The cursor does not move.
    pub fn erase_in_line(&mut self, mode: LineClearMode) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        match mode {
            LineClearMode::ToEnd => self.erase_cells(row, col, self.cols),
            LineClearMode::ToStart => self.erase_cells(row, 0, col + 1),
            LineClearMode::All => self.erase_cells(row, 0, self.cols),
        }
    }

    /// Save cursor (DECSC / SCP)
    pub fn save_cursor(&mut self) {
        self.saved_cursor = Some(self.cursor.save());
    }

    /// Restore cursor (DECRC / RCP); without a prior save this does nothing
    pub fn restore_cursor(&mut self) {
        match self.saved_cursor {
            Some(saved) => self.cursor.restore(&saved, self.cols, self.rows),
            None => trace!("restore without saved cursor"),
        }
    }

    /// Set or reset a DEC private mode
    pub fn set_private_mode(&mut self, code: u32, enabled: bool) {
        self.modes.set(code, enabled);
        match code {
            modes::AUTOWRAP if !enabled => self.cursor.pending_wrap = false,
            modes::ORIGIN => self.move_cursor_to(0, 0),
            _ => {}
        }
    }

    /// Anchor a graphic payload at the cursor cell. The cursor does not move.
    pub fn place_graphic(&mut self, payload: &str) -> GraphicId {
        let id = self.graphics.intern(payload);
        let (col, row) = (self.cursor.col, self.cursor.row);
        match self.grid.get_mut(row).and_then(|line| line.cells.get_mut(col)) {
            Some(cell) => {
                if let Some(old) = cell.graphic.replace(id) {
                    self.graphics.release(old);
                }
            }
            None => {
                self.graphics.release(id);
            }
        }
        id
    }

    /// Drop the graphic reference held by a cell, if any
    pub fn release_graphic_at(&mut self, col: usize, row: usize) -> bool {
        let graphic = self
            .grid
            .get_mut(row)
            .and_then(|line| line.cells.get_mut(col))
            .and_then(|cell| cell.graphic.take());
        match graphic {
            Some(id) => {
                self.graphics.release(id);
                true
            }
            None => false,
        }
    }

    /// The graphic anchored at a cell
    pub fn graphic_at(&self, col: usize, row: usize) -> Option<GraphicId> {
        self.cell(col, row)?.graphic
    }

    /// Resize the screen. Rows are cut from or added at the bottom, columns
    /// at the right. Margins reset to the full screen.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        let new_cols = new_cols.max(1);
        let new_rows = new_rows.max(1);
        if new_cols == self.cols && new_rows == self.rows {
            return;
        }

        for mut line in self.grid.drain(new_rows.min(self.grid.len())..) {
            release_graphics(&mut self.graphics, &mut line.cells);
        }
        self.grid.resize_with(new_rows, || Line::new(new_cols));

        for line in &mut self.grid {
            if line.cells.len() > new_cols {
                release_graphics(&mut self.graphics, &mut line.cells[new_cols..]);
                line.cells.truncate(new_cols);
                // A wide character whose continuation was cut off
                if let Some(last) = line.cells.last_mut().filter(|cell| cell.is_wide()) {
                    if let Some(id) = last.erase() {
                        self.graphics.release(id);
                    }
                }
            } else {
                line.cells.resize(new_cols, Cell::default());
            }
        }

        let cols_changed = new_cols != self.cols;
        self.cols = new_cols;
        self.rows = new_rows;
        self.scroll_top = 0;
        self.scroll_bottom = new_rows - 1;

        let grid = (new_cols, new_rows, cols_changed);
        let cursor = &mut self.cursor;
        fit_position(&mut cursor.col, &mut cursor.row, &mut cursor.pending_wrap, grid);
        if let Some(saved) = self.saved_cursor.as_mut() {
            fit_position(&mut saved.col, &mut saved.row, &mut saved.pending_wrap, grid);
        }
    }
}

/// Clamp a cursor position into a resized grid. A deferred wrap only
/// survives when the cursor keeps its place on an unchanged last column.
fn fit_position(
    col: &mut usize,
    row: &mut usize,
    pending_wrap: &mut bool,
    (cols, rows, cols_changed): (usize, usize, bool),
) {
    if cols_changed || *col >= cols || *row >= rows {
        *pending_wrap = false;
    }
    *col = (*col).min(cols - 1);
    *row = (*row).min(rows - 1);
}
