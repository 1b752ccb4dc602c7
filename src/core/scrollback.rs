//! Grid lines and the scrollback buffer
//!
//! Rows scrolled off the top of the screen are kept in a bounded buffer,
//! oldest first. Lines entering the scrollback never carry graphic
//! references; the screen releases those before pushing.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The cells in this line
    pub cells: Vec<Cell>,
    /// Whether the following line continues this one after an autowrap
    pub wrapped: bool,
}

impl Line {
    /// Create a blank line with the given number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
            wrapped: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Get a cell at the given column
    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Text content with blanks as spaces and trailing spaces trimmed
    pub fn text(&self) -> String {
        let text: String = self.cells.iter().map(Cell::display_str).collect();
        text.trim_end().to_string()
    }
}

/// Bounded scrollback, oldest line first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrollback {
    lines: VecDeque<Line>,
    capacity: usize,
}

impl Scrollback {
    /// Create a new scrollback buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            // Don't pre-allocate too much
            lines: VecDeque::with_capacity(capacity.min(1000)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a line, evicting the oldest once full
    pub fn push(&mut self, line: Line) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Line by age, 0 being the oldest
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
