//! Cursor state management
//!
//! The cursor tracks position, the deferred-wrap flag and the pen used for
//! new text. Save/restore (DECSC/DECRC and CSI s/u) share a single slot that
//! captures position, deferred wrap and pen.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Color, Style};

/// Cursor shape/style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Block cursor (filled rectangle)
    #[default]
    Block,
    /// Underline cursor
    Underline,
    /// Vertical bar cursor
    Bar,
}

impl CursorShape {
    /// Decode a DECSCUSR code into a shape and blink flag
    pub fn from_code(code: u32) -> Option<(Self, bool)> {
        match code {
            0 | 1 => Some((CursorShape::Block, true)),
            2 => Some((CursorShape::Block, false)),
            3 => Some((CursorShape::Underline, true)),
            4 => Some((CursorShape::Underline, false)),
            5 => Some((CursorShape::Bar, true)),
            6 => Some((CursorShape::Bar, false)),
            _ => None,
        }
    }
}

/// Colors and attributes applied to newly written text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Pen {
    /// Apply an SGR parameter string such as `"1;38;5;196"` or `"38:2::0:0:255"`.
    /// The empty string resets, like `"0"`.
    pub fn apply_sgr(&mut self, params: &str) {
        if params.is_empty() {
            *self = Self::default();
            return;
        }

        let mut fields = params.split(';').map(sgr_field);
        while let Some(field) = fields.next() {
            let Some(parts) = field else {
                debug!(params, "malformed SGR field");
                continue;
            };
            let Some((&code, sub)) = parts.split_first() else {
                continue;
            };

            match code {
                0 => *self = Self::default(),
                1 => self.style.bold = true,
                2 => self.style.faint = true,
                3 => self.style.italic = true,
                4 => self.style.underline = true,
                5 | 6 => self.style.blink = true,
                7 => self.style.inverse = true,
                8 => self.style.hidden = true,
                9 => self.style.strikethrough = true,

                21 => self.style.bold = false,
                22 => {
                    self.style.bold = false;
                    self.style.faint = false;
                }
                23 => self.style.italic = false,
                24 => self.style.underline = false,
                25 => self.style.blink = false,
                27 => self.style.inverse = false,
                28 => self.style.hidden = false,
                29 => self.style.strikethrough = false,

                30..=37 => self.fg = Color::Indexed(palette_index(code - 30)),
                38 => {
                    if let Some(color) = extended_color(sub, &mut fields) {
                        self.fg = color;
                    }
                }
                39 => self.fg = Color::Default,

                40..=47 => self.bg = Color::Indexed(palette_index(code - 40)),
                48 => {
                    if let Some(color) = extended_color(sub, &mut fields) {
                        self.bg = color;
                    }
                }
                49 => self.bg = Color::Default,

                // Underline color is accepted but not tracked
                58 => {
                    let _ = extended_color(sub, &mut fields);
                }

                90..=97 => self.fg = Color::Indexed(palette_index(code - 90 + 8)),
                100..=107 => self.bg = Color::Indexed(palette_index(code - 100 + 8)),

                _ => {
                    debug!(code, "unknown SGR parameter");
                }
            }
        }
    }
}

/// One `;`-separated SGR field split on `:`. Empty parts read as 0.
fn sgr_field(field: &str) -> Option<Vec<u32>> {
    field
        .split(':')
        .map(|part| if part.is_empty() { Some(0) } else { part.parse().ok() })
        .collect()
}

fn palette_index(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

/// Decode a 38/48/58 color. The colon form carries its arguments in `sub`;
/// the semicolon form pulls them from the following fields.
fn extended_color<I>(sub: &[u32], fields: &mut I) -> Option<Color>
where
    I: Iterator<Item = Option<Vec<u32>>>,
{
    if !sub.is_empty() {
        return match sub {
            [5, index, ..] => Some(Color::Indexed(palette_index(*index))),
            // With and without the color-space slot
            [2, _, r, g, b, ..] | [2, r, g, b] => Some(Color::Rgb(
                palette_index(*r),
                palette_index(*g),
                palette_index(*b),
            )),
            _ => None,
        };
    }

    let mut next = || fields.next().flatten().and_then(|parts| parts.first().copied());
    match next()? {
        5 => Some(Color::Indexed(palette_index(next()?))),
        2 => {
            let r = next()?;
            let g = next()?;
            let b = next()?;
            Some(Color::Rgb(palette_index(r), palette_index(g), palette_index(b)))
        }
        _ => None,
    }
}

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// The cursor sits on the last column and the next glyph wraps first
    pub pending_wrap: bool,
    /// Current colors and attributes
    pub pen: Pen,
    /// Open OSC 8 hyperlink (0 = none)
    pub hyperlink_id: u32,
    /// Cursor shape
    pub shape: CursorShape,
    /// Whether cursor is blinking
    pub blinking: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            pending_wrap: false,
            pen: Pen::default(),
            hyperlink_id: 0,
            shape: CursorShape::Block,
            blinking: true,
        }
    }
}

/// Saved cursor state, shared by both save/restore encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub pending_wrap: bool,
    pub pen: Pen,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Apply a DECSCUSR code; unknown codes leave the shape alone
    pub fn set_shape(&mut self, code: u32) {
        match CursorShape::from_code(code) {
            Some((shape, blinking)) => {
                self.shape = shape;
                self.blinking = blinking;
            }
            None => debug!(code, "unknown cursor shape"),
        }
    }

    /// Save cursor state
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            col: self.col,
            row: self.row,
            pending_wrap: self.pending_wrap,
            pen: self.pen,
        }
    }

    /// Restore cursor state, clamping into the current grid
    pub fn restore(&mut self, saved: &SavedCursor, cols: usize, rows: usize) {
        let clamped_col = saved.col.min(cols.saturating_sub(1));
        self.col = clamped_col;
        self.row = saved.row.min(rows.saturating_sub(1));
        // A wrap pending on a column that no longer exists is dropped
        self.pending_wrap = saved.pending_wrap && clamped_col == saved.col;
        self.pen = saved.pen;
    }
}
