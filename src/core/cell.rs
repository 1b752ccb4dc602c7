//! Grid cells
//!
//! A cell holds one grapheme cluster with its colors, style, and optional
//! hyperlink and graphic references.

use serde::{Deserialize, Serialize};

use super::graphics::GraphicId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The grapheme cluster in this cell. Empty for blank cells and for the
    /// continuation half of a wide character.
    pub content: String,
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
    /// 0 when the cell is not part of a link
    pub hyperlink_id: u32,
    pub graphic: Option<GraphicId>,
    /// Display columns taken by `content`: 1 normally, 2 for the lead half of a
    /// wide character, 0 for its continuation
    pub width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: String::new(),
            fg: Color::Default,
            bg: Color::Default,
            style: Style::default(),
            hyperlink_id: 0,
            graphic: None,
            width: 1,
        }
    }
}

impl Cell {
    pub fn new(c: char) -> Self {
        Self {
            content: c.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Right half of a wide character
    pub fn is_wide_continuation(&self) -> bool {
        self.width == 0
    }

    pub fn is_wide(&self) -> bool {
        self.width == 2
    }

    /// The text this cell contributes to a line: a space when blank, nothing
    /// for a wide continuation
    pub fn display_str(&self) -> &str {
        match (self.is_wide_continuation(), self.content.is_empty()) {
            (true, _) => "",
            (false, true) => " ",
            (false, false) => &self.content,
        }
    }

    /// Reset to the blank cell with default style.
    ///
    /// Returns the graphic reference the cell held; the caller owns releasing it.
    #[must_use]
    pub fn erase(&mut self) -> Option<GraphicId> {
        let graphic = self.graphic.take();
        *self = Self::default();
        graphic
    }
}

/// A foreground or background color as selected by SGR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[default]
    Default,
    /// Palette entry, 0..=255
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    pub fn is_default(&self) -> bool {
        *self == Color::Default
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub inverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// An OSC 8 hyperlink target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// Nonzero ID referenced from cells
    pub id: u32,
    /// The target URI
    pub uri: String,
    /// Raw `key=value:...` parameters, usually an `id=`
    pub params: String,
}
