//! Protocol tokens
//!
//! One decoded unit of terminal protocol. The tokenizer produces these, the
//! serializer turns them back into canonical escape text, and the terminal
//! applies them to the screen model.

use serde::{Deserialize, Serialize};

/// APC body that marks the start of an application frame.
pub const FRAME_BEGIN_PAYLOAD: &str = "HEX1BAPP:FRAME:BEGIN";
/// APC body that marks the end of an application frame.
pub const FRAME_END_PAYLOAD: &str = "HEX1BAPP:FRAME:END";

/// A single token of terminal protocol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnsiToken {
    /// Printable text. May hold multi-codepoint grapheme clusters.
    Text(String),

    /// LF, CR or HT
    Control(ControlKind),

    /// SGR parameters, kept verbatim (`""` and `"0"` are distinct)
    Sgr(String),

    /// CUP - 1-based row and column
    CursorPosition { row: u32, col: u32 },

    /// DECSCUSR - `CSI Ps SP q`
    CursorShape(u32),

    /// ED - Erase in Display
    ClearScreen(ClearMode),

    /// EL - Erase in Line
    ClearLine(LineClearMode),

    /// DECSTBM - Set Top and Bottom Margins
    ScrollRegion(ScrollMargins),

    /// DECSC (`ESC 7`) or SCP (`CSI s`)
    SaveCursor(CursorVariant),

    /// DECRC (`ESC 8`) or RCP (`CSI u`)
    RestoreCursor(CursorVariant),

    /// DECSET / DECRST for a single private mode code
    PrivateMode { code: u32, enabled: bool },

    /// OSC, split into command, params and payload
    Osc {
        command: String,
        params: String,
        payload: String,
    },

    /// DCS body, uninterpreted
    Dcs(String),

    /// Anything else, exactly as it appeared in the input
    Unrecognized(String),

    /// `ESC _ HEX1BAPP:FRAME:BEGIN ESC \`
    FrameBegin,

    /// `ESC _ HEX1BAPP:FRAME:END ESC \`
    FrameEnd,
}

impl AnsiToken {
    /// Create a text token
    pub fn text(s: impl Into<String>) -> Self {
        AnsiToken::Text(s.into())
    }

    /// Create an SGR token
    pub fn sgr(params: impl Into<String>) -> Self {
        AnsiToken::Sgr(params.into())
    }

    /// Create an OSC token
    pub fn osc(
        command: impl Into<String>,
        params: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        AnsiToken::Osc {
            command: command.into(),
            params: params.into(),
            payload: payload.into(),
        }
    }

    /// Check if this is one of the two frame markers
    pub fn is_frame_marker(&self) -> bool {
        matches!(self, AnsiToken::FrameBegin | AnsiToken::FrameEnd)
    }

    /// Check if this is a text token
    pub fn is_text(&self) -> bool {
        matches!(self, AnsiToken::Text(_))
    }

    /// Check if this token was not understood by the tokenizer
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, AnsiToken::Unrecognized(_))
    }
}

/// Control characters that get their own token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// LF - Line Feed
    LineFeed,
    /// CR - Carriage Return
    CarriageReturn,
    /// HT - Horizontal Tab
    Tab,
}

impl ControlKind {
    /// Map a character to its control kind
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\n' => Some(ControlKind::LineFeed),
            '\r' => Some(ControlKind::CarriageReturn),
            '\t' => Some(ControlKind::Tab),
            _ => None,
        }
    }

    /// The literal control character
    pub fn as_char(self) -> char {
        match self {
            ControlKind::LineFeed => '\n',
            ControlKind::CarriageReturn => '\r',
            ControlKind::Tab => '\t',
        }
    }
}

/// ED modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClearMode {
    /// From the cursor to the end of the screen
    #[default]
    ToEnd,
    /// From the start of the screen to the cursor
    ToStart,
    /// The whole screen
    All,
    /// The whole screen plus scrollback
    AllAndScrollback,
}

impl ClearMode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ClearMode::ToEnd),
            1 => Some(ClearMode::ToStart),
            2 => Some(ClearMode::All),
            3 => Some(ClearMode::AllAndScrollback),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ClearMode::ToEnd => 0,
            ClearMode::ToStart => 1,
            ClearMode::All => 2,
            ClearMode::AllAndScrollback => 3,
        }
    }
}

/// EL modes. There is no scrollback variant for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineClearMode {
    #[default]
    ToEnd,
    ToStart,
    All,
}

impl LineClearMode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(LineClearMode::ToEnd),
            1 => Some(LineClearMode::ToStart),
            2 => Some(LineClearMode::All),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            LineClearMode::ToEnd => 0,
            LineClearMode::ToStart => 1,
            LineClearMode::All => 2,
        }
    }
}

/// Scroll margins carried by DECSTBM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollMargins {
    /// `CSI r` - full screen
    Reset,
    /// `CSI t;b r` - 1-based, inclusive
    Region { top: u32, bottom: u32 },
}

/// Which encoding a save/restore cursor token came from.
/// Both variants share the same saved-cursor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorVariant {
    /// `ESC 7` / `ESC 8`
    Dec,
    /// `CSI s` / `CSI u`
    Ansi,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_mode_codes() {
        for code in 0..4 {
            assert_eq!(ClearMode::from_code(code).unwrap().code(), code);
        }
        assert_eq!(ClearMode::from_code(4), None);
        assert_eq!(LineClearMode::from_code(3), None);
        assert_eq!(LineClearMode::from_code(2), Some(LineClearMode::All));
    }

    #[test]
    fn test_control_kind_chars() {
        assert_eq!(ControlKind::from_char('\n'), Some(ControlKind::LineFeed));
        assert_eq!(ControlKind::from_char('\r'), Some(ControlKind::CarriageReturn));
        assert_eq!(ControlKind::from_char('\t'), Some(ControlKind::Tab));
        assert_eq!(ControlKind::from_char('\x07'), None);
        assert_eq!(ControlKind::Tab.as_char(), '\t');
    }

    #[test]
    fn test_frame_markers_compare_by_variant() {
        let a = AnsiToken::FrameBegin;
        let b = AnsiToken::FrameBegin;
        assert_eq!(a, b);
        assert_ne!(a, AnsiToken::FrameEnd);
        assert!(a.is_frame_marker());
        assert!(!AnsiToken::text("x").is_frame_marker());
    }

    #[test]
    fn test_token_serde() {
        let token = AnsiToken::osc("8", "id=1", "https://example.com");
        let json = serde_json::to_string(&token).unwrap();
        let restored: AnsiToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, restored);
    }
}
