//! Canonical serializer
//!
//! Turns tokens back into escape text. Each token has exactly one encoding,
//! the shortest one that tokenizes back to the same token. Unrecognized
//! sequences are written out unchanged.

use std::fmt::{self, Write};

use super::token::{
    AnsiToken, ClearMode, CursorVariant, LineClearMode, ScrollMargins, FRAME_BEGIN_PAYLOAD,
    FRAME_END_PAYLOAD,
};

const CSI: &str = "\x1b[";
const OSC: &str = "\x1b]";
const DCS: &str = "\x1bP";
const APC: &str = "\x1b_";
const ST: &str = "\x1b\\";
const BEL: char = '\x07';

/// Serialize a token sequence by concatenating each token's canonical form
pub fn serialize(tokens: &[AnsiToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        // Writing into a String cannot fail
        let _ = write!(out, "{token}");
    }
    out
}

/// Serialize a single token
pub fn serialize_token(token: &AnsiToken) -> String {
    token.to_string()
}

impl fmt::Display for AnsiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnsiToken::Text(text) => f.write_str(text),
            AnsiToken::Control(kind) => f.write_char(kind.as_char()),
            AnsiToken::Sgr(params) => write!(f, "{CSI}{params}m"),
            AnsiToken::CursorPosition { row, col } => match (*row, *col) {
                (1, 1) => write!(f, "{CSI}H"),
                (row, 1) => write!(f, "{CSI}{row}H"),
                (row, col) => write!(f, "{CSI}{row};{col}H"),
            },
            AnsiToken::CursorShape(0) => write!(f, "{CSI} q"),
            AnsiToken::CursorShape(code) => write!(f, "{CSI}{code} q"),
            AnsiToken::ClearScreen(ClearMode::ToEnd) => write!(f, "{CSI}J"),
            AnsiToken::ClearScreen(mode) => write!(f, "{CSI}{}J", mode.code()),
            AnsiToken::ClearLine(LineClearMode::ToEnd) => write!(f, "{CSI}K"),
            AnsiToken::ClearLine(mode) => write!(f, "{CSI}{}K", mode.code()),
            AnsiToken::ScrollRegion(ScrollMargins::Reset) => write!(f, "{CSI}r"),
            AnsiToken::ScrollRegion(ScrollMargins::Region { top, bottom }) => {
                write!(f, "{CSI}{top};{bottom}r")
            }
            AnsiToken::SaveCursor(CursorVariant::Dec) => f.write_str("\x1b7"),
            AnsiToken::SaveCursor(CursorVariant::Ansi) => write!(f, "{CSI}s"),
            AnsiToken::RestoreCursor(CursorVariant::Dec) => f.write_str("\x1b8"),
            AnsiToken::RestoreCursor(CursorVariant::Ansi) => write!(f, "{CSI}u"),
            AnsiToken::PrivateMode { code, enabled } => {
                write!(f, "{CSI}?{code}{}", if *enabled { 'h' } else { 'l' })
            }
            AnsiToken::Osc {
                command,
                params,
                payload,
            } => write!(f, "{OSC}{command};{params};{payload}{BEL}"),
            AnsiToken::Dcs(payload) => write!(f, "{DCS}{payload}{ST}"),
            AnsiToken::Unrecognized(raw) => f.write_str(raw),
            AnsiToken::FrameBegin => write!(f, "{APC}{FRAME_BEGIN_PAYLOAD}{ST}"),
            AnsiToken::FrameEnd => write!(f, "{APC}{FRAME_END_PAYLOAD}{ST}"),
        }
    }
}
