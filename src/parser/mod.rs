//! Terminal protocol layer
//!
//! Converts text into [`AnsiToken`]s and back. Parsing never fails: anything
//! outside the known grammar is preserved as [`AnsiToken::Unrecognized`].
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod serializer;
mod token;
mod tokenizer;

pub use serializer::{serialize, serialize_token};
pub use token::{
    AnsiToken, ClearMode, ControlKind, CursorVariant, LineClearMode, ScrollMargins,
    FRAME_BEGIN_PAYLOAD, FRAME_END_PAYLOAD,
};
pub use tokenizer::{tokenize, Tokenizer};
