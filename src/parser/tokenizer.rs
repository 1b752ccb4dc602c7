//! Tokenizer
//!
//! Splits text into [`AnsiToken`]s in a single forward pass. The phases follow
//! the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>:
//!
//! - Ground: printable runs collect into one `Text` token
//! - Escape: after ESC, dispatch on the next character
//! - CSI: parameter bytes (0x30-0x3F), then intermediates (0x20-0x2F), then a
//!   final byte (0x40-0x7E)
//! - OSC/DCS/APC: string bodies terminated by ST (`ESC \`), or BEL for OSC
//!
//! Nothing here fails. A sequence that does not fit a known grammar is kept
//! verbatim as [`AnsiToken::Unrecognized`] so it can be relayed unchanged.

use unicode_segmentation::UnicodeSegmentation;

use super::token::{
    AnsiToken, ClearMode, ControlKind, CursorVariant, LineClearMode, ScrollMargins,
    FRAME_BEGIN_PAYLOAD, FRAME_END_PAYLOAD,
};

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Length of the two-character introducers (`ESC [`, `ESC ]`, `ESC P`, `ESC _`)
const INTRODUCER_LEN: usize = 2;

/// Tokenize a complete input.
///
/// An escape sequence still open at the end of `input` becomes an
/// `Unrecognized` token holding the remainder.
pub fn tokenize(input: &str) -> Vec<AnsiToken> {
    scan(input, true, 0).0
}

/// Incremental tokenizer for input that arrives in chunks.
///
/// A trailing incomplete escape sequence is held back until the next
/// [`feed`](Tokenizer::feed) completes it or [`finish`](Tokenizer::finish)
/// gives up on it. So is the last grapheme cluster of a trailing text run,
/// since the next chunk may extend it.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    pending: String,
    /// Bytes of an open OSC/DCS/APC in `pending` already searched for a terminator
    searched: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize a chunk, returning every token that is complete so far
    pub fn feed(&mut self, chunk: &str) -> Vec<AnsiToken> {
        self.pending.push_str(chunk);
        let (tokens, consumed) = scan(&self.pending, false, self.searched);
        self.pending.drain(..consumed);
        self.searched = if opens_string(&self.pending) {
            // A trailing ESC may still become ST
            self.pending.len() - usize::from(self.pending.ends_with(ESC))
        } else {
            0
        };
        if !self.pending.is_empty() {
            tracing::trace!(held = self.pending.len(), "holding incomplete input");
        }
        tokens
    }

    /// Flush whatever is buffered with end-of-input semantics
    pub fn finish(&mut self) -> Vec<AnsiToken> {
        self.searched = 0;
        let rest = std::mem::take(&mut self.pending);
        tokenize(&rest)
    }

    /// The buffered, not yet tokenized input
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drop any buffered input
    pub fn reset(&mut self) {
        self.pending.clear();
        self.searched = 0;
    }
}

fn opens_string(s: &str) -> bool {
    s.starts_with("\x1b]") || s.starts_with("\x1bP") || s.starts_with("\x1b_")
}

/// Outcome of reading one escape sequence
enum Escape {
    Complete { tokens: Vec<AnsiToken>, len: usize },
    Incomplete,
}

impl Escape {
    fn one(token: AnsiToken, len: usize) -> Self {
        Escape::Complete {
            tokens: vec![token],
            len,
        }
    }

    /// The first `len` bytes of `s`, kept verbatim
    fn raw(s: &str, len: usize) -> Self {
        Self::one(AnsiToken::Unrecognized(s[..len].to_string()), len)
    }
}

/// Tokenize as much of `input` as possible. Returns the tokens and the number
/// of bytes consumed; with `at_eof` set everything is consumed. A string
/// sequence at the start of `input` skips its first `resume` bytes when
/// looking for a terminator.
fn scan(input: &str, at_eof: bool, resume: usize) -> (Vec<AnsiToken>, usize) {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = input[pos..].chars().next() {
        if c == ESC {
            let from = if pos == 0 { resume } else { 0 };
            match read_escape(&input[pos..], at_eof, from) {
                Escape::Complete { tokens: found, len } => {
                    tokens.extend(found);
                    pos += len;
                }
                Escape::Incomplete => break,
            }
        } else if let Some(kind) = ControlKind::from_char(c) {
            tokens.push(AnsiToken::Control(kind));
            pos += c.len_utf8();
        } else if c.is_control() {
            // BEL, BS and friends relay verbatim but never reach the grid
            tokens.push(AnsiToken::Unrecognized(c.to_string()));
            pos += c.len_utf8();
        } else {
            let run = &input[pos..];
            let mut end = run.find(char::is_control).unwrap_or(run.len());
            if end == run.len() && !at_eof {
                // The last cluster may continue in the next chunk
                end = run.grapheme_indices(true).next_back().map_or(0, |(i, _)| i);
                if end == 0 {
                    break;
                }
            }
            tokens.push(AnsiToken::Text(run[..end].to_string()));
            pos += end;
        }
    }

    (tokens, pos)
}

/// An open sequence at the end of the buffer
fn unfinished(s: &str, at_eof: bool) -> Escape {
    if at_eof {
        Escape::raw(s, s.len())
    } else {
        Escape::Incomplete
    }
}

/// Read an escape sequence; `s` starts with ESC
fn read_escape(s: &str, at_eof: bool, resume: usize) -> Escape {
    let Some(next) = s[1..].chars().next() else {
        return unfinished(s, at_eof);
    };

    match next {
        '[' => read_csi(s, at_eof),
        ']' => read_string(s, at_eof, resume, true, |body, _| osc_token(body)),
        'P' => read_string(s, at_eof, resume, false, |body, _| AnsiToken::Dcs(body.to_string())),
        '_' => read_string(s, at_eof, resume, false, |body, raw| match body {
            FRAME_BEGIN_PAYLOAD => AnsiToken::FrameBegin,
            FRAME_END_PAYLOAD => AnsiToken::FrameEnd,
            _ => AnsiToken::Unrecognized(raw.to_string()),
        }),
        '7' => Escape::one(AnsiToken::SaveCursor(CursorVariant::Dec), 2),
        '8' => Escape::one(AnsiToken::RestoreCursor(CursorVariant::Dec), 2),
        _ => read_esc_dispatch(s, at_eof),
    }
}

/// Any other `ESC [intermediates] final` form, e.g. `ESC ( B`
fn read_esc_dispatch(s: &str, at_eof: bool) -> Escape {
    let mut len = 1;
    for c in s[1..].chars() {
        match c {
            ' '..='/' => len += 1,
            '0'..='~' => return Escape::raw(s, len + 1),
            // The interrupting character is tokenized on its own
            _ => return Escape::raw(s, len),
        }
    }
    unfinished(s, at_eof)
}

/// Read `ESC [ params intermediates final`
fn read_csi(s: &str, at_eof: bool) -> Escape {
    let body = &s[INTRODUCER_LEN..];
    let mut params_end: Option<usize> = None;

    for (i, c) in body.char_indices() {
        match c {
            '0'..='?' if params_end.is_none() => {}
            ' '..='/' => {
                params_end.get_or_insert(i);
            }
            '@'..='~' => {
                let split = params_end.unwrap_or(i);
                let len = INTRODUCER_LEN + i + 1;
                return Escape::Complete {
                    tokens: classify_csi(&body[..split], &body[split..i], c, &s[..len]),
                    len,
                };
            }
            _ => return Escape::raw(s, INTRODUCER_LEN + i),
        }
    }

    unfinished(s, at_eof)
}

/// Map a complete CSI sequence to tokens
fn classify_csi(params: &str, intermediates: &str, final_char: char, raw: &str) -> Vec<AnsiToken> {
    let token = match (intermediates, final_char) {
        ("", 'H') => cursor_position(params),
        ("", 'J') => single_param(params)
            .and_then(ClearMode::from_code)
            .map(AnsiToken::ClearScreen),
        ("", 'K') => single_param(params)
            .and_then(LineClearMode::from_code)
            .map(AnsiToken::ClearLine),
        ("", 'r') => scroll_margins(params),
        ("", 's') if params.is_empty() => Some(AnsiToken::SaveCursor(CursorVariant::Ansi)),
        ("", 'u') if params.is_empty() => Some(AnsiToken::RestoreCursor(CursorVariant::Ansi)),
        ("", 'm') if !has_private_marker(params) => Some(AnsiToken::Sgr(params.to_string())),
        ("", 'h' | 'l') => {
            if let Some(tokens) = private_modes(params, final_char == 'h') {
                return tokens;
            }
            None
        }
        (" ", 'q') => single_param(params).map(AnsiToken::CursorShape),
        _ => None,
    };

    vec![token.unwrap_or_else(|| AnsiToken::Unrecognized(raw.to_string()))]
}

/// CUP: missing or zero parameters read as 1
fn cursor_position(params: &str) -> Option<AnsiToken> {
    let values = numeric_params(params)?;
    if values.len() > 2 {
        return None;
    }
    let at = |index: usize| {
        values
            .get(index)
            .copied()
            .flatten()
            .filter(|&n| n > 0)
            .unwrap_or(1)
    };
    Some(AnsiToken::CursorPosition { row: at(0), col: at(1) })
}

/// DECSTBM: no parameters resets, exactly two sets an explicit region
fn scroll_margins(params: &str) -> Option<AnsiToken> {
    if params.is_empty() {
        return Some(AnsiToken::ScrollRegion(ScrollMargins::Reset));
    }
    match numeric_params(params)?.as_slice() {
        [Some(top), Some(bottom)] => Some(AnsiToken::ScrollRegion(ScrollMargins::Region {
            top: *top,
            bottom: *bottom,
        })),
        _ => None,
    }
}

/// `CSI ? code[;code...] h/l`, one token per code
fn private_modes(params: &str, enabled: bool) -> Option<Vec<AnsiToken>> {
    let codes = numeric_params(params.strip_prefix('?')?)?;
    if codes.is_empty() {
        return None;
    }
    codes
        .into_iter()
        .map(|code| code.map(|code| AnsiToken::PrivateMode { code, enabled }))
        .collect()
}

/// A lone numeric parameter; empty reads as 0
fn single_param(params: &str) -> Option<u32> {
    if params.is_empty() {
        Some(0)
    } else {
        parse_number(params)
    }
}

/// Split `;`-separated decimal parameters. Empty slots are `None`; any other
/// character makes the whole list invalid.
fn numeric_params(params: &str) -> Option<Vec<Option<u32>>> {
    if params.is_empty() {
        return Some(Vec::new());
    }
    params
        .split(';')
        .map(|part| {
            if part.is_empty() {
                Some(None)
            } else {
                parse_number(part).map(Some)
            }
        })
        .collect()
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    }))
}

fn has_private_marker(params: &str) -> bool {
    params.starts_with(['?', '>', '<', '='])
}

/// How a string sequence body ended
enum StringEnd {
    /// Terminated by BEL or ST
    Terminated { body_end: usize, len: usize },
    /// Another escape sequence started before a terminator
    Aborted(usize),
    Unfinished,
}

fn find_string_end(s: &str, from: usize, allow_bel: bool) -> StringEnd {
    let start = from.clamp(INTRODUCER_LEN, s.len());
    for (i, c) in s[start..].char_indices() {
        let at = start + i;
        if allow_bel && c == BEL {
            return StringEnd::Terminated {
                body_end: at,
                len: at + 1,
            };
        }
        if c == ESC {
            return match s[at + 1..].chars().next() {
                Some('\\') => StringEnd::Terminated {
                    body_end: at,
                    len: at + 2,
                },
                Some(_) => StringEnd::Aborted(at),
                None => StringEnd::Unfinished,
            };
        }
    }
    StringEnd::Unfinished
}

/// Read an OSC/DCS/APC string. `build` receives the body and the full raw text.
fn read_string<F>(s: &str, at_eof: bool, resume: usize, allow_bel: bool, build: F) -> Escape
where
    F: FnOnce(&str, &str) -> AnsiToken,
{
    match find_string_end(s, resume, allow_bel) {
        StringEnd::Terminated { body_end, len } => {
            Escape::one(build(&s[INTRODUCER_LEN..body_end], &s[..len]), len)
        }
        StringEnd::Aborted(at) => Escape::raw(s, at),
        StringEnd::Unfinished => unfinished(s, at_eof),
    }
}

/// Split an OSC body into command, params and payload.
///
/// `8;id=x;uri` splits on both delimiters. With a single delimiter, as in
/// `0;title`, params is empty and the remainder is the payload.
fn osc_token(body: &str) -> AnsiToken {
    let (command, rest) = body.split_once(';').unwrap_or((body, ""));
    let (params, payload) = rest.split_once(';').unwrap_or(("", rest));
    AnsiToken::osc(command, params, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_token() {
        let tokens = tokenize("Hello, World!");
        assert_eq!(tokens, vec![AnsiToken::text("Hello, World!")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_controls_split_text() {
        let tokens = tokenize("A\r\nB\tC");
        assert_eq!(
            tokens,
            vec![
                AnsiToken::text("A"),
                AnsiToken::Control(ControlKind::CarriageReturn),
                AnsiToken::Control(ControlKind::LineFeed),
                AnsiToken::text("B"),
                AnsiToken::Control(ControlKind::Tab),
                AnsiToken::text("C"),
            ]
        );
    }

    #[test]
    fn test_other_c0_is_unrecognized() {
        let tokens = tokenize("a\x07b\x08");
        assert_eq!(
            tokens,
            vec![
                AnsiToken::text("a"),
                AnsiToken::Unrecognized("\x07".into()),
                AnsiToken::text("b"),
                AnsiToken::Unrecognized("\x08".into()),
            ]
        );
    }

    #[test]
    fn test_cursor_position_defaults() {
        assert_eq!(
            tokenize("\x1b[H"),
            vec![AnsiToken::CursorPosition { row: 1, col: 1 }]
        );
        assert_eq!(
            tokenize("\x1b[5H"),
            vec![AnsiToken::CursorPosition { row: 5, col: 1 }]
        );
        assert_eq!(
            tokenize("\x1b[;7H"),
            vec![AnsiToken::CursorPosition { row: 1, col: 7 }]
        );
        assert_eq!(
            tokenize("\x1b[10;20H"),
            vec![AnsiToken::CursorPosition { row: 10, col: 20 }]
        );
        assert_eq!(
            tokenize("\x1b[0;0H"),
            vec![AnsiToken::CursorPosition { row: 1, col: 1 }]
        );
    }

    #[test]
    fn test_cursor_position_too_many_params() {
        assert_eq!(
            tokenize("\x1b[1;2;3H"),
            vec![AnsiToken::Unrecognized("\x1b[1;2;3H".into())]
        );
    }

    #[test]
    fn test_clear_modes() {
        assert_eq!(tokenize("\x1b[J"), vec![AnsiToken::ClearScreen(ClearMode::ToEnd)]);
        assert_eq!(tokenize("\x1b[1J"), vec![AnsiToken::ClearScreen(ClearMode::ToStart)]);
        assert_eq!(tokenize("\x1b[2J"), vec![AnsiToken::ClearScreen(ClearMode::All)]);
        assert_eq!(
            tokenize("\x1b[3J"),
            vec![AnsiToken::ClearScreen(ClearMode::AllAndScrollback)]
        );
        assert_eq!(tokenize("\x1b[K"), vec![AnsiToken::ClearLine(LineClearMode::ToEnd)]);
        assert_eq!(tokenize("\x1b[2K"), vec![AnsiToken::ClearLine(LineClearMode::All)]);
        assert_eq!(tokenize("\x1b[3K"), vec![AnsiToken::Unrecognized("\x1b[3K".into())]);
        assert_eq!(tokenize("\x1b[9J"), vec![AnsiToken::Unrecognized("\x1b[9J".into())]);
    }

    #[test]
    fn test_scroll_region() {
        assert_eq!(
            tokenize("\x1b[r"),
            vec![AnsiToken::ScrollRegion(ScrollMargins::Reset)]
        );
        assert_eq!(
            tokenize("\x1b[2;10r"),
            vec![AnsiToken::ScrollRegion(ScrollMargins::Region { top: 2, bottom: 10 })]
        );
        assert_eq!(tokenize("\x1b[4r"), vec![AnsiToken::Unrecognized("\x1b[4r".into())]);
    }

    #[test]
    fn test_cursor_shape() {
        assert_eq!(tokenize("\x1b[5 q"), vec![AnsiToken::CursorShape(5)]);
        assert_eq!(tokenize("\x1b[ q"), vec![AnsiToken::CursorShape(0)]);
    }

    #[test]
    fn test_save_restore_variants() {
        assert_eq!(
            tokenize("\x1b7\x1b8\x1b[s\x1b[u"),
            vec![
                AnsiToken::SaveCursor(CursorVariant::Dec),
                AnsiToken::RestoreCursor(CursorVariant::Dec),
                AnsiToken::SaveCursor(CursorVariant::Ansi),
                AnsiToken::RestoreCursor(CursorVariant::Ansi),
            ]
        );
    }

    #[test]
    fn test_private_modes() {
        assert_eq!(
            tokenize("\x1b[?25l"),
            vec![AnsiToken::PrivateMode { code: 25, enabled: false }]
        );
        assert_eq!(
            tokenize("\x1b[?1049;2004h"),
            vec![
                AnsiToken::PrivateMode { code: 1049, enabled: true },
                AnsiToken::PrivateMode { code: 2004, enabled: true },
            ]
        );
        // ANSI (non-private) modes are not in the known set
        assert_eq!(tokenize("\x1b[4h"), vec![AnsiToken::Unrecognized("\x1b[4h".into())]);
    }

    #[test]
    fn test_sgr_kept_verbatim() {
        assert_eq!(tokenize("\x1b[m"), vec![AnsiToken::sgr("")]);
        assert_eq!(tokenize("\x1b[0m"), vec![AnsiToken::sgr("0")]);
        assert_eq!(
            tokenize("\x1b[38:2::255:0:0;1m"),
            vec![AnsiToken::sgr("38:2::255:0:0;1")]
        );
        assert_eq!(tokenize("\x1b[>4;2m"), vec![AnsiToken::Unrecognized("\x1b[>4;2m".into())]);
    }

    #[test]
    fn test_osc_hyperlink() {
        let tokens = tokenize("\x1b]8;;https://example.com\x07Click\x1b]8;;\x07");
        assert_eq!(
            tokens,
            vec![
                AnsiToken::osc("8", "", "https://example.com"),
                AnsiToken::text("Click"),
                AnsiToken::osc("8", "", ""),
            ]
        );
    }

    #[test]
    fn test_osc_split_rules() {
        assert_eq!(tokenize("\x1b]0;My Title\x07"), vec![AnsiToken::osc("0", "", "My Title")]);
        assert_eq!(tokenize("\x1b]52;c;aGk=\x07"), vec![AnsiToken::osc("52", "c", "aGk=")]);
        assert_eq!(tokenize("\x1b]104\x07"), vec![AnsiToken::osc("104", "", "")]);
        // ST terminator is accepted too
        assert_eq!(
            tokenize("\x1b]8;id=1;http://x\x1b\\"),
            vec![AnsiToken::osc("8", "id=1", "http://x")]
        );
    }

    #[test]
    fn test_dcs_payload_uninterpreted() {
        let tokens = tokenize("\x1bPq#0;2;0;0;0#0~~@@\x1b\\X");
        assert_eq!(
            tokens,
            vec![AnsiToken::Dcs("q#0;2;0;0;0#0~~@@".into()), AnsiToken::text("X")]
        );
    }

    #[test]
    fn test_frame_markers() {
        let tokens = tokenize("\x1b_HEX1BAPP:FRAME:BEGIN\x1b\\hi\x1b_HEX1BAPP:FRAME:END\x1b\\");
        assert_eq!(
            tokens,
            vec![AnsiToken::FrameBegin, AnsiToken::text("hi"), AnsiToken::FrameEnd]
        );
    }

    #[test]
    fn test_other_apc_is_unrecognized() {
        let raw = "\x1b_Gf=100;AAAA\x1b\\";
        assert_eq!(tokenize(raw), vec![AnsiToken::Unrecognized(raw.into())]);
    }

    #[test]
    fn test_unknown_sequences_are_verbatim() {
        assert_eq!(tokenize("\x1b[5A"), vec![AnsiToken::Unrecognized("\x1b[5A".into())]);
        assert_eq!(tokenize("\x1b(B"), vec![AnsiToken::Unrecognized("\x1b(B".into())]);
        assert_eq!(tokenize("\x1bM"), vec![AnsiToken::Unrecognized("\x1bM".into())]);
    }

    #[test]
    fn test_malformed_csi_keeps_interrupting_char() {
        let tokens = tokenize("\x1b[12\nX");
        assert_eq!(
            tokens,
            vec![
                AnsiToken::Unrecognized("\x1b[12".into()),
                AnsiToken::Control(ControlKind::LineFeed),
                AnsiToken::text("X"),
            ]
        );
    }

    #[test]
    fn test_osc_aborted_by_escape() {
        let tokens = tokenize("\x1b]0;oops\x1b[2J");
        assert_eq!(
            tokens,
            vec![
                AnsiToken::Unrecognized("\x1b]0;oops".into()),
                AnsiToken::ClearScreen(ClearMode::All),
            ]
        );
    }

    #[test]
    fn test_unterminated_at_end_of_input() {
        assert_eq!(tokenize("ab\x1b[3"), vec![AnsiToken::text("ab"), AnsiToken::Unrecognized("\x1b[3".into())]);
        assert_eq!(tokenize("\x1b"), vec![AnsiToken::Unrecognized("\x1b".into())]);
        assert_eq!(tokenize("\x1bPq#0"), vec![AnsiToken::Unrecognized("\x1bPq#0".into())]);
    }

    #[test]
    fn test_huge_parameters_saturate() {
        assert_eq!(
            tokenize("\x1b[99999999999;1H"),
            vec![AnsiToken::CursorPosition { row: u32::MAX, col: 1 }]
        );
    }

    #[test]
    fn test_grapheme_clusters_stay_in_text() {
        let input = "e\u{301}👨‍👩‍👧";
        assert_eq!(tokenize(input), vec![AnsiToken::text(input)]);
    }

    #[test]
    fn test_streaming_holds_incomplete_sequence() {
        let mut tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.feed("ab\x1b["), vec![AnsiToken::text("ab")]);
        assert_eq!(tokenizer.pending(), "\x1b[");
        assert!(tokenizer.feed("1").is_empty());
        assert_eq!(
            tokenizer.feed("0;2H"),
            vec![AnsiToken::CursorPosition { row: 10, col: 2 }]
        );
        assert_eq!(tokenizer.pending(), "");
    }

    #[test]
    fn test_streaming_string_sequences() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.feed("\x1b]8;;http").is_empty());
        assert!(tokenizer.feed("://a\x1b").is_empty());
        assert_eq!(tokenizer.feed("\\"), vec![AnsiToken::osc("8", "", "http://a")]);
    }

    #[test]
    fn test_streaming_holds_last_grapheme() {
        let mut tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.feed("ab👨"), vec![AnsiToken::text("ab")]);
        assert_eq!(tokenizer.pending(), "👨");
        assert!(tokenizer.feed("\u{200D}").is_empty());
        assert_eq!(
            tokenizer.feed("👩x\r"),
            vec![
                AnsiToken::text("👨\u{200D}👩x"),
                AnsiToken::Control(ControlKind::CarriageReturn),
            ]
        );
        assert_eq!(tokenizer.feed("e"), vec![]);
        assert_eq!(tokenizer.finish(), vec![AnsiToken::text("e")]);
    }

    #[test]
    fn test_streaming_long_string_in_pieces() {
        let payload = "#0;2;0;0;0#0".to_string() + &"~".repeat(4096);
        let input = format!("\x1bP{payload}\x1b\\ok\x1b]0;t\x07");

        let mut tokenizer = Tokenizer::new();
        let mut streamed = Vec::new();
        for piece in input.as_bytes().chunks(7) {
            let piece = std::str::from_utf8(piece).unwrap();
            streamed.extend(tokenizer.feed(piece));
        }
        streamed.extend(tokenizer.finish());

        assert_eq!(streamed, tokenize(&input));
        assert_eq!(streamed[0], AnsiToken::Dcs(payload));
    }

    #[test]
    fn test_streaming_split_terminator() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.feed("\x1bPq#0").is_empty());
        assert!(tokenizer.feed("~~\x1b").is_empty());
        assert_eq!(tokenizer.pending(), "\x1bPq#0~~\x1b");
        assert_eq!(tokenizer.feed("\\"), vec![AnsiToken::Dcs("q#0~~".into())]);

        assert!(tokenizer.feed("\x1b]0;a").is_empty());
        assert_eq!(
            tokenizer.feed("\x1b[H"),
            vec![
                AnsiToken::Unrecognized("\x1b]0;a".into()),
                AnsiToken::CursorPosition { row: 1, col: 1 },
            ]
        );
    }

    #[test]
    fn test_streaming_finish_flushes_remainder() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.feed("\x1b_HEX1B").is_empty());
        assert_eq!(
            tokenizer.finish(),
            vec![AnsiToken::Unrecognized("\x1b_HEX1B".into())]
        );
        assert_eq!(tokenizer.pending(), "");
    }

    #[test]
    fn test_streaming_matches_batch() {
        let input = "\x1b[1;31mred\x1b[m\r\n\x1b]0;t\x07\x1b7x\x1b8\x1b[?25l";
        let batch = tokenize(input);

        let mut tokenizer = Tokenizer::new();
        let mut streamed = Vec::new();
        for c in input.chars() {
            streamed.extend(tokenizer.feed(&c.to_string()));
        }
        streamed.extend(tokenizer.finish());

        // Text runs may split at chunk boundaries; everything else must match
        let non_text = |tokens: &[AnsiToken]| {
            tokens.iter().filter(|t| !t.is_text()).cloned().collect::<Vec<_>>()
        };
        assert_eq!(non_text(&batch), non_text(&streamed));
    }
}
