//! Terminal Executor
//!
//! Ties together the tokenizer and the screen model and applies tokens to
//! update terminal state. This is the main integration point between
//! parsing and the screen model, and the query surface automation uses.
//!
//! Tokens that need no grid change but matter to a collaborator (frame
//! markers, unrecognized sequences, unhandled OSC commands) are queued as
//! [`TerminalEvent`]s in apply order.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TerminalConfig;
use crate::core::{
    modes, Cell, Cursor, GraphicId, Hyperlink, Screen, Snapshot, TrackedGraphic,
};
use crate::parser::{AnsiToken, ControlKind, CursorVariant, ScrollMargins, Tokenizer};

/// Events kept before the oldest are dropped
const MAX_PENDING_EVENTS: usize = 4096;

/// Something a collaborator may want to observe after an apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalEvent {
    FrameBegin,
    FrameEnd,
    /// Raw text of a sequence the tokenizer did not understand
    Unrecognized(String),
    /// An OSC command the terminal does not act on
    Osc {
        command: String,
        params: String,
        payload: String,
    },
}

/// Emulated terminal: screen state plus the title, hyperlink table and
/// event queue fed by applied tokens
#[derive(Debug, Clone)]
pub struct Terminal {
    screen: Screen,
    /// Incremental tokenizer used by [`Terminal::process`]
    tokenizer: Tokenizer,
    title: String,
    icon_name: String,
    /// Indexed by ID - 1
    hyperlinks: Vec<Hyperlink>,
    /// (uri, params) to ID
    hyperlink_ids: HashMap<(String, String), u32>,
    events: VecDeque<TerminalEvent>,
}

impl Terminal {
    /// Create a new terminal with the given dimensions
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_config(&TerminalConfig::with_size(cols, rows))
    }

    pub fn with_config(config: &TerminalConfig) -> Self {
        let mut screen = Screen::new(config.cols, config.rows, config.scrollback_lines);
        screen.set_tab_width(config.tab_width);
        if !config.autowrap {
            screen.set_private_mode(modes::AUTOWRAP, false);
        }
        Self {
            screen,
            tokenizer: Tokenizer::new(),
            title: String::new(),
            icon_name: String::new(),
            hyperlinks: Vec::new(),
            hyperlink_ids: HashMap::new(),
            events: VecDeque::new(),
        }
    }

    /// Get a reference to the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn cols(&self) -> usize {
        self.screen.cols()
    }

    pub fn rows(&self) -> usize {
        self.screen.rows()
    }

    /// Feed a chunk of output. Sequences split across chunks are held
    /// until complete.
    pub fn process(&mut self, chunk: &str) {
        let tokens = self.tokenizer.feed(chunk);
        self.apply(&tokens);
    }

    /// Apply whatever [`process`](Self::process) is still holding back
    pub fn finish_input(&mut self) {
        let tokens = self.tokenizer.finish();
        self.apply(&tokens);
    }

    /// Apply tokens in order
    pub fn apply(&mut self, tokens: &[AnsiToken]) {
        for token in tokens {
            self.apply_token(token);
        }
    }

    /// Apply a single token to the screen
    pub fn apply_token(&mut self, token: &AnsiToken) {
        trace!(?token, "apply");
        match token {
            AnsiToken::Text(text) => {
                for grapheme in text.graphemes(true) {
                    self.screen.print(grapheme);
                }
            }
            AnsiToken::Control(kind) => match kind {
                ControlKind::LineFeed => self.screen.linefeed(),
                ControlKind::CarriageReturn => self.screen.carriage_return(),
                ControlKind::Tab => self.screen.tab(),
            },
            AnsiToken::Sgr(params) => {
                self.screen.cursor_mut().pen.apply_sgr(params);
            }
            AnsiToken::CursorPosition { row, col } => {
                self.screen
                    .move_cursor_to(one_based(*row), one_based(*col));
            }
            AnsiToken::CursorShape(code) => {
                self.screen.cursor_mut().set_shape(*code);
            }
            AnsiToken::ClearScreen(mode) => self.screen.erase_in_display(*mode),
            AnsiToken::ClearLine(mode) => self.screen.erase_in_line(*mode),
            AnsiToken::ScrollRegion(ScrollMargins::Reset) => {
                self.screen.reset_scroll_region();
            }
            AnsiToken::ScrollRegion(ScrollMargins::Region { top, bottom }) => {
                self.screen
                    .set_scroll_region(*top as usize, *bottom as usize);
            }
            AnsiToken::SaveCursor(CursorVariant::Dec | CursorVariant::Ansi) => {
                self.screen.save_cursor();
            }
            AnsiToken::RestoreCursor(CursorVariant::Dec | CursorVariant::Ansi) => {
                self.screen.restore_cursor();
            }
            AnsiToken::PrivateMode { code, enabled } => {
                self.screen.set_private_mode(*code, *enabled);
            }
            AnsiToken::Osc {
                command,
                params,
                payload,
            } => self.dispatch_osc(command, params, payload),
            AnsiToken::Dcs(payload) => {
                let id = self.screen.place_graphic(payload);
                debug!(id = id.0, bytes = payload.len(), "graphic placed");
            }
            AnsiToken::Unrecognized(raw) => {
                debug!(raw = ?raw, "unrecognized sequence");
                self.push_event(TerminalEvent::Unrecognized(raw.clone()));
            }
            AnsiToken::FrameBegin => self.push_event(TerminalEvent::FrameBegin),
            AnsiToken::FrameEnd => self.push_event(TerminalEvent::FrameEnd),
        }
    }

    /// Execute an OSC sequence
    fn dispatch_osc(&mut self, command: &str, params: &str, payload: &str) {
        match command {
            "0" => {
                self.title = osc_text(params, payload);
                self.icon_name = self.title.clone();
            }
            "1" => self.icon_name = osc_text(params, payload),
            "2" => self.title = osc_text(params, payload),
            "8" => {
                let id = if payload.is_empty() {
                    0
                } else {
                    self.register_hyperlink(payload, params)
                };
                self.screen.cursor_mut().hyperlink_id = id;
            }
            _ => {
                debug!(command, "unhandled OSC");
                self.push_event(TerminalEvent::Osc {
                    command: command.to_string(),
                    params: params.to_string(),
                    payload: payload.to_string(),
                });
            }
        }
    }

    /// Register a hyperlink target and return its ID, reusing an existing
    /// entry with the same URI and parameters
    fn register_hyperlink(&mut self, uri: &str, params: &str) -> u32 {
        let key = (uri.to_string(), params.to_string());
        if let Some(&id) = self.hyperlink_ids.get(&key) {
            return id;
        }
        let Ok(id) = u32::try_from(self.hyperlinks.len() + 1) else {
            warn!(uri, "hyperlink table full");
            return 0;
        };
        self.hyperlinks.push(Hyperlink {
            id,
            uri: key.0.clone(),
            params: key.1.clone(),
        });
        self.hyperlink_ids.insert(key, id);
        id
    }

    fn push_event(&mut self, event: TerminalEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            warn!("event queue full, dropping oldest");
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Drain queued events in apply order
    pub fn take_events(&mut self) -> Vec<TerminalEvent> {
        self.events.drain(..).collect()
    }

    /// Queued events without draining them
    pub fn events(&self) -> impl Iterator<Item = &TerminalEvent> {
        self.events.iter()
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.screen.cell(col, row)
    }

    /// Text of a row, trailing blanks trimmed
    pub fn line_text(&self, row: usize) -> Option<String> {
        self.screen.line_text(row)
    }

    /// Current value of a DEC private mode
    pub fn mode(&self, code: u32) -> bool {
        self.screen.modes().get(code)
    }

    pub fn cursor(&self) -> &Cursor {
        self.screen.cursor()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn hyperlink(&self, id: u32) -> Option<&Hyperlink> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.hyperlinks.get(index)
    }

    /// The hyperlink covering a cell
    pub fn hyperlink_at(&self, col: usize, row: usize) -> Option<&Hyperlink> {
        match self.cell(col, row)?.hyperlink_id {
            0 => None,
            id => self.hyperlink(id),
        }
    }

    /// Number of live graphic objects
    pub fn tracked_object_count(&self) -> usize {
        self.screen.graphics().len()
    }

    /// The graphic object anchored at a cell
    pub fn tracked_object_at(&self, col: usize, row: usize) -> Option<&TrackedGraphic> {
        let id = self.screen.graphic_at(col, row)?;
        self.screen.graphics().get(id)
    }

    pub fn tracked_object(&self, id: GraphicId) -> Option<&TrackedGraphic> {
        self.screen.graphics().get(id)
    }

    /// Capture the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.screen, &self.title)
    }

    /// Resize the terminal
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.screen.resize(cols, rows);
    }
}

/// 1-based protocol coordinate to 0-based index
fn one_based(n: u32) -> usize {
    (n as usize).saturating_sub(1)
}

/// OSC text that may itself contain the `;` the split consumed
fn osc_text(params: &str, payload: &str) -> String {
    if params.is_empty() {
        payload.to_string()
    } else {
        format!("{params};{payload}")
    }
}
