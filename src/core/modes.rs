//! Terminal mode flags
//!
//! DEC private modes are kept as a flag table keyed by mode code. Any code
//! can be set or reset; the few the screen acts on have named accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// DECOM - cursor addressing relative to the scroll region
pub const ORIGIN: u32 = 6;
/// DECAWM - auto wrap
pub const AUTOWRAP: u32 = 7;
/// DECTCEM - cursor visible
pub const CURSOR_VISIBLE: u32 = 25;
/// Legacy alternate screen
pub const ALTERNATE_SCREEN_LEGACY: u32 = 47;
/// X11 mouse reporting, press and release
pub const MOUSE_NORMAL: u32 = 1000;
/// Button-event mouse tracking
pub const MOUSE_BUTTON_MOTION: u32 = 1002;
/// Any-event mouse tracking
pub const MOUSE_ANY_MOTION: u32 = 1003;
/// Focus in/out reporting
pub const FOCUS_REPORTING: u32 = 1004;
/// SGR mouse encoding
pub const MOUSE_SGR: u32 = 1006;
/// Alternate screen with cursor save
pub const ALTERNATE_SCREEN: u32 = 1049;
/// Bracketed paste
pub const BRACKETED_PASTE: u32 = 2004;

const KNOWN: &[u32] = &[
    1,
    3,
    5,
    ORIGIN,
    AUTOWRAP,
    12,
    CURSOR_VISIBLE,
    ALTERNATE_SCREEN_LEGACY,
    MOUSE_NORMAL,
    MOUSE_BUTTON_MOTION,
    MOUSE_ANY_MOTION,
    FOCUS_REPORTING,
    1005,
    MOUSE_SGR,
    1015,
    1047,
    1048,
    ALTERNATE_SCREEN,
    BRACKETED_PASTE,
    2026,
];

/// Mouse reporting mode, derived from the mouse mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    /// No mouse reporting
    #[default]
    None,
    /// Normal tracking mode - report button press and release
    Normal,
    /// Button-event tracking - report press, release, and motion while button pressed
    ButtonMotion,
    /// Any-event tracking - report all motion events
    AnyMotion,
}

/// DEC private mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateModes {
    flags: BTreeMap<u32, bool>,
}

impl Default for PrivateModes {
    fn default() -> Self {
        let mut flags = BTreeMap::new();
        flags.insert(AUTOWRAP, true);
        flags.insert(CURSOR_VISIBLE, true);
        Self { flags }
    }
}

impl PrivateModes {
    /// Create new default modes
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all modes to default values
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a mode change (CSI ? Ps h / CSI ? Ps l)
    pub fn set(&mut self, code: u32, enabled: bool) {
        if !KNOWN.contains(&code) {
            debug!(code, enabled, "unknown private mode");
        }
        self.flags.insert(code, enabled);
    }

    /// Current value of a mode; never-set codes read as off
    pub fn get(&self, code: u32) -> bool {
        self.flags.get(&code).copied().unwrap_or(false)
    }

    /// Codes currently switched on, in ascending order
    pub fn enabled(&self) -> impl Iterator<Item = u32> + '_ {
        self.flags
            .iter()
            .filter(|(_, &on)| on)
            .map(|(&code, _)| code)
    }

    pub fn autowrap(&self) -> bool {
        self.get(AUTOWRAP)
    }

    pub fn origin(&self) -> bool {
        self.get(ORIGIN)
    }

    pub fn cursor_visible(&self) -> bool {
        self.get(CURSOR_VISIBLE)
    }

    /// Whether an alternate screen has been requested. The screen does not
    /// swap buffers itself.
    pub fn alternate_screen(&self) -> bool {
        self.get(ALTERNATE_SCREEN) || self.get(ALTERNATE_SCREEN_LEGACY)
    }

    pub fn bracketed_paste(&self) -> bool {
        self.get(BRACKETED_PASTE)
    }

    /// The most permissive mouse tracking mode currently on
    pub fn mouse_mode(&self) -> MouseMode {
        if self.get(MOUSE_ANY_MOTION) {
            MouseMode::AnyMotion
        } else if self.get(MOUSE_BUTTON_MOTION) {
            MouseMode::ButtonMotion
        } else if self.get(MOUSE_NORMAL) {
            MouseMode::Normal
        } else {
            MouseMode::None
        }
    }
}
