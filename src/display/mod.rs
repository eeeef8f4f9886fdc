//! Display Surface
//!
//! The display renders whichever terminal session is bound to it. It keeps
//! only a [`Weak`] reference: the connection manager owns the active
//! session and the display is rebound whenever a new session is created.
//!
//! - [`preferences`] - font and colour choices offered to the user

pub mod preferences;

pub use preferences::{ColorTarget, DisplayPreferences, NamedColor, FKEY_BAR_KEY, FONT_SIZES};

use std::sync::{Arc, Weak};

use crate::terminal::{SessionId, Terminal};

/// Rendering target for terminal sessions
pub trait DisplaySurface: Send {
    /// Rebind rendering to a new session
    fn set_terminal(&mut self, terminal: Weak<dyn Terminal>);

    /// Redraw after a preference change
    fn refresh(&mut self);

    /// Update the window title / status line
    fn set_title(&mut self, title: &str);

    /// Apply font and colour choices. Surfaces without styling ignore them.
    fn apply_preferences(&mut self, _preferences: &DisplayPreferences) {}
}

/// Display surface with no rendering backend.
///
/// Tracks what a real surface would show: the bound session, the title and
/// the current preferences. Used for embedded operation and in tests.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    terminal: Option<Weak<dyn Terminal>>,
    title: String,
    preferences: DisplayPreferences,
    refresh_count: usize,
    rebind_count: usize,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session currently bound, if it is still alive
    pub fn attached_terminal(&self) -> Option<Arc<dyn Terminal>> {
        self.terminal.as_ref().and_then(Weak::upgrade)
    }

    pub fn attached_session(&self) -> Option<SessionId> {
        self.attached_terminal().map(|t| t.id())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn preferences(&self) -> &DisplayPreferences {
        &self.preferences
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    /// Number of times a session was bound
    pub fn rebind_count(&self) -> usize {
        self.rebind_count
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn set_terminal(&mut self, terminal: Weak<dyn Terminal>) {
        self.terminal = Some(terminal);
        self.rebind_count += 1;
    }

    fn refresh(&mut self) {
        self.refresh_count += 1;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn apply_preferences(&mut self, preferences: &DisplayPreferences) {
        self.preferences = preferences.clone();
    }
}
