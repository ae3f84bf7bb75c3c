//! Conversation and theme flags.

/// Lifecycle of the visible conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversationState {
    /// Input accepted.
    #[default]
    Active,
    /// Server signalled the end; only a restart leaves this state.
    Ended,
}

impl ConversationState {
    #[must_use]
    pub fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }
}

/// Light/dark theme flag. Survives restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeState {
    dark: bool,
}

impl ThemeState {
    #[must_use]
    pub fn is_dark(self) -> bool {
        self.dark
    }

    /// Flip the theme.
    pub fn toggle(&mut self) {
        self.dark = !self.dark;
    }

    /// Label shown on the toggle control: what the next click switches to.
    #[must_use]
    pub fn label(self) -> &'static str {
        if self.dark { "☀️ Theme" } else { "🌙 Theme" }
    }
}
