//! Key press representation and modifier state tracking
//!
//! Normalizes raw crossterm key events into the small vocabulary the
//! chord interpreter cares about.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Tracks which modifier keys accompany a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift is held
    pub shift: bool,
    /// Control is held
    pub control: bool,
    /// Alt/Option is held
    pub alt: bool,
    /// Meta/Super is held
    pub meta: bool,
}

impl Modifiers {
    /// Create a Modifiers from crossterm flags
    pub fn from_crossterm(flags: KeyModifiers) -> Self {
        Self {
            shift: flags.contains(KeyModifiers::SHIFT),
            control: flags.contains(KeyModifiers::CONTROL),
            alt: flags.contains(KeyModifiers::ALT),
            meta: flags.contains(KeyModifiers::META) || flags.contains(KeyModifiers::SUPER),
        }
    }

    /// Check if no modifiers are held
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.control && !self.alt && !self.meta
    }

    /// Check if Control is the only modifier held (for the prefix chord)
    pub fn is_control_only(&self) -> bool {
        self.control && !self.shift && !self.alt && !self.meta
    }
}

/// Normalized key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character
    Char(char),
    /// The Escape key
    Escape,
    /// A named non-printable key (Enter, Tab, arrows, ...)
    Named(&'static str),
    /// A bare modifier press (shift/ctrl/alt/meta alone)
    Modifier,
}

/// A single key-down event with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: Key,
    pub mods: Modifiers,
}

impl KeyPress {
    pub fn new(code: Key, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    /// Convert a raw crossterm key event
    pub fn from_crossterm(event: &KeyEvent) -> Self {
        let mods = Modifiers::from_crossterm(event.modifiers);
        let code = match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Esc => Key::Escape,
            KeyCode::Enter => Key::Named("Enter"),
            KeyCode::Tab => Key::Named("Tab"),
            KeyCode::Backspace => Key::Named("Backspace"),
            KeyCode::Left => Key::Named("ArrowLeft"),
            KeyCode::Right => Key::Named("ArrowRight"),
            KeyCode::Up => Key::Named("ArrowUp"),
            KeyCode::Down => Key::Named("ArrowDown"),
            KeyCode::Modifier(_) => Key::Modifier,
            _ => Key::Named("unknown"),
        };
        Self::new(code, mods)
    }

    /// Check if this press arms the prefix: `b` with Control as the
    /// only modifier
    pub fn is_prefix(&self) -> bool {
        matches!(self.code, Key::Char('b') | Key::Char('B')) && self.mods.is_control_only()
    }

    /// Check if this is a bare modifier press
    pub fn is_pure_modifier(&self) -> bool {
        matches!(self.code, Key::Modifier)
    }

    /// Human-readable key name for the unbound-key status message
    pub fn label(&self) -> String {
        match self.code {
            Key::Char(c) => c.to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Named(name) => name.to_string(),
            Key::Modifier => "Modifier".to_string(),
        }
    }
}
