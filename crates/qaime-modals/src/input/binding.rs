//! Binding types: key + modifiers + context → action.

use super::action::ModalAction;

/// Keys the modal chrome cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Insert,
    Delete,
    Enter,
    Tab,
    F(u8),
    /// A printable character, compared case-insensitively.
    Char(char),
}

impl Key {
    fn same(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

/// Modifier key state required for a binding to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Command on macOS. Treated like ctrl for matching.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const META: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: true,
    };

    /// Ctrl and meta are interchangeable; shift and alt must match exactly.
    pub fn matches(&self, held: &Modifiers) -> bool {
        (self.ctrl || self.meta) == (held.ctrl || held.meta)
            && self.shift == held.shift
            && self.alt == held.alt
    }
}

/// Where a binding may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    /// Also fires while typing in a text field.
    Anywhere,
    /// Suppressed while focus is in a text field.
    OutsideText,
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub in_text_input: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            in_text_input: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            modifiers: Modifiers::CTRL,
            ..Self::new(key)
        }
    }

    pub fn in_text(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

/// A single key binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub key: Key,
    pub modifiers: Modifiers,
    pub context: KeyContext,
    pub action: ModalAction,
    /// Shown in tooltips.
    pub description: String,
}

impl Binding {
    pub fn key(key: Key, context: KeyContext, action: ModalAction, desc: impl Into<String>) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            context,
            action,
            description: desc.into(),
        }
    }

    pub fn key_mod(
        key: Key,
        modifiers: Modifiers,
        context: KeyContext,
        action: ModalAction,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            key,
            modifiers,
            context,
            action,
            description: desc.into(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key.same(&event.key)
            && self.modifiers.matches(&event.modifiers)
            && (self.context == KeyContext::Anywhere || !event.in_text_input)
    }
}
