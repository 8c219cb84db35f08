//! Keyboard input types.
//!
//! Platform-agnostic key representation. The browser crate converts
//! `KeyboardEvent`s into these; tests construct them directly.

use smol_str::SmolStr;
use web_time::Instant;

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key. Stored lowercased so chords match regardless of Shift.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    Insert,
    Clear,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    AltGraph,
    CapsLock,
    Control,
    Fn,
    FnLock,
    Meta,
    NumLock,
    ScrollLock,
    Shift,
    Symbol,
    SymbolLock,
    Hyper,
    Super,

    // === IME / composition ===
    Compose,
    Dead,
    Process,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl AsRef<str>) -> Self {
        Self::Character(SmolStr::new(s.as_ref().to_lowercase()))
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Alt
                | Self::AltGraph
                | Self::CapsLock
                | Self::Control
                | Self::Fn
                | Self::FnLock
                | Self::Meta
                | Self::NumLock
                | Self::ScrollLock
                | Self::Shift
                | Self::Symbol
                | Self::SymbolLock
                | Self::Hyper
                | Self::Super
        )
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const ALT: Self = Self {
        ctrl: false,
        alt: true,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Get the primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(is_mac: bool) -> Self {
        if is_mac { Self::META } else { Self::CTRL }
    }

    /// Whether every modifier set in `self` is also set in `held`.
    pub fn held_in(&self, held: &Modifiers) -> bool {
        (!self.ctrl || held.ctrl)
            && (!self.alt || held.alt)
            && (!self.shift || held.shift)
            && (!self.meta || held.meta)
    }

    /// Whether no modifier is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Union of two modifier sets.
    pub fn union(self, other: Modifiers) -> Self {
        Self {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }
}

/// A key combination for triggering a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::CTRL)
    }

    pub fn meta(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::META)
    }

    /// Whether a key event triggers this combo.
    ///
    /// The key must match and every modifier the combo names must be held.
    /// Extra held modifiers do not prevent a match.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.key && self.modifiers.held_in(&event.modifiers)
    }
}

/// A single keydown as seen by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Whether this is an auto-repeat of a held key.
    pub repeat: bool,
    /// When the event happened. Used for key-sequence timeouts.
    pub at: Instant,
}

impl KeyEvent {
    /// A key event stamped with the current time.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: false,
            at: Instant::now(),
        }
    }

    /// A key event with no modifiers held.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Override the timestamp.
    pub fn at(mut self, at: Instant) -> Self {
        self.at = at;
        self
    }

    /// A modifier held on its own, producing no visible input.
    pub fn is_modifier_only(&self) -> bool {
        self.key.is_modifier()
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled: prevent default and stop propagation.
    Handled,
    /// Event was not intercepted, let the platform handle it.
    NotHandled,
}

impl KeydownResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}
