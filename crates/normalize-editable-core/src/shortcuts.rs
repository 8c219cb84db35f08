//! Shortcut dispatch: key-combination strings bound to typed reactions.
//!
//! Combination grammar:
//!
//! - `"enter"` a single key
//! - `"super + a"` a chord; `super` is Cmd on macOS and Ctrl elsewhere
//! - `"backspace, delete"` alternatives, each bound separately
//! - `"g g"` a sequence, each step within [`SEQUENCE_TIMEOUT`] of the last
//!
//! Reactions are plain values (usually an enum) resolved at bind time, so
//! dispatch never looks anything up by name.

use std::time::Duration;

use smol_str::SmolStr;
use web_time::Instant;

use crate::error::ShortcutError;
use crate::keys::{Key, KeyCombo, KeyEvent, Modifiers};

/// Maximum gap between two steps of a key sequence.
pub const SEQUENCE_TIMEOUT: Duration = Duration::from_millis(500);

/// What a combination string parses into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Chord(KeyCombo),
    Sequence(Vec<Key>),
}

impl Pattern {
    /// The key that identifies this pattern for unbinding.
    fn key(&self) -> Option<&Key> {
        match self {
            Pattern::Chord(combo) => Some(&combo.key),
            Pattern::Sequence(keys) => keys.last(),
        }
    }

    fn modifiers(&self) -> Modifiers {
        match self {
            Pattern::Chord(combo) => combo.modifiers,
            Pattern::Sequence(_) => Modifiers::NONE,
        }
    }

    /// Unbind matching: same key, and either the query names no modifiers or
    /// the same ones.
    fn covered_by(&self, query: &Pattern) -> bool {
        if let (Pattern::Sequence(a), Pattern::Sequence(b)) = (self, query) {
            return a == b;
        }
        self.key() == query.key()
            && (query.modifiers().is_empty() || self.modifiers() == query.modifiers())
    }
}

/// Parse a combination string into its alternatives.
pub fn parse_combos(combos: &str, is_mac: bool) -> Result<Vec<Pattern>, ShortcutError> {
    let trimmed = combos.trim();
    if trimmed == "," {
        return Ok(vec![Pattern::Chord(KeyCombo::new(Key::character(",")))]);
    }

    let mut patterns = Vec::new();
    for alternative in trimmed.split(',').map(str::trim) {
        if alternative.is_empty() {
            continue;
        }
        patterns.push(parse_alternative(alternative, combos, is_mac)?);
    }

    if patterns.is_empty() {
        return Err(ShortcutError::InvalidCombo(combos.to_string()));
    }
    Ok(patterns)
}

fn parse_alternative(alt: &str, combo: &str, is_mac: bool) -> Result<Pattern, ShortcutError> {
    let parts: Vec<&str> = alt.split('+').map(str::trim).collect();

    // "a + +" style input leaves empty parts behind.
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ShortcutError::InvalidCombo(combo.to_string()));
    }

    let Some((key_part, modifier_parts)) = parts.split_last() else {
        return Err(ShortcutError::InvalidCombo(combo.to_string()));
    };

    if modifier_parts.is_empty() && key_part.contains(char::is_whitespace) {
        let keys = key_part
            .split_whitespace()
            .map(|name| parse_key(name).ok_or_else(|| ShortcutError::InvalidCombo(combo.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Pattern::Sequence(keys));
    }

    let mut modifiers = Modifiers::NONE;
    for name in modifier_parts {
        let m = parse_modifier(name, is_mac).ok_or_else(|| ShortcutError::UnknownModifier {
            combo: combo.to_string(),
            modifier: name.to_string(),
        })?;
        modifiers = modifiers.union(m);
    }

    let key = parse_key(key_part).ok_or_else(|| ShortcutError::InvalidCombo(combo.to_string()))?;
    Ok(Pattern::Chord(KeyCombo::with_modifiers(key, modifiers)))
}

fn parse_modifier(name: &str, is_mac: bool) -> Option<Modifiers> {
    match name.to_ascii_lowercase().as_str() {
        "super" => Some(Modifiers::primary(is_mac)),
        "command" | "cmd" | "meta" => Some(Modifiers::META),
        "ctrl" | "control" => Some(Modifiers::CTRL),
        "alt" | "option" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        _ => None,
    }
}

/// Parse a key name as used in combination strings.
pub fn parse_key(name: &str) -> Option<Key> {
    let lower = name.to_lowercase();
    let key = match lower.as_str() {
        "backspace" => Key::Backspace,
        "tab" => Key::Tab,
        "clear" => Key::Clear,
        "enter" | "return" => Key::Enter,
        "shift" => Key::Shift,
        "ctrl" | "control" => Key::Control,
        "alt" | "option" => Key::Alt,
        "command" | "cmd" | "meta" => Key::Meta,
        "capslock" => Key::CapsLock,
        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,
        "left" => Key::ArrowLeft,
        "up" => Key::ArrowUp,
        "right" => Key::ArrowRight,
        "down" => Key::ArrowDown,
        "del" | "delete" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "comma" => Key::character(","),
        _ if lower.chars().count() == 1 => Key::Character(SmolStr::new(&lower)),
        _ => return None,
    };
    Some(key)
}

#[derive(Debug, Clone)]
struct SequenceProgress {
    matched: usize,
    last: Option<Instant>,
}

impl SequenceProgress {
    fn new() -> Self {
        Self {
            matched: 0,
            last: None,
        }
    }

    fn reset(&mut self) {
        self.matched = 0;
        self.last = None;
    }

    /// Feed one key; true when the final step completes.
    fn advance(&mut self, keys: &[Key], event: &KeyEvent) -> bool {
        if let Some(last) = self.last {
            if event.at.saturating_duration_since(last) > SEQUENCE_TIMEOUT {
                self.reset();
            }
        }

        if keys.get(self.matched) == Some(&event.key) {
            self.matched += 1;
        } else {
            self.matched = fallback(keys, self.matched, &event.key);
            if self.matched == 0 {
                self.reset();
                return false;
            }
        }

        self.last = Some(event.at);
        if self.matched == keys.len() {
            self.reset();
            return true;
        }
        false
    }
}

/// Progress after `key` breaks a run of `matched` steps: the longest prefix
/// of `keys` that ends the keys seen so far.
fn fallback(keys: &[Key], matched: usize, key: &Key) -> usize {
    (1..=matched)
        .rev()
        .find(|&k| keys[k - 1] == *key && keys[..k - 1] == keys[matched + 1 - k..matched])
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
struct Binding<R> {
    pattern: Pattern,
    progress: SequenceProgress,
    reaction: R,
}

/// Key-combination table mapping patterns to reactions.
#[derive(Debug, Clone)]
pub struct ShortcutMap<R> {
    bindings: Vec<Binding<R>>,
    is_mac: bool,
}

impl<R: Clone + PartialEq> ShortcutMap<R> {
    /// An empty table. `is_mac` decides what `super` means.
    pub fn new(is_mac: bool) -> Self {
        Self {
            bindings: Vec::new(),
            is_mac,
        }
    }

    /// Bind every alternative in `combos` to `reaction`.
    pub fn bind(&mut self, combos: &str, reaction: R) -> Result<&mut Self, ShortcutError> {
        for pattern in parse_combos(combos, self.is_mac)? {
            tracing::trace!(?pattern, "binding shortcut");
            self.bindings.push(Binding {
                pattern,
                progress: SequenceProgress::new(),
                reaction: reaction.clone(),
            });
        }
        Ok(self)
    }

    /// Remove bindings.
    ///
    /// - `unbind(None, _)` removes everything.
    /// - `unbind(Some(combos), None)` removes every reaction on those combos.
    /// - `unbind(Some(combos), Some(r))` removes only `r` on those combos.
    ///
    /// Returns how many bindings were removed.
    pub fn unbind(&mut self, combos: Option<&str>, reaction: Option<&R>) -> Result<usize, ShortcutError> {
        let before = self.bindings.len();
        let Some(combos) = combos else {
            self.bindings.clear();
            return Ok(before);
        };

        let queries = parse_combos(combos, self.is_mac)?;
        self.bindings.retain(|b| {
            let hit = queries.iter().any(|q| b.pattern.covered_by(q))
                && reaction.is_none_or(|r| *r == b.reaction);
            !hit
        });
        Ok(before - self.bindings.len())
    }

    /// Reactions triggered by this key event, in binding order.
    pub fn dispatch(&mut self, event: &KeyEvent) -> Vec<R> {
        let mut fired = Vec::new();
        for binding in &mut self.bindings {
            let hit = match &binding.pattern {
                Pattern::Chord(combo) => combo.matches(event),
                Pattern::Sequence(keys) => binding.progress.advance(keys, event),
            };
            if hit {
                fired.push(binding.reaction.clone());
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
