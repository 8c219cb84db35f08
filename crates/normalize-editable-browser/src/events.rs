//! Browser event conversion.
//!
//! Turns `web_sys` events into the core's [`RegionEvent`]s.

use normalize_editable_core::{Key, KeyEvent, Modifiers, RegionEvent};
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent};

/// Parse a `KeyboardEvent.key` value.
pub fn parse_dom_key(key: &str) -> Key {
    match key {
        "Enter" => Key::Enter,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Tab" => Key::Tab,
        "Escape" => Key::Escape,
        " " => Key::Space,
        "Insert" => Key::Insert,
        "Clear" => Key::Clear,
        "ArrowLeft" => Key::ArrowLeft,
        "ArrowRight" => Key::ArrowRight,
        "ArrowUp" => Key::ArrowUp,
        "ArrowDown" => Key::ArrowDown,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "Shift" => Key::Shift,
        "Control" => Key::Control,
        "Alt" => Key::Alt,
        "AltGraph" => Key::AltGraph,
        "Meta" | "OS" => Key::Meta,
        "CapsLock" => Key::CapsLock,
        "NumLock" => Key::NumLock,
        "ScrollLock" => Key::ScrollLock,
        "Fn" => Key::Fn,
        "FnLock" => Key::FnLock,
        "Symbol" => Key::Symbol,
        "SymbolLock" => Key::SymbolLock,
        "Hyper" => Key::Hyper,
        "Super" => Key::Super,
        "Compose" => Key::Compose,
        "Dead" => Key::Dead,
        "Process" => Key::Process,
        s if s.chars().count() == 1 => Key::character(s),
        _ => Key::Unidentified,
    }
}

pub fn modifiers_from_keyboard(event: &KeyboardEvent) -> Modifiers {
    Modifiers {
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    }
}

pub fn key_event_from_keyboard(event: &KeyboardEvent) -> KeyEvent {
    let mut key_event = KeyEvent::new(parse_dom_key(&event.key()), modifiers_from_keyboard(event));
    key_event.repeat = event.repeat();
    key_event
}

/// Convert a DOM event delivered as `event_type` into a region event.
///
/// Returns `None` for unknown types, and for `keydown` events that are not
/// `KeyboardEvent`s.
pub fn region_event_for(event_type: &str, event: &Event) -> Option<RegionEvent> {
    if event_type == "keydown" {
        let keyboard = event.dyn_ref::<KeyboardEvent>()?;
        return Some(RegionEvent::KeyDown(key_event_from_keyboard(keyboard)));
    }
    RegionEvent::from_type(event_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dom_key() {
        assert_eq!(parse_dom_key("Enter"), Key::Enter);
        assert_eq!(parse_dom_key(" "), Key::Space);
        assert_eq!(parse_dom_key("A"), Key::character("a"));
        assert_eq!(parse_dom_key("é"), Key::character("é"));
        assert!(parse_dom_key("Shift").is_modifier());
        assert_eq!(parse_dom_key("MediaPlayPause"), Key::Unidentified);
    }
}
