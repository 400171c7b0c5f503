//! crossterm input converted to shell events.
//!
//! Terminals report one ALT modifier; it is treated as the left alt key.
//! Right alt (AltGr) normally arrives as the composed character instead.

use crate::core::event::{Event, Key, KeyboardEvent, Modifiers, Special, SystemEvent};
use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode,
};

/// Convert one crossterm event; `None` for anything the shell ignores
pub fn convert_event(event: TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key_event) => convert_key(key_event).map(Event::from),
        TermEvent::Paste(text) => {
            let lines: Vec<String> = text.lines().map(str::to_string).collect();
            if lines.is_empty() {
                return None;
            }
            Some(SystemEvent::Insert(lines).into())
        }
        TermEvent::Resize(_, _) => Some(SystemEvent::ScreenResized.into()),
        _ => None,
    }
}

pub fn convert_key(key_event: KeyEvent) -> Option<KeyboardEvent> {
    // Releases only show up with the kitty protocol; presses and repeats count
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    let mut modifiers = convert_modifiers(key_event.modifiers);
    let key = match key_event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Special(Special::Enter),
        KeyCode::Esc => Key::Special(Special::Escape),
        KeyCode::Tab => Key::Special(Special::Tab),
        KeyCode::BackTab => {
            modifiers.shift = true;
            Key::Special(Special::Tab)
        }
        KeyCode::Backspace => Key::Special(Special::Backspace),
        KeyCode::Delete => Key::Special(Special::Delete),
        KeyCode::Insert => Key::Special(Special::Insert),
        KeyCode::Up => Key::Special(Special::ArrowUp),
        KeyCode::Down => Key::Special(Special::ArrowDown),
        KeyCode::Left => Key::Special(Special::ArrowLeft),
        KeyCode::Right => Key::Special(Special::ArrowRight),
        KeyCode::Home => Key::Special(Special::Home),
        KeyCode::End => Key::Special(Special::End),
        KeyCode::PageUp => Key::Special(Special::PageUp),
        KeyCode::PageDown => Key::Special(Special::PageDown),
        KeyCode::F(n) if (1..=12).contains(&n) => Key::Special(Special::F(n)),
        KeyCode::Modifier(code) => Key::Special(convert_modifier_key(code)?),
        _ => return None,
    };
    Some(KeyboardEvent::new(key, modifiers))
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: mods.contains(KeyModifiers::SHIFT),
        control: mods.contains(KeyModifiers::CONTROL),
        left_alt: mods.contains(KeyModifiers::ALT),
        right_alt: false,
    }
}

fn convert_modifier_key(code: ModifierKeyCode) -> Option<Special> {
    match code {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Some(Special::Shift),
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Some(Special::Control),
        ModifierKeyCode::LeftAlt => Some(Special::LeftAlt),
        ModifierKeyCode::RightAlt | ModifierKeyCode::IsoLevel3Shift => Some(Special::RightAlt),
        _ => None,
    }
}
