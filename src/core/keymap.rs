//! Global key map: key chords bound to action names, checked before focus.
//!
//! Chords use the same "modifier+key" notation as the `[keys]` config table,
//! e.g. `ctrl+q`, `alt+f4`, `left_alt+m`, `shift+tab`, `f1`.

use super::event::{Key, KeyboardEvent, Special};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt;

/// Which alt key a chord requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltSide {
    None,
    /// Either alt key
    Any,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub shift: bool,
    pub control: bool,
    pub alt: AltSide,
}

impl KeyChord {
    /// Parse "ctrl+shift+x" style notation; `None` on anything unknown
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        // "ctrl++" binds the plus key
        let (mods, key_part) = match text.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match text.rfind('+') {
                Some(pos) if pos + 1 < text.len() => (&text[..pos], &text[pos + 1..]),
                Some(_) => return None,
                None => ("", text),
            },
        };

        let mut chord = KeyChord {
            key: parse_key(key_part)?,
            shift: false,
            control: false,
            alt: AltSide::None,
        };
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.trim().to_lowercase().as_str() {
                "ctrl" | "control" => chord.control = true,
                "shift" => chord.shift = true,
                "alt" => chord.alt = AltSide::Any,
                "left_alt" | "lalt" => chord.alt = AltSide::Left,
                "right_alt" | "ralt" | "altgr" => chord.alt = AltSide::Right,
                _ => return None,
            }
        }
        // the dispatcher looks keys up after `KeyboardEvent::translated`
        if chord.control && !chord.shift && chord.alt == AltSide::None {
            if let Key::Special(special) = chord.key {
                if let Some(alternative) = special.alternative() {
                    chord.key = Key::Special(alternative);
                    chord.control = false;
                }
            }
        }
        Some(chord)
    }

    pub fn matches(&self, event: &KeyboardEvent) -> bool {
        let key_matches = match (self.key, event.key) {
            (Key::Char(a), Key::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
            (a, b) => a == b,
        };
        let m = &event.modifiers;
        let alt_matches = match self.alt {
            AltSide::None => !m.alt(),
            AltSide::Any => m.alt(),
            AltSide::Left => m.left_alt && !m.right_alt,
            AltSide::Right => m.right_alt && !m.left_alt,
        };
        key_matches && alt_matches && self.shift == m.shift && self.control == m.control
    }
}

fn parse_key(text: &str) -> Option<Key> {
    let lower = text.trim().to_lowercase();
    let special = match lower.as_str() {
        "enter" | "return" => Special::Enter,
        "esc" | "escape" => Special::Escape,
        "tab" => Special::Tab,
        "backspace" => Special::Backspace,
        "delete" | "del" => Special::Delete,
        "insert" | "ins" => Special::Insert,
        "up" => Special::ArrowUp,
        "down" => Special::ArrowDown,
        "left" => Special::ArrowLeft,
        "right" => Special::ArrowRight,
        "home" => Special::Home,
        "end" => Special::End,
        "page_up" | "pageup" => Special::PageUp,
        "page_down" | "pagedown" => Special::PageDown,
        "space" => return Some(Key::Char(' ')),
        f if f.len() > 1 && f.starts_with('f') => {
            let n: u8 = f[1..].parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            Special::F(n)
        }
        s => {
            let mut chars = s.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            return Some(Key::Char(c));
        }
    };
    Some(Key::Special(special))
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (control, key) = match self.key {
            Key::Special(special) => match special.plain() {
                Some(plain) => (true, Key::Special(plain)),
                None => (self.control, self.key),
            },
            Key::Char(_) => (self.control, self.key),
        };
        let mut parts: Vec<String> = Vec::new();
        if control {
            parts.push("ctrl".into());
        }
        match self.alt {
            AltSide::None => {}
            AltSide::Any => parts.push("alt".into()),
            AltSide::Left => parts.push("left_alt".into()),
            AltSide::Right => parts.push("right_alt".into()),
        }
        if self.shift {
            parts.push("shift".into());
        }
        parts.push(match key {
            Key::Char(' ') => "space".into(),
            Key::Char(c) => c.to_string(),
            Key::Special(Special::F(n)) => format!("f{}", n),
            Key::Special(Special::ArrowUp) => "up".into(),
            Key::Special(Special::ArrowDown) => "down".into(),
            Key::Special(Special::ArrowLeft) => "left".into(),
            Key::Special(Special::ArrowRight) => "right".into(),
            Key::Special(Special::PageUp) => "page_up".into(),
            Key::Special(Special::PageDown) => "page_down".into(),
            Key::Special(Special::Escape) => "esc".into(),
            Key::Special(s) => format!("{:?}", s).to_lowercase(),
        });
        write!(f, "{}", parts.join("+"))
    }
}

/// Ordered chord bindings
#[derive(Debug, Clone, Default)]
pub struct GlobalKeys {
    bindings: Vec<(KeyChord, String)>,
}

impl GlobalKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[keys]` table; any bad chord or empty action is an error
    pub fn from_table(table: &HashMap<String, String>) -> Result<Self> {
        let mut keys = Self::new();
        let mut entries: Vec<_> = table.iter().collect();
        entries.sort();
        for (chord, action) in entries {
            let Some(parsed) = KeyChord::parse(chord) else {
                bail!("Invalid key chord '{}' in [keys]", chord);
            };
            if action.trim().is_empty() {
                bail!("Key chord '{}' is bound to an empty action", chord);
            }
            keys.bind(parsed, action.trim());
        }
        Ok(keys)
    }

    /// Bind a chord, replacing an existing binding of the same chord
    pub fn bind(&mut self, chord: KeyChord, action: impl Into<String>) {
        let action = action.into();
        match self.bindings.iter_mut().find(|(c, _)| *c == chord) {
            Some(slot) => slot.1 = action,
            None => self.bindings.push((chord, action)),
        }
    }

    pub fn lookup(&self, event: &KeyboardEvent) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(chord, _)| chord.matches(event))
            .map(|(_, action)| action.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyChord, &str)> {
        self.bindings.iter().map(|(c, a)| (c, a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chords() {
        let chord = KeyChord::parse("ctrl+q").unwrap();
        assert_eq!(chord.key, Key::Char('q'));
        assert!(chord.control);

        let chord = KeyChord::parse("Alt+F4").unwrap();
        assert_eq!(chord.key, Key::Special(Special::F(4)));
        assert_eq!(chord.alt, AltSide::Any);

        assert_eq!(KeyChord::parse("ctrl++").unwrap().key, Key::Char('+'));
        assert!(KeyChord::parse("hyper+x").is_none());
        assert!(KeyChord::parse("f13").is_none());
        assert!(KeyChord::parse("ctrl+").is_none());
        assert!(KeyChord::parse("").is_none());
    }

    #[test]
    fn test_chord_matching() {
        let quit = KeyChord::parse("ctrl+q").unwrap();
        assert!(quit.matches(&KeyboardEvent::char('q').with_control()));
        assert!(quit.matches(&KeyboardEvent::char('Q').with_control()));
        assert!(!quit.matches(&KeyboardEvent::char('q')));
        assert!(!quit.matches(&KeyboardEvent::char('q').with_control().with_shift()));

        let any_alt = KeyChord::parse("alt+x").unwrap();
        let mut right = KeyboardEvent::char('x');
        right.modifiers.right_alt = true;
        assert!(any_alt.matches(&right));
        assert!(!KeyChord::parse("left_alt+x").unwrap().matches(&right));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for text in ["ctrl+q", "left_alt+m", "shift+tab", "f1", "ctrl+page_down"] {
            let chord = KeyChord::parse(text).unwrap();
            assert_eq!(chord.to_string(), text);
        }
    }

    #[test]
    fn test_control_navigation_chords_match_translated_keys() {
        let chord = KeyChord::parse("ctrl+home").unwrap();
        assert_eq!(chord.key, Key::Special(Special::AlternativeHome));
        assert!(!chord.control);
        assert_eq!(chord.to_string(), "ctrl+home");

        let pressed = KeyboardEvent::special(Special::Home).with_control().translated();
        assert!(chord.matches(&pressed));
        assert!(!chord.matches(&KeyboardEvent::special(Special::Home)));

        // only plain control is translated
        let chord = KeyChord::parse("ctrl+shift+home").unwrap();
        assert_eq!(chord.key, Key::Special(Special::Home));
        assert!(chord.control);
        assert_eq!(KeyChord::parse("ctrl+up").unwrap().to_string(), "ctrl+up");
    }

    #[test]
    fn test_table_loading() {
        let mut table = HashMap::new();
        table.insert("ctrl+q".to_string(), "quit".to_string());
        table.insert("f1".to_string(), "main-menu".to_string());
        let keys = GlobalKeys::from_table(&table).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.lookup(&KeyboardEvent::special(Special::F(1))), Some("main-menu"));
        assert_eq!(keys.lookup(&KeyboardEvent::char('q')), None);

        table.insert("bogus+k".to_string(), "x".to_string());
        assert!(GlobalKeys::from_table(&table).is_err());
    }
}
