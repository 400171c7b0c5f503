//! Shell event vocabulary.
//!
//! Every input the dispatcher sees is one of these. Input back-ends translate
//! their native events (crossterm, background jobs) into `Event` so the
//! dispatcher only ever matches on one closed shape.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of an area, usable from other threads.
///
/// Area objects themselves never leave the dispatcher thread, so background
/// work addresses its destination by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(u64);

static NEXT_AREA_ID: AtomicU64 = AtomicU64::new(1);

impl AreaId {
    /// Mint a fresh id (never reused within the process)
    pub fn next() -> Self {
        Self(NEXT_AREA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area#{}", self.0)
    }
}

/// Named (non-character) keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),

    // Bare modifier presses
    Shift,
    Control,
    LeftAlt,
    RightAlt,

    // Control-modified navigation, see `KeyboardEvent::translated`
    AlternativeArrowUp,
    AlternativeArrowDown,
    AlternativeArrowLeft,
    AlternativeArrowRight,
    AlternativePageUp,
    AlternativePageDown,
    AlternativeHome,
    AlternativeEnd,
}

impl Special {
    /// True for a press of a modifier key on its own
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Special::Shift | Special::Control | Special::LeftAlt | Special::RightAlt
        )
    }

    /// The alternative identity of a navigation key, if it has one
    pub fn alternative(self) -> Option<Special> {
        match self {
            Special::ArrowUp => Some(Special::AlternativeArrowUp),
            Special::ArrowDown => Some(Special::AlternativeArrowDown),
            Special::ArrowLeft => Some(Special::AlternativeArrowLeft),
            Special::ArrowRight => Some(Special::AlternativeArrowRight),
            Special::PageUp => Some(Special::AlternativePageUp),
            Special::PageDown => Some(Special::AlternativePageDown),
            Special::Home => Some(Special::AlternativeHome),
            Special::End => Some(Special::AlternativeEnd),
            _ => None,
        }
    }

    /// The plain navigation key an alternative identity stands for
    pub fn plain(self) -> Option<Special> {
        match self {
            Special::AlternativeArrowUp => Some(Special::ArrowUp),
            Special::AlternativeArrowDown => Some(Special::ArrowDown),
            Special::AlternativeArrowLeft => Some(Special::ArrowLeft),
            Special::AlternativeArrowRight => Some(Special::ArrowRight),
            Special::AlternativePageUp => Some(Special::PageUp),
            Special::AlternativePageDown => Some(Special::PageDown),
            Special::AlternativeHome => Some(Special::Home),
            Special::AlternativeEnd => Some(Special::End),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Special(Special),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub left_alt: bool,
    pub right_alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        left_alt: false,
        right_alt: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    pub fn control_only(&self) -> bool {
        self.control && !self.shift && !self.left_alt && !self.right_alt
    }

    pub fn left_alt_only(&self) -> bool {
        self.left_alt && !self.shift && !self.control && !self.right_alt
    }

    pub fn alt(&self) -> bool {
        self.left_alt || self.right_alt
    }
}

/// A single key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyboardEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyboardEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Unmodified character
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE)
    }

    /// Unmodified special key
    pub fn special(special: Special) -> Self {
        Self::new(Key::Special(special), Modifiers::NONE)
    }

    pub fn with_control(mut self) -> Self {
        self.modifiers.control = true;
        self
    }

    pub fn with_left_alt(mut self) -> Self {
        self.modifiers.left_alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn as_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) => Some(c),
            Key::Special(_) => None,
        }
    }

    pub fn as_special(&self) -> Option<Special> {
        match self.key {
            Key::Special(s) => Some(s),
            Key::Char(_) => None,
        }
    }

    pub fn is_special(&self, special: Special) -> bool {
        self.key == Key::Special(special)
    }

    /// Remap control+navigation keys to their alternative identities.
    ///
    /// Areas then tell plain navigation from control navigation by key alone.
    pub fn translated(self) -> Self {
        if !self.modifiers.control_only() {
            return self;
        }
        match self.as_special().and_then(Special::alternative) {
            Some(alt) => Self::special(alt),
            None => self,
        }
    }
}

/// Boxed result of background work, routed back to its area
pub type SyncPayload = Box<dyn Any + Send>;

/// Non-keyboard events
pub enum SystemEvent {
    /// Open files; an empty list asks the shell to prompt for one
    Open(Vec<PathBuf>),
    /// Insert the clipboard content into the active area
    Paste,
    /// Insert the given lines at the hot point
    Insert(Vec<String>),
    Close,
    Ok,
    Cancel,
    Save,
    Refresh,
    /// Pseudo event asking an area to announce itself
    Introduce,
    /// Remove whatever the area considers its current region
    DeleteRegion,
    /// Anchor a region at the hot point
    RegionPoint,
    /// Put the hot point at the given column and row
    MoveHotPoint { x: usize, y: usize },
    /// The rendering surface changed size
    ScreenResized,
    /// Completion of background work addressed to one area
    ThreadSync { dest: AreaId, payload: SyncPayload },
}

/// Payload-free discriminant of a `SystemEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCode {
    Open,
    Paste,
    Insert,
    Close,
    Ok,
    Cancel,
    Save,
    Refresh,
    Introduce,
    DeleteRegion,
    RegionPoint,
    MoveHotPoint,
    ScreenResized,
    ThreadSync,
}

impl SystemEvent {
    pub fn code(&self) -> SystemCode {
        match self {
            SystemEvent::Open(_) => SystemCode::Open,
            SystemEvent::Paste => SystemCode::Paste,
            SystemEvent::Insert(_) => SystemCode::Insert,
            SystemEvent::Close => SystemCode::Close,
            SystemEvent::Ok => SystemCode::Ok,
            SystemEvent::Cancel => SystemCode::Cancel,
            SystemEvent::Save => SystemCode::Save,
            SystemEvent::Refresh => SystemCode::Refresh,
            SystemEvent::Introduce => SystemCode::Introduce,
            SystemEvent::DeleteRegion => SystemCode::DeleteRegion,
            SystemEvent::RegionPoint => SystemCode::RegionPoint,
            SystemEvent::MoveHotPoint { .. } => SystemCode::MoveHotPoint,
            SystemEvent::ScreenResized => SystemCode::ScreenResized,
            SystemEvent::ThreadSync { .. } => SystemCode::ThreadSync,
        }
    }

    pub fn thread_sync(dest: AreaId, payload: SyncPayload) -> Self {
        SystemEvent::ThreadSync { dest, payload }
    }
}

impl fmt::Debug for SystemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemEvent::Open(files) => f.debug_tuple("Open").field(files).finish(),
            SystemEvent::Insert(lines) => f.debug_tuple("Insert").field(&lines.len()).finish(),
            SystemEvent::MoveHotPoint { x, y } => {
                f.debug_struct("MoveHotPoint").field("x", x).field("y", y).finish()
            }
            SystemEvent::ThreadSync { dest, .. } => {
                f.debug_struct("ThreadSync").field("dest", dest).finish_non_exhaustive()
            }
            other => write!(f, "{:?}", other.code()),
        }
    }
}

/// Everything the queue carries
#[derive(Debug)]
pub enum Event {
    Keyboard(KeyboardEvent),
    System(SystemEvent),
}

impl From<KeyboardEvent> for Event {
    fn from(event: KeyboardEvent) -> Self {
        Event::Keyboard(event)
    }
}

impl From<SystemEvent> for Event {
    fn from(event: SystemEvent) -> Self {
        Event::System(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_arrows_become_alternatives() {
        let ev = KeyboardEvent::special(Special::ArrowUp).with_control();
        assert_eq!(ev.translated(), KeyboardEvent::special(Special::AlternativeArrowUp));

        let ev = KeyboardEvent::special(Special::End).with_control();
        assert_eq!(ev.translated(), KeyboardEvent::special(Special::AlternativeEnd));
    }

    #[test]
    fn test_translation_leaves_other_keys_alone() {
        let plain = KeyboardEvent::special(Special::ArrowUp);
        assert_eq!(plain.translated(), plain);

        // control+shift is not "control only"
        let ev = KeyboardEvent::special(Special::ArrowUp).with_control().with_shift();
        assert_eq!(ev.translated(), ev);

        let ctrl_s = KeyboardEvent::char('s').with_control();
        assert_eq!(ctrl_s.translated(), ctrl_s);
    }

    #[test]
    fn test_area_ids_are_unique() {
        let a = AreaId::next();
        let b = AreaId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_system_event_codes() {
        assert_eq!(SystemEvent::Paste.code(), SystemCode::Paste);
        let sync = SystemEvent::thread_sync(AreaId::next(), Box::new(5u32));
        assert_eq!(sync.code(), SystemCode::ThreadSync);
        assert!(format!("{:?}", sync).contains("ThreadSync"));
    }
}
