//! Popup stack.
//!
//! Strict LIFO: entries are pushed by `Shell::enter_popup` and removed only by
//! `remove_last`, which checks it is removing the entry its caller pushed.

use super::application::InstanceId;
use super::area::AreaHandle;
use super::event::AreaId;
use super::stop::PopupStop;
use std::rc::Rc;

/// Screen edge a popup is drawn against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
}

/// Who asked for a popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupOwner {
    /// The shell itself (quit, main menu, run action, open file)
    Shell,
    App(InstanceId),
}

pub struct PopupEntry {
    pub owner: PopupOwner,
    pub area: AreaHandle,
    pub placement: Placement,
    pub stop: Rc<PopupStop>,
}

#[derive(Default)]
pub struct PopupStack {
    entries: Vec<PopupEntry>,
}

impl PopupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PopupEntry) {
        self.entries.push(entry);
    }

    /// Pop the topmost entry, which must be the one identified by `expected`
    pub fn remove_last(&mut self, expected: &Rc<PopupStop>) -> Option<PopupEntry> {
        let top = self.entries.last()?;
        if !Rc::ptr_eq(&top.stop, expected) {
            tracing::error!(
                "Popup stack out of order: top is {}, caller expected another popup",
                top.area.area_id()
            );
            debug_assert!(false, "popups must be removed in LIFO order");
        }
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&PopupEntry> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PopupEntry> {
        self.entries.iter()
    }

    pub fn has_popup_of(&self, instance: InstanceId) -> bool {
        self.entries
            .iter()
            .any(|e| e.owner == PopupOwner::App(instance))
    }

    /// Ask every popup of `instance` to close through its loop condition
    pub fn force_close_of(&self, instance: InstanceId) -> usize {
        let mut count = 0;
        for entry in self.entries.iter().filter(|e| e.owner == PopupOwner::App(instance)) {
            entry.stop.force_close();
            count += 1;
        }
        count
    }

    /// Ask every popup to close (shutdown)
    pub fn force_close_all(&self) {
        for entry in &self.entries {
            entry.stop.force_close();
        }
    }

    pub fn find_area(&self, id: AreaId) -> Option<AreaHandle> {
        self.entries
            .iter()
            .find(|e| e.area.area_id() == id)
            .map(|e| e.area.clone())
    }
}
