//! Area capability contracts.
//!
//! An area is the unit of keyboard focus. The dispatcher only ever talks to
//! areas through these traits; concrete widgets implement the subset they need
//! (`Area` always, `Queryable` and `Popup` optionally).
//!
//! Handlers take `&self` and receive the shell as an explicit context, so the
//! dispatcher never holds a borrow of an area while it runs. Implementations
//! keep their mutable state behind `Cell`/`RefCell` and must not hold a borrow
//! across a call back into the shell.

use super::event::{AreaId, KeyboardEvent, SystemEvent};
use super::shell::Shell;
use super::stop::PopupClosing;
use std::path::PathBuf;
use std::rc::Rc;

pub type AreaHandle = Rc<dyn Area>;

pub trait Area {
    fn area_id(&self) -> AreaId;

    /// Spoken and displayed name
    fn name(&self) -> String;

    fn line_count(&self) -> usize;

    fn line(&self, index: usize) -> String;

    /// (column, line) of the cursor
    fn hot_point(&self) -> (usize, usize) {
        (0, 0)
    }

    /// Returns true when the event was handled
    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool;

    /// Returns true when the event was handled
    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool;

    fn queryable(&self) -> Option<&dyn Queryable> {
        None
    }
}

/// Optional capability: answering typed cross-cutting queries
pub trait Queryable {
    /// Fill in the answer and return true, or leave it and return false
    fn on_area_query(&self, query: &mut AreaQuery) -> bool;
}

/// Optional capability: an area that owns its own closing condition
pub trait Popup: Area {
    fn closing(&self) -> Rc<PopupClosing>;
}

/// Typed request/response between the shell and an area
#[derive(Debug, Clone, PartialEq)]
pub enum AreaQuery {
    /// Directory the area is "in"
    CurrentDir(Option<PathBuf>),
    /// Name of a background sound the area wants while focused
    BackgroundSound(Option<String>),
    /// Lines the area considers selected or current
    Region(Option<Vec<String>>),
}

impl AreaQuery {
    pub fn current_dir() -> Self {
        AreaQuery::CurrentDir(None)
    }

    pub fn background_sound() -> Self {
        AreaQuery::BackgroundSound(None)
    }

    pub fn region() -> Self {
        AreaQuery::Region(None)
    }

    pub fn is_answered(&self) -> bool {
        match self {
            AreaQuery::CurrentDir(a) => a.is_some(),
            AreaQuery::BackgroundSound(a) => a.is_some(),
            AreaQuery::Region(a) => a.is_some(),
        }
    }

    /// Answer a `CurrentDir` query; ignored for other kinds
    pub fn answer_dir(&mut self, dir: PathBuf) -> bool {
        match self {
            AreaQuery::CurrentDir(slot) => {
                *slot = Some(dir);
                true
            }
            _ => false,
        }
    }

    pub fn answer_sound(&mut self, name: impl Into<String>) -> bool {
        match self {
            AreaQuery::BackgroundSound(slot) => {
                *slot = Some(name.into());
                true
            }
            _ => false,
        }
    }

    pub fn answer_region(&mut self, lines: Vec<String>) -> bool {
        match self {
            AreaQuery::Region(slot) => {
                *slot = Some(lines);
                true
            }
            _ => false,
        }
    }
}

/// Ask an area, returning false when it has no `Queryable` capability
pub fn query_area(area: &dyn Area, query: &mut AreaQuery) -> bool {
    match area.queryable() {
        Some(q) => q.on_area_query(query) && query.is_answered(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_only_fill_matching_kind() {
        let mut q = AreaQuery::current_dir();
        assert!(!q.answer_region(vec!["x".into()]));
        assert!(!q.is_answered());
        assert!(q.answer_dir(PathBuf::from("/tmp")));
        assert_eq!(q, AreaQuery::CurrentDir(Some(PathBuf::from("/tmp"))));
    }

    #[test]
    fn test_region_answer() {
        let mut q = AreaQuery::region();
        assert!(q.answer_region(vec!["hello".into()]));
        assert!(q.is_answered());
        assert!(!q.answer_sound("rain"));
    }
}
