//! Incremental search over the focused area.
//!
//! While active, a `SearchArea` stands in front of the application's focused
//! area: typed characters extend the expression and move a private point to
//! the next case-insensitive match. Enter hands the point to the wrapped area
//! as a `MoveHotPoint` event, Escape leaves the wrapped area untouched.

use super::application::InstanceId;
use super::area::{query_area, Area, AreaHandle, AreaQuery, Queryable};
use super::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use super::phrases;
use super::shell::Shell;
use crate::sound::Sound;
use std::cell::{Cell, RefCell};

pub struct SearchArea {
    id: AreaId,
    inner: AreaHandle,
    instance: InstanceId,
    /// (column, line) of the current match start
    point: Cell<(usize, usize)>,
    expression: RefCell<String>,
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// First column at or after `from` where `needle` starts in `line`
fn find_in_line(line: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > line.len() {
        return None;
    }
    (from..=line.len() - needle.len())
        .find(|&start| needle.iter().zip(&line[start..]).all(|(n, c)| same_letter(*n, *c)))
}

impl SearchArea {
    pub fn new(inner: AreaHandle, instance: InstanceId, point: (usize, usize)) -> Self {
        Self {
            id: AreaId::next(),
            inner,
            instance,
            point: Cell::new(point),
            expression: RefCell::new(String::new()),
        }
    }

    pub fn expression(&self) -> String {
        self.expression.borrow().clone()
    }

    /// Next match of `needle` at or after `from`, scanning later lines too
    fn find(&self, needle: &str, from: (usize, usize)) -> Option<(usize, usize)> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return None;
        }
        let (col, row) = from;
        (row..self.inner.line_count()).find_map(|y| {
            let line: Vec<char> = self.inner.line(y).chars().collect();
            let start = if y == row { col } else { 0 };
            find_in_line(&line, &needle, start).map(|x| (x, y))
        })
    }

    fn announce(&self, shell: &mut Shell) {
        let (x, y) = self.point.get();
        let rest: String = self.inner.line(y).chars().skip(x).collect();
        shell.say(&rest);
        shell.on_area_new_hot_point(self);
    }

    fn extend(&self, shell: &mut Shell, c: char) -> bool {
        let candidate = format!("{}{}", self.expression.borrow(), c);
        match self.find(&candidate, self.point.get()) {
            Some(found) => {
                *self.expression.borrow_mut() = candidate;
                self.point.set(found);
                self.announce(shell);
            }
            None => shell.play(Sound::Blocked),
        }
        true
    }

    fn next_match(&self, shell: &mut Shell) -> bool {
        let expression = self.expression();
        let (x, y) = self.point.get();
        match self.find(&expression, (x + 1, y)) {
            Some(found) => {
                self.point.set(found);
                self.announce(shell);
            }
            None => shell.play(Sound::Blocked),
        }
        true
    }

    fn shorten(&self, shell: &mut Shell) -> bool {
        if self.expression.borrow_mut().pop().is_none() {
            shell.play(Sound::Blocked);
            return true;
        }
        self.announce(shell);
        true
    }

    fn accept(&self, shell: &mut Shell) -> bool {
        let (x, y) = self.point.get();
        let moved = self.inner.on_system_event(shell, &SystemEvent::MoveHotPoint { x, y });
        if !moved {
            tracing::debug!("{} kept its hot point", self.inner.area_id());
        }
        shell.end_search(self.instance);
        shell.play(Sound::Ok);
        shell.request_introduction();
        true
    }

    fn cancel(&self, shell: &mut Shell) -> bool {
        shell.end_search(self.instance);
        shell.play(Sound::Cancel);
        shell.message(phrases::SEARCH_CANCELLED);
        true
    }
}

impl Area for SearchArea {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        format!("{}: {}", phrases::SEARCH_MODE, self.inner.name())
    }

    fn line_count(&self) -> usize {
        self.inner.line_count()
    }

    fn line(&self, index: usize) -> String {
        self.inner.line(index)
    }

    fn hot_point(&self) -> (usize, usize) {
        let (x, y) = self.point.get();
        (x + self.expression.borrow().chars().count(), y)
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if event.modifiers.control || event.modifiers.alt() {
            return false;
        }
        if let Some(c) = event.as_char() {
            return self.extend(shell, c);
        }
        match event.as_special() {
            Some(Special::Tab) => self.next_match(shell),
            Some(Special::Backspace) => self.shorten(shell),
            Some(Special::Enter) => self.accept(shell),
            Some(Special::Escape) => self.cancel(shell),
            _ => false,
        }
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::Introduce => false,
            SystemEvent::Cancel => self.cancel(shell),
            other => self.inner.on_system_event(shell, other),
        }
    }

    fn queryable(&self) -> Option<&dyn Queryable> {
        Some(self)
    }
}

impl Queryable for SearchArea {
    fn on_area_query(&self, query: &mut AreaQuery) -> bool {
        match query {
            AreaQuery::BackgroundSound(_) => query.answer_sound(Sound::Search.file_stem()),
            _ => query_area(&*self.inner, query),
        }
    }
}
