//! Plain text editor application.
//!
//! Files are read and written on the background runtime; results come back
//! as `ThreadSync` events addressed to the editing area.

use crate::core::application::{Application, AreaLayout, InstanceId};
use crate::core::area::{Area, AreaQuery, Queryable};
use crate::core::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use crate::core::shell::Shell;
use crate::popups::{char_name, EditPopup, YesNoPopup};
use crate::sound::Sound;
use anyhow::{Context, Result};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const UNTITLED: &str = "Untitled";
const SAVE_AS: &str = "Save as";
const SAVE_CHANGES: &str = "Save changes?";

/// Lines plus a (column, row) cursor; columns count chars
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self { lines, row: 0, col: 0 }
    }

    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.row]
    }

    pub fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    pub fn split_line(&mut self) {
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        let rest = line.split_off(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, rest);
    }

    /// Insert pasted lines at the cursor; the cursor ends after the text
    pub fn insert_lines(&mut self, lines: &[String]) {
        for (i, text) in lines.iter().enumerate() {
            if i > 0 {
                self.split_line();
            }
            for c in text.chars().filter(|c| !c.is_control() || *c == '\t') {
                self.insert_char(c);
            }
        }
    }

    /// Removed char, `'\n'` when two lines were joined
    pub fn backspace(&mut self) -> Option<char> {
        if self.col > 0 {
            self.col -= 1;
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            return Some(line.remove(at));
        }
        if self.row == 0 {
            return None;
        }
        let line = self.lines.remove(self.row);
        self.row -= 1;
        self.col = char_len(&self.lines[self.row]);
        self.lines[self.row].push_str(&line);
        Some('\n')
    }

    pub fn delete(&mut self) -> Option<char> {
        let len = char_len(&self.lines[self.row]);
        if self.col < len {
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            return Some(line.remove(at));
        }
        if self.row + 1 >= self.lines.len() {
            return None;
        }
        let next = self.lines.remove(self.row + 1);
        self.lines[self.row].push_str(&next);
        Some('\n')
    }

    /// Remove the current line; the last remaining line is only cleared
    pub fn delete_line(&mut self) -> String {
        if self.lines.len() == 1 {
            self.col = 0;
            return std::mem::take(&mut self.lines[0]);
        }
        let removed = self.lines.remove(self.row);
        self.row = self.row.min(self.lines.len() - 1);
        self.col = self.col.min(char_len(&self.lines[self.row]));
        removed
    }

    pub fn move_up(&mut self) -> bool {
        if self.row == 0 {
            return false;
        }
        self.row -= 1;
        self.col = self.col.min(char_len(&self.lines[self.row]));
        true
    }

    pub fn move_down(&mut self) -> bool {
        if self.row + 1 >= self.lines.len() {
            return false;
        }
        self.row += 1;
        self.col = self.col.min(char_len(&self.lines[self.row]));
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.col == 0 {
            return false;
        }
        self.col -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.col >= char_len(&self.lines[self.row]) {
            return false;
        }
        self.col += 1;
        true
    }

    pub fn home(&mut self) {
        self.col = 0;
    }

    pub fn end(&mut self) {
        self.col = char_len(&self.lines[self.row]);
    }

    pub fn char_at_cursor(&self) -> Option<char> {
        self.lines[self.row].chars().nth(self.col)
    }

    /// Move the cursor, clamped into the text
    pub fn set_cursor(&mut self, col: usize, row: usize) {
        self.row = row.min(self.lines.len() - 1);
        self.col = col.min(char_len(&self.lines[self.row]));
    }

    /// Text between two (column, row) points; empty when they coincide
    pub fn region(&self, a: (usize, usize), b: (usize, usize)) -> Vec<String> {
        let ((c1, r1), (c2, r2)) = self.ordered(a, b);
        if (c1, r1) == (c2, r2) {
            return Vec::new();
        }
        if r1 == r2 {
            return vec![self.lines[r1].chars().skip(c1).take(c2 - c1).collect()];
        }
        let mut lines = vec![self.lines[r1].chars().skip(c1).collect::<String>()];
        lines.extend(self.lines[r1 + 1..r2].iter().cloned());
        lines.push(self.lines[r2].chars().take(c2).collect());
        lines
    }

    /// Remove the text between two points; the cursor lands where it began
    pub fn delete_region(&mut self, a: (usize, usize), b: (usize, usize)) {
        let ((c1, r1), (c2, r2)) = self.ordered(a, b);
        let head: String = self.lines[r1].chars().take(c1).collect();
        let tail: String = self.lines[r2].chars().skip(c2).collect();
        self.lines.splice(r1..=r2, std::iter::once(head + &tail));
        self.row = r1;
        self.col = c1;
    }

    /// Clamp both points into the text and put them in reading order
    fn ordered(&self, a: (usize, usize), b: (usize, usize)) -> ((usize, usize), (usize, usize)) {
        let clamp = |(col, row): (usize, usize)| {
            let row = row.min(self.lines.len() - 1);
            (col.min(char_len(&self.lines[row])), row)
        };
        let (a, b) = (clamp(a), clamp(b));
        if (a.1, a.0) <= (b.1, b.0) {
            (a, b)
        } else {
            (b, a)
        }
    }
}

fn removed_name(c: char) -> String {
    if c == '\n' {
        "new line".to_string()
    } else {
        char_name(Some(c))
    }
}

fn line_text(line: &str) -> String {
    if line.trim().is_empty() {
        "blank".to_string()
    } else {
        line.to_string()
    }
}

/// Background read of the file being opened
#[derive(Debug)]
struct Loaded {
    path: PathBuf,
    text: std::result::Result<String, String>,
}

fn read_file(path: PathBuf) -> Loaded {
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .map_err(|e| format!("{:#}", e));
    Loaded { path, text }
}

/// Background write; `revision` is the edit count the written text had
#[derive(Debug)]
struct Saved {
    path: PathBuf,
    revision: u64,
    result: std::result::Result<(), String>,
}

fn write_file(path: PathBuf, text: String, revision: u64) -> Saved {
    let result = fs::write(&path, text)
        .with_context(|| format!("Failed to write {}", path.display()))
        .map_err(|e| format!("{:#}", e));
    Saved {
        path,
        revision,
        result,
    }
}

pub struct NotepadArea {
    id: AreaId,
    buffer: RefCell<TextBuffer>,
    path: RefCell<Option<PathBuf>>,
    modified: Cell<bool>,
    /// Bumped by every edit
    revision: Cell<u64>,
    /// Start of a region, set by `RegionPoint`
    anchor: Cell<Option<(usize, usize)>>,
    loading: Cell<bool>,
    saving: Cell<bool>,
    close_after_save: Cell<bool>,
    instance: Cell<Option<InstanceId>>,
}

impl NotepadArea {
    fn new(buffer: TextBuffer, path: Option<PathBuf>) -> Self {
        Self {
            id: AreaId::next(),
            buffer: RefCell::new(buffer),
            path: RefCell::new(path),
            modified: Cell::new(false),
            revision: Cell::new(0),
            anchor: Cell::new(None),
            loading: Cell::new(false),
            saving: Cell::new(false),
            close_after_save: Cell::new(false),
            instance: Cell::new(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.get()
    }

    pub fn text(&self) -> String {
        self.buffer.borrow().text()
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }

    fn touch(&self) {
        self.modified.set(true);
        self.revision.set(self.revision.get() + 1);
    }

    fn edited(&self, shell: &mut Shell, spoken: &str) {
        self.touch();
        shell.say(spoken);
        shell.on_area_new_content(self);
    }

    /// Start reading `path`; the text replaces the buffer when it arrives
    fn load(&self, shell: &mut Shell, path: PathBuf) -> bool {
        self.loading.set(true);
        tracing::debug!("Loading {}", path.display());
        let started = shell.spawn_job(self.id, move || read_file(path));
        if !started {
            self.loading.set(false);
        }
        started
    }

    fn apply_loaded(&self, shell: &mut Shell, loaded: &Loaded) {
        if self.path.borrow().as_deref() != Some(loaded.path.as_path()) {
            tracing::debug!("Dropping stale read of {}", loaded.path.display());
            return;
        }
        self.loading.set(false);
        match &loaded.text {
            Ok(text) => {
                *self.buffer.borrow_mut() = TextBuffer::from_text(text);
                self.modified.set(false);
                shell.on_area_new_content(self);
                shell.on_area_new_hot_point(self);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                shell.play(Sound::Error);
                shell.message(&format!("Cannot open {}", loaded.path.display()));
                if let Some(instance) = self.instance.get() {
                    shell.close_app(instance);
                }
            }
        }
    }

    fn apply_saved(&self, shell: &mut Shell, saved: &Saved) {
        self.saving.set(false);
        let close = self.close_after_save.take();
        match &saved.result {
            Ok(()) => {
                tracing::info!("Saved {}", saved.path.display());
                *self.path.borrow_mut() = Some(saved.path.clone());
                // edits made while writing stay unsaved
                if self.revision.get() == saved.revision {
                    self.modified.set(false);
                }
                shell.play(Sound::Ok);
                shell.message(&format!("Saved {}", file_name(&saved.path)));
                shell.on_area_new_name(self);
                if close && !self.modified.get() {
                    if let Some(instance) = self.instance.get() {
                        shell.close_app(instance);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("{}", e);
                shell.play(Sound::Error);
                shell.message(&format!("Cannot save {}", saved.path.display()));
            }
        }
    }

    fn moved(&self, shell: &mut Shell, spoken: &str) {
        shell.say(spoken);
        shell.on_area_new_hot_point(self);
    }

    /// Start writing the text; completion arrives as a `Saved` result
    fn save(&self, shell: &mut Shell) -> bool {
        if self.loading.get() {
            return false;
        }
        if self.saving.get() {
            shell.play(Sound::Blocked);
            return true;
        }
        let path = self.path.borrow().clone();
        let path = match path {
            Some(path) => path,
            None => match self.ask_path(shell) {
                Some(path) => path,
                None => return true,
            },
        };
        let text = self.text();
        let revision = self.revision.get();
        self.saving.set(true);
        let target = path.clone();
        if !shell.spawn_job(self.id, move || write_file(target, text, revision)) {
            self.saving.set(false);
            shell.play(Sound::Error);
            shell.message(&format!("Cannot save {}", path.display()));
        }
        true
    }

    /// Close the application, offering to save unsaved changes first
    fn close(&self, shell: &mut Shell) -> bool {
        let Some(instance) = self.instance.get() else {
            return false;
        };
        if self.modified.get() {
            let popup = YesNoPopup::new(&self.name(), SAVE_CHANGES, true);
            if !shell.popup(instance, Rc::clone(&popup)) {
                return true;
            }
            match popup.result() {
                None => return true,
                Some(true) => {
                    // the save result closes the application
                    self.close_after_save.set(true);
                    self.save(shell);
                    if !self.saving.get() {
                        self.close_after_save.set(false);
                    }
                    return true;
                }
                Some(false) => {}
            }
        }
        shell.close_app(instance);
        true
    }

    fn ask_path(&self, shell: &mut Shell) -> Option<PathBuf> {
        let instance = self.instance.get()?;
        let start = shell
            .settings()
            .user_home_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));
        let mut initial = start.display().to_string();
        if !initial.ends_with(std::path::MAIN_SEPARATOR) {
            initial.push(std::path::MAIN_SEPARATOR);
        }
        let popup = EditPopup::new(SAVE_AS, &initial);
        if !shell.popup(instance, Rc::clone(&popup)) {
            return None;
        }
        let text = popup.result()?;
        let text = text.trim();
        if text.is_empty() || text.ends_with(std::path::MAIN_SEPARATOR) {
            shell.play(Sound::Cancel);
            return None;
        }
        Some(PathBuf::from(text))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Area for NotepadArea {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        match &*self.path.borrow() {
            Some(path) => file_name(path),
            None => UNTITLED.to_string(),
        }
    }

    fn line_count(&self) -> usize {
        self.buffer.borrow().lines().len()
    }

    fn line(&self, index: usize) -> String {
        self.buffer.borrow().lines().get(index).cloned().unwrap_or_default()
    }

    fn hot_point(&self) -> (usize, usize) {
        self.buffer.borrow().cursor()
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if self.loading.get() || event.modifiers.control || event.modifiers.alt() {
            return false;
        }
        if let Some(c) = event.as_char() {
            self.buffer.borrow_mut().insert_char(c);
            self.edited(shell, &char_name(Some(c)));
            return true;
        }
        let Some(special) = event.as_special() else {
            return false;
        };
        let mut buffer = self.buffer.borrow_mut();
        match special {
            Special::Enter => {
                buffer.split_line();
                drop(buffer);
                self.edited(shell, "new line");
            }
            Special::Tab => {
                buffer.insert_char('\t');
                drop(buffer);
                self.edited(shell, "tab");
            }
            Special::Backspace => {
                let Some(c) = buffer.backspace() else {
                    return false;
                };
                drop(buffer);
                self.edited(shell, &removed_name(c));
            }
            Special::Delete => {
                let Some(c) = buffer.delete() else {
                    return false;
                };
                drop(buffer);
                self.edited(shell, &removed_name(c));
            }
            Special::ArrowUp | Special::ArrowDown => {
                let moved = if special == Special::ArrowUp {
                    buffer.move_up()
                } else {
                    buffer.move_down()
                };
                if !moved {
                    return false;
                }
                let text = line_text(buffer.current_line());
                drop(buffer);
                self.moved(shell, &text);
            }
            Special::ArrowLeft | Special::ArrowRight => {
                let moved = if special == Special::ArrowLeft {
                    buffer.move_left()
                } else {
                    buffer.move_right()
                };
                if !moved {
                    return false;
                }
                let c = buffer.char_at_cursor();
                drop(buffer);
                self.moved(shell, &char_name(c));
            }
            Special::Home => {
                buffer.home();
                let c = buffer.char_at_cursor();
                drop(buffer);
                self.moved(shell, &char_name(c));
            }
            Special::End => {
                buffer.end();
                drop(buffer);
                self.moved(shell, &char_name(None));
            }
            _ => return false,
        }
        true
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::ThreadSync { payload, .. } => {
                if let Some(loaded) = payload.downcast_ref::<Loaded>() {
                    self.apply_loaded(shell, loaded);
                    true
                } else if let Some(saved) = payload.downcast_ref::<Saved>() {
                    self.apply_saved(shell, saved);
                    true
                } else {
                    false
                }
            }
            SystemEvent::Close => self.close(shell),
            _ if self.loading.get() => false,
            SystemEvent::Insert(lines) => {
                if lines.is_empty() {
                    return false;
                }
                self.buffer.borrow_mut().insert_lines(lines);
                self.touch();
                shell.on_area_new_content(self);
                true
            }
            SystemEvent::Save => self.save(shell),
            SystemEvent::DeleteRegion => {
                match self.anchor.take() {
                    Some(anchor) => {
                        let cursor = self.buffer.borrow().cursor();
                        self.buffer.borrow_mut().delete_region(anchor, cursor);
                    }
                    None => {
                        let removed = self.buffer.borrow_mut().delete_line();
                        tracing::debug!("Deleted line of {} chars", char_len(&removed));
                    }
                }
                let current = line_text(self.buffer.borrow().current_line());
                self.edited(shell, &current);
                true
            }
            SystemEvent::RegionPoint => {
                self.anchor.set(Some(self.buffer.borrow().cursor()));
                true
            }
            SystemEvent::MoveHotPoint { x, y } => {
                self.buffer.borrow_mut().set_cursor(*x, *y);
                shell.on_area_new_hot_point(self);
                true
            }
            _ => false,
        }
    }

    fn queryable(&self) -> Option<&dyn Queryable> {
        Some(self)
    }
}

impl Queryable for NotepadArea {
    fn on_area_query(&self, query: &mut AreaQuery) -> bool {
        match query {
            AreaQuery::Region(_) => {
                let buffer = self.buffer.borrow();
                let lines = match self.anchor.get() {
                    Some(anchor) => buffer.region(anchor, buffer.cursor()),
                    None => vec![buffer.current_line().to_string()],
                };
                drop(buffer);
                query.answer_region(lines)
            }
            AreaQuery::CurrentDir(_) => {
                let dir = self
                    .path
                    .borrow()
                    .as_ref()
                    .and_then(|p| p.parent().map(Path::to_path_buf))
                    .filter(|d| d.is_dir());
                match dir {
                    Some(dir) => query.answer_dir(dir),
                    None => false,
                }
            }
            AreaQuery::BackgroundSound(_) => false,
        }
    }
}

pub struct Notepad {
    path: Option<PathBuf>,
    area: RefCell<Option<Rc<NotepadArea>>>,
}

impl Notepad {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            area: RefCell::new(None),
        }
    }

    pub fn area(&self) -> Option<Rc<NotepadArea>> {
        self.area.borrow().clone()
    }
}

impl Application for Notepad {
    fn name(&self) -> String {
        "Notepad".to_string()
    }

    fn on_launch(&self, shell: &mut Shell, instance: InstanceId) -> Result<bool> {
        let area = Rc::new(NotepadArea::new(TextBuffer::default(), self.path.clone()));
        area.instance.set(Some(instance));
        if let Some(path) = self.path.as_ref().filter(|p| p.exists()) {
            if !area.load(shell, path.clone()) {
                anyhow::bail!("Cannot start reading {}", path.display());
            }
        }
        *self.area.borrow_mut() = Some(area);
        Ok(true)
    }

    fn areas_to_show(&self) -> Result<Option<AreaLayout>> {
        Ok(self
            .area
            .borrow()
            .clone()
            .map(|area| AreaLayout::single(area)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::application::AppHandle;
    use crate::core::event::Event;
    use crate::core::testing::test_shell;

    /// Wait for the next background result and hand it to the area
    fn settle(shell: &mut Shell, area: &NotepadArea) {
        match shell.queue().take_next() {
            Some(Event::System(event)) => assert!(area.on_system_event(shell, &event)),
            other => panic!("expected a job result, got {:?}", other),
        }
    }

    fn scratch_file(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("talkshell-notepad-{}-{}.txt", name, std::process::id()));
        fs::write(&path, text).unwrap();
        path
    }

    fn open(shell: &mut Shell, path: Option<PathBuf>) -> Rc<NotepadArea> {
        let notepad = Rc::new(Notepad::new(path));
        let handle: AppHandle = notepad.clone();
        shell.launch(handle).unwrap();
        notepad.area().unwrap()
    }

    fn typed(text: &str) -> TextBuffer {
        let mut buffer = TextBuffer::default();
        for c in text.chars() {
            if c == '\n' {
                buffer.split_line();
            } else {
                buffer.insert_char(c);
            }
        }
        buffer
    }

    #[test]
    fn test_buffer_editing() {
        let mut buffer = typed("ab\ncd");
        assert_eq!(buffer.cursor(), (2, 1));
        buffer.home();
        assert_eq!(buffer.backspace(), Some('\n'));
        assert_eq!(buffer.lines(), ["abcd".to_string()]);
        assert_eq!(buffer.cursor(), (2, 0));
        assert_eq!(buffer.delete(), Some('c'));
        buffer.end();
        assert_eq!(buffer.delete(), None);
        assert_eq!(buffer.text(), "abd\n");
    }

    #[test]
    fn test_insert_lines_and_delete_line() {
        let mut buffer = TextBuffer::from_text("xy");
        buffer.move_right();
        buffer.insert_lines(&["1".to_string(), "2".to_string()]);
        assert_eq!(buffer.lines(), ["x1".to_string(), "2y".to_string()]);
        assert_eq!(buffer.delete_line(), "2y");
        assert_eq!(buffer.lines(), ["x1".to_string()]);
        assert_eq!(buffer.delete_line(), "x1");
        assert_eq!(buffer.lines(), [String::new()]);
    }

    #[test]
    fn test_cursor_clamps_between_lines() {
        let mut buffer = TextBuffer::from_text("long line\nab");
        buffer.end();
        assert!(buffer.move_down());
        assert_eq!(buffer.cursor(), (2, 1));
        assert!(!buffer.move_down());
    }

    #[test]
    fn test_typing_and_region() {
        let (mut shell, recorder) = test_shell();
        let notepad = Rc::new(Notepad::new(None));
        let handle: AppHandle = notepad.clone();
        shell.launch(handle).unwrap();
        let area = notepad.area().unwrap();
        for c in "hi".chars() {
            assert!(area.on_keyboard_event(&mut shell, &KeyboardEvent::char(c)));
        }
        assert_eq!(recorder.spoken().last().map(String::as_str), Some("i"));
        assert!(area.is_modified());
        assert_eq!(area.name(), UNTITLED);

        let mut query = AreaQuery::region();
        assert!(shell.query_active(&mut query));
        assert_eq!(query, AreaQuery::Region(Some(vec!["hi".to_string()])));
    }

    #[test]
    fn test_region_between_points() {
        let mut buffer = TextBuffer::from_text("one two\nthree\nfour five");
        assert!(buffer.region((2, 1), (2, 1)).is_empty());
        assert_eq!(buffer.region((5, 0), (4, 0)), vec!["t".to_string()]);
        assert_eq!(
            buffer.region((4, 2), (4, 0)),
            vec!["two".to_string(), "three".to_string(), "four".to_string()]
        );
        buffer.delete_region((4, 0), (5, 2));
        assert_eq!(buffer.lines(), ["one five".to_string()]);
        assert_eq!(buffer.cursor(), (4, 0));
        buffer.set_cursor(40, 9);
        assert_eq!(buffer.cursor(), (8, 0));
    }

    #[test]
    fn test_save_writes_file() {
        let path = scratch_file("save", "first\n");
        let (mut shell, recorder) = test_shell();
        let area = open(&mut shell, Some(path.clone()));
        settle(&mut shell, &area);
        assert_eq!(area.line(0), "first");

        area.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::End));
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('!'));
        assert!(area.on_system_event(&mut shell, &SystemEvent::Save));
        assert!(area.is_saving());
        settle(&mut shell, &area);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first!\n");
        assert!(!area.is_modified());
        assert_eq!(recorder.played(Sound::Ok), 1);

        let mut query = AreaQuery::current_dir();
        assert!(area.on_area_query(&mut query));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_keys_refused_until_file_arrives() {
        let path = scratch_file("loading", "first\n");
        let (mut shell, _recorder) = test_shell();
        let area = open(&mut shell, Some(path.clone()));
        assert!(area.is_loading());
        assert!(!area.on_keyboard_event(&mut shell, &KeyboardEvent::char('x')));
        assert!(!area.on_system_event(&mut shell, &SystemEvent::Insert(vec!["y".to_string()])));
        assert!(!area.on_system_event(&mut shell, &SystemEvent::Save));

        settle(&mut shell, &area);
        assert!(!area.is_loading());
        assert_eq!(area.line(0), "first");
        assert!(!area.is_modified());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_edit_during_save_stays_modified() {
        let path = scratch_file("racing", "first\n");
        let (mut shell, _recorder) = test_shell();
        let area = open(&mut shell, Some(path.clone()));
        settle(&mut shell, &area);
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('a'));
        assert!(area.on_system_event(&mut shell, &SystemEvent::Save));
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('b'));

        settle(&mut shell, &area);
        assert_eq!(fs::read_to_string(&path).unwrap(), "afirst\n");
        assert!(area.is_modified());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unreadable_file_closes_the_editor() {
        let dir = std::env::temp_dir().join(format!("talkshell-notepad-dir-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let (mut shell, recorder) = test_shell();
        let area = open(&mut shell, Some(dir.clone()));
        assert_eq!(shell.app_count(), 1);
        settle(&mut shell, &area);
        assert_eq!(recorder.played(Sound::Error), 1);
        assert_eq!(shell.app_count(), 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_region_point_copies_across_lines() {
        let (mut shell, _recorder) = test_shell();
        let area = open(&mut shell, None);
        for c in "ab".chars() {
            area.on_keyboard_event(&mut shell, &KeyboardEvent::char(c));
        }
        assert!(area.on_system_event(&mut shell, &SystemEvent::RegionPoint));
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('c'));
        area.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Enter));
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('d'));

        let mut query = AreaQuery::region();
        assert!(area.on_area_query(&mut query));
        assert_eq!(query, AreaQuery::Region(Some(vec!["c".to_string(), "d".to_string()])));

        assert!(area.on_system_event(&mut shell, &SystemEvent::DeleteRegion));
        assert_eq!(area.text(), "ab\n");
        // without an anchor the region is the current line again
        let mut query = AreaQuery::region();
        assert!(area.on_area_query(&mut query));
        assert_eq!(query, AreaQuery::Region(Some(vec!["ab".to_string()])));
    }

    #[test]
    fn test_move_hot_point_places_cursor() {
        let (mut shell, _recorder) = test_shell();
        let area = open(&mut shell, None);
        assert!(area.on_system_event(&mut shell, &SystemEvent::Insert(vec!["xyz".to_string(), "uv".to_string()])));
        assert!(area.on_system_event(&mut shell, &SystemEvent::MoveHotPoint { x: 1, y: 0 }));
        assert_eq!(area.hot_point(), (1, 0));
    }

    #[test]
    fn test_close_event_closes_app() {
        let (mut shell, _recorder) = test_shell();
        let notepad = Rc::new(Notepad::new(None));
        let handle: AppHandle = notepad.clone();
        shell.launch(handle).unwrap();
        let area = notepad.area().unwrap();
        assert!(area.on_system_event(&mut shell, &SystemEvent::Close));
        assert_eq!(shell.app_count(), 0);
    }

    #[test]
    fn test_close_with_changes_asks_first() {
        let (mut shell, _recorder) = test_shell();
        let notepad = Rc::new(Notepad::new(None));
        let handle: AppHandle = notepad.clone();
        shell.launch(handle).unwrap();
        let area = notepad.area().unwrap();
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('x'));

        // Escape keeps the document open
        shell.enqueue(KeyboardEvent::special(Special::Escape));
        assert!(area.on_system_event(&mut shell, &SystemEvent::Close));
        assert_eq!(shell.app_count(), 1);

        // "n" discards the changes
        shell.enqueue(KeyboardEvent::char('n'));
        shell.queue().shutdown();
        assert!(area.on_system_event(&mut shell, &SystemEvent::Close));
        assert_eq!(shell.app_count(), 0);
    }

    #[test]
    fn test_close_with_save_closes_once_written() {
        let path = scratch_file("close", "");
        let (mut shell, _recorder) = test_shell();
        let area = open(&mut shell, Some(path.clone()));
        settle(&mut shell, &area);
        area.on_keyboard_event(&mut shell, &KeyboardEvent::char('z'));

        shell.enqueue(KeyboardEvent::char('y'));
        assert!(area.on_system_event(&mut shell, &SystemEvent::Close));
        assert_eq!(shell.app_count(), 1);
        settle(&mut shell, &area);
        assert_eq!(fs::read_to_string(&path).unwrap(), "z\n");
        assert_eq!(shell.app_count(), 0);
        let _ = fs::remove_file(&path);
    }
}
