use super::{char_name, LineEditor};
use crate::core::area::{Area, Popup};
use crate::core::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use crate::core::shell::Shell;
use crate::core::stop::PopupClosing;
use crate::sound::Sound;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Chooser over a fixed list of names.
///
/// In editable mode the first line is an edit line that filters the list by
/// prefix; the result is then the selected match, or the typed text when
/// nothing matches.
pub struct ListPopup {
    id: AreaId,
    title: String,
    items: Vec<String>,
    editor: Option<RefCell<LineEditor>>,
    selected: Cell<usize>,
    item_sound: Option<Sound>,
    closing: Rc<PopupClosing>,
}

impl ListPopup {
    pub fn new(title: &str, items: Vec<String>) -> Rc<Self> {
        Rc::new(Self::build(title, items, false, None))
    }

    pub fn editable(title: &str, items: Vec<String>) -> Rc<Self> {
        Rc::new(Self::build(title, items, true, None))
    }

    /// Plain list that plays `item_sound` on every move between items
    pub fn menu(title: &str, items: Vec<String>, item_sound: Sound) -> Rc<Self> {
        Rc::new(Self::build(title, items, false, Some(item_sound)))
    }

    fn build(title: &str, items: Vec<String>, editable: bool, item_sound: Option<Sound>) -> Self {
        Self {
            id: AreaId::next(),
            title: title.to_string(),
            items,
            editor: editable.then(|| RefCell::new(LineEditor::default())),
            selected: Cell::new(0),
            item_sound,
            closing: PopupClosing::new(),
        }
    }

    /// Items matching the edit line (all items when not editable)
    pub fn visible_items(&self) -> Vec<String> {
        let prefix = match &self.editor {
            Some(editor) => editor.borrow().text().to_lowercase(),
            None => String::new(),
        };
        self.items
            .iter()
            .filter(|item| item.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub fn selected(&self) -> Option<String> {
        self.visible_items().get(self.selected.get()).cloned()
    }

    /// `None` when cancelled or nothing was chosen
    pub fn result(&self) -> Option<String> {
        if self.closing.cancelled() {
            return None;
        }
        if let Some(item) = self.selected() {
            return Some(item);
        }
        let typed = self.editor.as_ref()?.borrow().text().trim().to_string();
        (!typed.is_empty()).then_some(typed)
    }

    fn header_lines(&self) -> usize {
        usize::from(self.editor.is_some())
    }

    /// Navigate forward, wrapping around
    fn select_next(&self, count: usize) {
        if self.selected.get() < count.saturating_sub(1) {
            self.selected.set(self.selected.get() + 1);
        } else {
            self.selected.set(0);
        }
    }

    /// Navigate backward, wrapping around
    fn select_previous(&self, count: usize) {
        if self.selected.get() > 0 {
            self.selected.set(self.selected.get() - 1);
        } else {
            self.selected.set(count.saturating_sub(1));
        }
    }

    fn announce_selected(&self, shell: &mut Shell) {
        if let Some(sound) = self.item_sound {
            shell.play(sound);
        }
        match self.selected() {
            Some(item) => shell.say(&item),
            None => shell.play(Sound::EventNotProcessed),
        }
        shell.on_area_new_hot_point(self);
    }

    fn edit(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        let Some(editor) = &self.editor else {
            return false;
        };
        let spoken = {
            let mut editor = editor.borrow_mut();
            match (event.as_char(), event.as_special()) {
                (Some(c), _) if !event.modifiers.control && !event.modifiers.alt() => {
                    editor.insert(c);
                    char_name(Some(c))
                }
                (_, Some(Special::Backspace)) => match editor.backspace() {
                    Some(c) => char_name(Some(c)),
                    None => return false,
                },
                (_, Some(Special::Delete)) => match editor.delete() {
                    Some(c) => char_name(Some(c)),
                    None => return false,
                },
                _ => return false,
            }
        };
        self.selected.set(0);
        shell.say(&spoken);
        shell.on_area_new_content(self);
        true
    }
}

impl Area for ListPopup {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        self.title.clone()
    }

    fn line_count(&self) -> usize {
        self.header_lines() + self.visible_items().len()
    }

    fn line(&self, index: usize) -> String {
        if let (Some(editor), 0) = (&self.editor, index) {
            return format!("> {}", editor.borrow().text());
        }
        self.visible_items()
            .get(index - self.header_lines())
            .cloned()
            .unwrap_or_default()
    }

    fn hot_point(&self) -> (usize, usize) {
        if self.visible_items().is_empty() {
            let column = self.editor.as_ref().map(|e| e.borrow().cursor() + 2).unwrap_or(0);
            return (column, 0);
        }
        (0, self.header_lines() + self.selected.get())
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if self.closing.on_keyboard_event(event) {
            return true;
        }
        let count = self.visible_items().len();
        match event.as_special() {
            Some(Special::Enter) if event.modifiers.is_empty() => {
                self.closing.do_ok();
                true
            }
            Some(Special::ArrowDown) if event.modifiers.is_empty() => {
                self.select_next(count);
                self.announce_selected(shell);
                true
            }
            Some(Special::ArrowUp) if event.modifiers.is_empty() => {
                self.select_previous(count);
                self.announce_selected(shell);
                true
            }
            Some(Special::Home) if self.editor.is_none() => {
                self.selected.set(0);
                self.announce_selected(shell);
                true
            }
            Some(Special::End) if self.editor.is_none() => {
                self.selected.set(count.saturating_sub(1));
                self.announce_selected(shell);
                true
            }
            _ => self.edit(shell, event),
        }
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::Introduce => {
                let current = self.selected().unwrap_or_default();
                shell.say(&format!("{} {}", self.title, current));
                true
            }
            SystemEvent::Insert(lines) => {
                let (Some(editor), Some(first)) = (&self.editor, lines.first()) else {
                    return false;
                };
                editor.borrow_mut().insert_str(first);
                self.selected.set(0);
                shell.on_area_new_content(self);
                true
            }
            other => self.closing.on_system_event(other),
        }
    }
}

impl Popup for ListPopup {
    fn closing(&self) -> Rc<PopupClosing> {
        Rc::clone(&self.closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::test_shell;

    fn names() -> Vec<String> {
        ["copy", "cut", "notepad", "quit"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_navigation_wraps() {
        let (mut shell, recorder) = test_shell();
        let popup = ListPopup::menu("Menu", names(), Sound::MainMenuItem);
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::ArrowUp));
        assert_eq!(popup.selected().as_deref(), Some("quit"));
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::ArrowDown));
        assert_eq!(popup.selected().as_deref(), Some("copy"));
        assert_eq!(recorder.played(Sound::MainMenuItem), 2);
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Enter));
        assert_eq!(popup.result().as_deref(), Some("copy"));
    }

    #[test]
    fn test_edit_line_filters() {
        let (mut shell, _recorder) = test_shell();
        let popup = ListPopup::editable("Run", names());
        for c in "cu".chars() {
            popup.on_keyboard_event(&mut shell, &KeyboardEvent::char(c));
        }
        assert_eq!(popup.visible_items(), vec!["cut".to_string()]);
        assert_eq!(popup.line(0), "> cu");
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Enter));
        assert_eq!(popup.result().as_deref(), Some("cut"));
    }

    #[test]
    fn test_unmatched_text_is_the_result() {
        let (mut shell, _recorder) = test_shell();
        let popup = ListPopup::editable("Run", names());
        popup.on_system_event(&mut shell, &SystemEvent::Insert(vec!["bogus".into()]));
        assert!(popup.visible_items().is_empty());
        popup.on_system_event(&mut shell, &SystemEvent::Ok);
        assert_eq!(popup.result().as_deref(), Some("bogus"));
    }

    #[test]
    fn test_cancel_has_no_result() {
        let (mut shell, _recorder) = test_shell();
        let popup = ListPopup::new("Menu", names());
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Escape));
        assert_eq!(popup.result(), None);
    }
}
