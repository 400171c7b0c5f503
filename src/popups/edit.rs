use super::{char_name, LineEditor};
use crate::core::area::{Area, Popup};
use crate::core::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use crate::core::shell::Shell;
use crate::core::stop::PopupClosing;
use std::cell::RefCell;
use std::rc::Rc;

/// Single-line text entry; Enter accepts the text
pub struct EditPopup {
    id: AreaId,
    title: String,
    editor: RefCell<LineEditor>,
    closing: Rc<PopupClosing>,
}

impl EditPopup {
    pub fn new(title: &str, initial: &str) -> Rc<Self> {
        Rc::new(Self {
            id: AreaId::next(),
            title: title.to_string(),
            editor: RefCell::new(LineEditor::new(initial)),
            closing: PopupClosing::new(),
        })
    }

    pub fn text(&self) -> String {
        self.editor.borrow().text().to_string()
    }

    /// `None` when cancelled
    pub fn result(&self) -> Option<String> {
        if self.closing.cancelled() {
            None
        } else {
            Some(self.text())
        }
    }
}

impl Area for EditPopup {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        self.title.clone()
    }

    fn line_count(&self) -> usize {
        1
    }

    fn line(&self, _index: usize) -> String {
        self.text()
    }

    fn hot_point(&self) -> (usize, usize) {
        (self.editor.borrow().cursor(), 0)
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if self.closing.on_keyboard_event(event) {
            return true;
        }
        if event.modifiers.control || event.modifiers.alt() {
            return false;
        }
        let spoken = {
            let mut editor = self.editor.borrow_mut();
            match (event.as_char(), event.as_special()) {
                (Some(c), _) => {
                    editor.insert(c);
                    char_name(Some(c))
                }
                (_, Some(Special::Enter)) => {
                    self.closing.do_ok();
                    return true;
                }
                (_, Some(Special::Backspace)) => match editor.backspace() {
                    Some(c) => char_name(Some(c)),
                    None => return false,
                },
                (_, Some(Special::Delete)) => match editor.delete() {
                    Some(c) => char_name(Some(c)),
                    None => return false,
                },
                (_, Some(Special::ArrowLeft)) => match editor.left() {
                    Some(c) => char_name(Some(c)),
                    None => return false,
                },
                (_, Some(Special::ArrowRight)) => {
                    if editor.cursor() >= editor.text().chars().count() {
                        return false;
                    }
                    char_name(editor.right())
                }
                (_, Some(Special::Home)) => {
                    editor.home();
                    char_name(editor.text().chars().next())
                }
                (_, Some(Special::End)) => {
                    editor.end();
                    char_name(None)
                }
                _ => return false,
            }
        };
        shell.say(&spoken);
        shell.on_area_new_content(self);
        true
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::Introduce => {
                shell.say(&format!("{} {}", self.title, self.text()));
                true
            }
            SystemEvent::Insert(lines) => {
                let Some(first) = lines.first() else {
                    return false;
                };
                self.editor.borrow_mut().insert_str(first);
                shell.on_area_new_content(self);
                true
            }
            other => self.closing.on_system_event(other),
        }
    }
}

impl Popup for EditPopup {
    fn closing(&self) -> Rc<PopupClosing> {
        Rc::clone(&self.closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::test_shell;

    #[test]
    fn test_typing_and_accept() {
        let (mut shell, recorder) = test_shell();
        let popup = EditPopup::new("Open file", "/tmp/");
        for c in "a.txt".chars() {
            popup.on_keyboard_event(&mut shell, &KeyboardEvent::char(c));
        }
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Backspace));
        assert_eq!(recorder.spoken().last().map(String::as_str), Some("t"));
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Enter));
        assert_eq!(popup.result().as_deref(), Some("/tmp/a.tx"));
    }

    #[test]
    fn test_paste_inserts_first_line() {
        let (mut shell, _recorder) = test_shell();
        let popup = EditPopup::new("Open file", "");
        assert!(popup.on_system_event(&mut shell, &SystemEvent::Insert(vec!["/etc".into(), "x".into()])));
        assert_eq!(popup.text(), "/etc");
        assert!(popup.on_system_event(&mut shell, &SystemEvent::Cancel));
        assert_eq!(popup.result(), None);
    }
}
