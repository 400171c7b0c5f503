use crate::core::area::{Area, Popup};
use crate::core::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use crate::core::phrases;
use crate::core::shell::Shell;
use crate::core::stop::PopupClosing;
use std::cell::Cell;
use std::rc::Rc;

/// Yes/no question. Arrows toggle, `y`/`n` answer directly, Enter accepts.
pub struct YesNoPopup {
    id: AreaId,
    title: String,
    question: String,
    yes: Cell<bool>,
    closing: Rc<PopupClosing>,
}

impl YesNoPopup {
    pub fn new(title: &str, question: &str, default_yes: bool) -> Rc<Self> {
        Rc::new(Self {
            id: AreaId::next(),
            title: title.to_string(),
            question: question.to_string(),
            yes: Cell::new(default_yes),
            closing: PopupClosing::new(),
        })
    }

    /// `None` when cancelled
    pub fn result(&self) -> Option<bool> {
        if self.closing.cancelled() {
            None
        } else {
            Some(self.yes.get())
        }
    }

    fn answer_text(&self) -> &'static str {
        if self.yes.get() {
            phrases::YES
        } else {
            phrases::NO
        }
    }
}

impl Area for YesNoPopup {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        self.title.clone()
    }

    fn line_count(&self) -> usize {
        2
    }

    fn line(&self, index: usize) -> String {
        match index {
            0 => self.question.clone(),
            1 => format!("[{}]", self.answer_text()),
            _ => String::new(),
        }
    }

    fn hot_point(&self) -> (usize, usize) {
        (1, 1)
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if self.closing.on_keyboard_event(event) {
            return true;
        }
        if !event.modifiers.is_empty() && !event.modifiers.shift {
            return false;
        }
        match (event.as_char().map(|c| c.to_ascii_lowercase()), event.as_special()) {
            (Some('y'), _) => {
                self.yes.set(true);
                self.closing.do_ok();
            }
            (Some('n'), _) => {
                self.yes.set(false);
                self.closing.do_ok();
            }
            (_, Some(Special::Enter)) => self.closing.do_ok(),
            (_, Some(Special::ArrowUp | Special::ArrowDown | Special::ArrowLeft | Special::ArrowRight))
            | (_, Some(Special::Tab)) => {
                self.yes.set(!self.yes.get());
                shell.say(self.answer_text());
                shell.on_area_new_content(self);
            }
            _ => return false,
        }
        true
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        if let SystemEvent::Introduce = event {
            shell.say(&format!("{}. {} {}", self.title, self.question, self.answer_text()));
            return true;
        }
        self.closing.on_system_event(event)
    }
}

impl Popup for YesNoPopup {
    fn closing(&self) -> Rc<PopupClosing> {
        Rc::clone(&self.closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::test_shell;

    #[test]
    fn test_default_answer_and_toggle() {
        let (mut shell, recorder) = test_shell();
        let popup = YesNoPopup::new("Quit", "Really?", true);
        assert!(popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::ArrowDown)));
        assert_eq!(recorder.spoken().last().map(String::as_str), Some(phrases::NO));
        assert!(popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Enter)));
        assert_eq!(popup.result(), Some(false));
    }

    #[test]
    fn test_letters_answer_and_escape_cancels() {
        let (mut shell, _recorder) = test_shell();
        let popup = YesNoPopup::new("Quit", "Really?", false);
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::char('Y').with_shift());
        assert_eq!(popup.result(), Some(true));

        let popup = YesNoPopup::new("Quit", "Really?", true);
        popup.on_keyboard_event(&mut shell, &KeyboardEvent::special(Special::Escape));
        assert_eq!(popup.result(), None);
    }
}
