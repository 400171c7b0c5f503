//! Loop termination predicates.
//!
//! Each running event loop (the outer one and every nested popup loop) polls
//! exactly one `StopCondition` before taking its next event.

use super::event::{KeyboardEvent, Special, SystemEvent};
use std::cell::Cell;
use std::rc::Rc;

pub trait StopCondition {
    fn continue_loop(&self) -> bool;
}

/// Condition of the outermost loop: keep the whole shell running
#[derive(Debug)]
pub struct ShellRunning {
    running: Cell<bool>,
}

impl Default for ShellRunning {
    fn default() -> Self {
        Self {
            running: Cell::new(true),
        }
    }
}

impl ShellRunning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl StopCondition for ShellRunning {
    fn continue_loop(&self) -> bool {
        self.running.get()
    }
}

/// Accept/reject state machine owned by a popup.
///
/// Starts "open and cancelled": a popup that ends without an explicit accept
/// (escape, close, forced shutdown) reports `cancelled() == true`.
#[derive(Debug)]
pub struct PopupClosing {
    should_continue: Cell<bool>,
    cancelled: Cell<bool>,
}

impl Default for PopupClosing {
    fn default() -> Self {
        Self {
            should_continue: Cell::new(true),
            cancelled: Cell::new(true),
        }
    }
}

impl PopupClosing {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Accept the popup's result and end its loop
    pub fn do_ok(&self) {
        self.cancelled.set(false);
        self.should_continue.set(false);
    }

    /// Discard the popup's result and end its loop
    pub fn do_cancel(&self) {
        self.cancelled.set(true);
        self.should_continue.set(false);
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Escape cancels
    pub fn on_keyboard_event(&self, event: &KeyboardEvent) -> bool {
        if event.is_special(Special::Escape) && event.modifiers.is_empty() {
            self.do_cancel();
            return true;
        }
        false
    }

    /// Ok accepts, Cancel and Close reject
    pub fn on_system_event(&self, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::Cancel | SystemEvent::Close => {
                self.do_cancel();
                true
            }
            SystemEvent::Ok => {
                self.do_ok();
                true
            }
            _ => false,
        }
    }
}

impl StopCondition for PopupClosing {
    fn continue_loop(&self) -> bool {
        self.should_continue.get()
    }
}

/// Per-popup wrapper around the caller's condition.
///
/// Lets the shell end a popup from outside (its owner going away, shutdown)
/// while still leaving through the normal loop exit.
pub struct PopupStop {
    inner: Rc<dyn StopCondition>,
    forced: Cell<bool>,
}

impl PopupStop {
    pub fn wrap(inner: Rc<dyn StopCondition>) -> Rc<Self> {
        Rc::new(Self {
            inner,
            forced: Cell::new(false),
        })
    }

    pub fn force_close(&self) {
        self.forced.set(true);
    }

    pub fn forced(&self) -> bool {
        self.forced.get()
    }
}

impl StopCondition for PopupStop {
    fn continue_loop(&self) -> bool {
        !self.forced.get() && self.inner.continue_loop()
    }
}
