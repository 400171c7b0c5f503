//! Thread-safe FIFO between input producers and the dispatcher.
//!
//! Producers (input thread, background jobs, the dispatcher itself) push
//! through an `EventSender`; the single dispatcher thread blocks in
//! `take_next`. No priorities, no coalescing, nothing dropped until shutdown.

use super::event::Event;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct State {
    events: VecDeque<Event>,
    shutdown: bool,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    available: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // A producer panicking mid-push cannot leave the deque inconsistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: Event, after_shutdown: bool) -> bool {
        let mut state = self.lock();
        if state.shutdown && !after_shutdown {
            return false;
        }
        state.events.push_back(event);
        drop(state);
        self.available.notify_one();
        true
    }
}

/// Consumer side, owned by the dispatcher
#[derive(Default)]
pub struct EventQueue {
    inner: Arc<Inner>,
}

/// Cloneable producer handle
#[derive(Clone)]
pub struct EventSender {
    inner: Arc<Inner>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Post from the dispatcher itself; accepted even while draining after
    /// shutdown, so events posted by handlers still run before the loops end
    pub fn enqueue(&self, event: impl Into<Event>) {
        self.inner.push(event.into(), true);
    }

    /// Block until an event is available.
    ///
    /// Returns `None` only once the queue has been shut down and drained.
    pub fn take_next(&self) -> Option<Event> {
        let mut state = self.inner.lock();
        loop {
            if let Some(event) = state.events.pop_front() {
                return Some(event);
            }
            if state.shutdown {
                return None;
            }
            state = self
                .inner
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Non-blocking variant of `take_next`
    pub fn try_take(&self) -> Option<Event> {
        self.inner.lock().events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shutdown
    }

    /// Refuse events from senders; loops exit once the backlog is drained
    pub fn shutdown(&self) {
        self.inner.lock().shutdown = true;
        self.inner.available.notify_all();
    }

    /// Drop everything still pending (teardown)
    pub fn discard_pending(&self) -> usize {
        let mut state = self.inner.lock();
        let dropped = state.events.len();
        state.events.clear();
        dropped
    }
}

impl EventSender {
    /// Push an event; returns false after shutdown
    pub fn enqueue(&self, event: impl Into<Event>) -> bool {
        let accepted = self.inner.push(event.into(), false);
        if !accepted {
            tracing::debug!("Event dropped, queue is shut down");
        }
        accepted
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::KeyboardEvent;
    use std::thread;

    fn char_of(event: Event) -> char {
        match event {
            Event::Keyboard(k) => k.as_char().unwrap(),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new();
        for c in "abcdef".chars() {
            queue.enqueue(KeyboardEvent::char(c));
        }
        let got: String = (0..6).map(|_| char_of(queue.take_next().unwrap())).collect();
        assert_eq!(got, "abcdef");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_blocking_consumer_wakes_for_other_thread() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        let producer = thread::spawn(move || {
            for c in "xyz".chars() {
                sender.enqueue(KeyboardEvent::char(c));
            }
        });
        let got: String = (0..3).map(|_| char_of(queue.take_next().unwrap())).collect();
        producer.join().unwrap();
        assert_eq!(got, "xyz");
    }

    #[test]
    fn test_shutdown_drains_then_ends() {
        let queue = EventQueue::new();
        queue.enqueue(KeyboardEvent::char('a'));
        queue.shutdown();
        assert!(!queue.sender().enqueue(KeyboardEvent::char('b')));
        assert_eq!(char_of(queue.take_next().unwrap()), 'a');
        assert!(queue.take_next().is_none());
    }

    #[test]
    fn test_dispatcher_can_post_while_draining() {
        let queue = EventQueue::new();
        queue.shutdown();
        queue.enqueue(KeyboardEvent::char('c'));
        assert_eq!(char_of(queue.take_next().unwrap()), 'c');
        assert!(queue.take_next().is_none());
    }

    #[test]
    fn test_discard_pending() {
        let queue = EventQueue::new();
        queue.enqueue(KeyboardEvent::char('a'));
        queue.enqueue(KeyboardEvent::char('b'));
        assert_eq!(queue.discard_pending(), 2);
        assert!(queue.try_take().is_none());
    }
}
