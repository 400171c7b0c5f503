//! Input thread: polls the terminal and feeds the shell's queue.

use super::events::convert_event;
use crate::core::queue::EventSender;
use anyhow::{Context, Result};
use crossterm::event;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the thread checks for shutdown when no input arrives
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Start polling; the thread ends once the queue refuses events
pub fn spawn_input_thread(sender: EventSender) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("talkshell-input".to_string())
        .spawn(move || input_loop(sender))
        .context("Failed to start input thread")
}

fn input_loop(sender: EventSender) {
    tracing::debug!("Input thread started");
    while !sender.is_shut_down() {
        match event::poll(POLL_TIMEOUT) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::error!("Terminal input failed: {}", e);
                break;
            }
        }
        let term_event = match event::read() {
            Ok(term_event) => term_event,
            Err(e) => {
                tracing::warn!("Failed to read terminal event: {}", e);
                continue;
            }
        };
        if let Some(shell_event) = convert_event(term_event) {
            if !sender.enqueue(shell_event) {
                break;
            }
        }
    }
    tracing::debug!("Input thread finished");
}
