//! Terminal frontend: crossterm input thread and ratatui renderer.
//!
//! The core never imports from here; it only sees the `EventSender` the
//! input thread pushes through and the `Renderer` trait object.

pub mod events;
pub mod input;
pub mod tui;

pub use input::spawn_input_thread;
pub use tui::TuiRenderer;
