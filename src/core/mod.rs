//! Shell core: event model, queue, areas and applications, popups, the
//! dispatcher and the command/key registries.
//!
//! NO imports from frontend/ or rendering code. The core produces a
//! `ScreenView` snapshot and hands it to whatever `Renderer` it was given.

pub mod application;
pub mod area;
pub mod commands;
pub mod event;
pub mod fault;
pub mod jobs;
pub mod keymap;
pub mod phrases;
pub mod popups;
pub mod queue;
pub mod registry;
pub mod screen;
pub mod search;
pub mod shell;
pub mod standard_commands;
pub mod stop;

#[cfg(test)]
pub mod testing;

pub use shell::{Shell, ShellSettings};
