//! Named shell commands.
//!
//! A command is a no-argument handler run synchronously on the dispatch
//! thread. Names are unique; the first registration wins.

use super::shell::Shell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type CommandFn = Rc<dyn Fn(&mut Shell)>;

#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`; false for an empty or taken name
    pub fn add(&mut self, name: &str, handler: impl Fn(&mut Shell) + 'static) -> bool {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("Refusing to register a command with an empty name");
            return false;
        }
        if self.commands.contains_key(name) {
            tracing::warn!("Command '{}' is already registered", name);
            return false;
        }
        self.commands.insert(name.to_string(), Rc::new(handler));
        true
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<CommandFn> {
        self.commands.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All names, sorted
    pub fn names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
