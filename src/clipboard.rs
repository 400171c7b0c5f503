//! Shell clipboard for copy/paste/cut operations
//!
//! Holds the last copied lines for the whole process. When enabled, every
//! copy is also pushed to the system clipboard through arboard. Pasting only
//! ever reads the shell's own lines; system text comes in through `import_system`.

use anyhow::Result;

#[derive(Debug, Default)]
pub struct Clipboard {
    lines: Vec<String>,
    system_sync: bool,
}

impl Clipboard {
    pub fn new(system_sync: bool) -> Self {
        Self {
            lines: Vec::new(),
            system_sync,
        }
    }

    /// Replace the content; an empty slice clears it
    pub fn set(&mut self, lines: Vec<String>) {
        self.lines = lines;
        if self.system_sync && !self.lines.is_empty() {
            if let Err(e) = copy_to_system(&self.lines.join("\n")) {
                tracing::debug!("System clipboard unavailable: {}", e);
            }
        }
    }

    pub fn get(&self) -> &[String] {
        &self.lines
    }

    /// Content to paste
    pub fn contents(&self) -> Vec<String> {
        self.lines.clone()
    }

    /// Replace the content with the system clipboard's text; returns the line count
    pub fn import_system(&mut self) -> Result<usize> {
        let lines = paste_from_system()?;
        let count = lines.len();
        self.lines = lines;
        Ok(count)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Copy text to system clipboard
fn copy_to_system(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    tracing::debug!("Copied {} bytes to system clipboard", text.len());
    Ok(())
}

/// Paste text from system clipboard, split into lines
fn paste_from_system() -> Result<Vec<String>> {
    let mut clipboard = arboard::Clipboard::new()?;
    let text = clipboard.get_text()?;
    tracing::debug!("Pasted {} bytes from system clipboard", text.len());
    Ok(text.lines().map(str::to_string).collect())
}
