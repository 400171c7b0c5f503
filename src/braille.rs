//! Braille output.
//!
//! Real display drivers are platform services; the shell ships a virtual
//! display that keeps the last written line (truncated to the display width)
//! and logs it, which is enough for terminal use and for tests.

use anyhow::Result;

pub trait BrailleDisplay {
    fn write(&mut self, text: &str) -> Result<()>;

    /// Cells per line
    fn width(&self) -> usize;
}

/// No display attached
#[derive(Debug, Default)]
pub struct NoBraille;

impl BrailleDisplay for NoBraille {
    fn write(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn width(&self) -> usize {
        0
    }
}

#[derive(Debug)]
pub struct VirtualBraille {
    width: usize,
    line: String,
}

impl VirtualBraille {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            line: String::new(),
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

impl BrailleDisplay for VirtualBraille {
    fn write(&mut self, text: &str) -> Result<()> {
        self.line = text.chars().take(self.width).collect();
        tracing::debug!("braille: {}", self.line);
        Ok(())
    }

    fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_display_truncates() {
        let mut display = VirtualBraille::new(5);
        display.write("notepad").unwrap();
        assert_eq!(display.line(), "notep");
        display.write("ok").unwrap();
        assert_eq!(display.line(), "ok");
    }
}
