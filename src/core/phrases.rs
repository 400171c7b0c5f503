//! User-facing texts spoken or shown by the shell itself.

pub const NO_APPLICATIONS: &str = "No applications running. Press F1 for the main menu.";
pub const OUT_OF_MEMORY: &str = "Insufficient memory";
pub const UNEXPECTED_ERROR: &str = "Unexpected error";
pub const APP_HAS_POPUP: &str = "The application cannot be closed while it has an open popup";
pub const NOTHING_TO_COPY: &str = "Nothing to copy";
pub const NO_REGION: &str = "Nothing selected";
pub const CLIPBOARD_EMPTY: &str = "Clipboard is empty";
pub const SYSTEM_CLIPBOARD_UNAVAILABLE: &str = "System clipboard is not available";
pub const REGION_POINT: &str = "Region point set";
pub const SEARCH_MODE: &str = "Search";
pub const SEARCH_CANCELLED: &str = "Search cancelled";

pub const QUIT_TITLE: &str = "Quit";
pub const QUIT_QUESTION: &str = "Do you really want to quit?";
pub const YES: &str = "Yes";
pub const NO: &str = "No";

pub const MAIN_MENU: &str = "Main menu";
pub const RUN_ACTION: &str = "Run action";
pub const OPEN_FILE: &str = "Open file";

pub const SPEECH_MUTED: &str = "Speech muted";
pub const SPEECH_UNMUTED: &str = "Speech on";
pub const STARTUP: &str = "Shell ready";

pub fn no_such_action(name: &str) -> String {
    format!("No such action: {}", name)
}

pub fn copied(lines: usize) -> String {
    if lines == 1 {
        "Copied one line".to_string()
    } else {
        format!("Copied {} lines", lines)
    }
}

pub fn no_such_file(path: &std::path::Path) -> String {
    format!("No such file: {}", path.display())
}

pub fn speech_rate(rate: f32) -> String {
    format!("Speech rate {}", (rate * 100.0).round() as i32)
}

pub fn volume(volume: f32) -> String {
    format!("Volume {}", (volume * 100.0).round() as i32)
}
