//! Bundled applications and the file opener that picks between them.

pub mod commander;
pub mod notepad;

use crate::core::area::AreaQuery;
use crate::core::phrases;
use crate::core::shell::Shell;
use crate::sound::Sound;
use commander::Commander;
use notepad::Notepad;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Wire the bundled applications into a fresh shell
pub fn install(shell: &mut Shell) {
    shell.set_file_opener(Rc::new(open_files));
    let commands = shell.commands_mut();
    commands.add("notepad", |shell| {
        shell.launch(Rc::new(Notepad::new(None)));
    });
    commands.add("commander", |shell| {
        let dir = start_dir(shell);
        shell.launch(Rc::new(Commander::new(dir)));
    });
}

/// A missing file in an existing folder starts a new document
fn can_open(path: &Path) -> bool {
    path.exists()
        || path
            .parent()
            .map(|p| p.as_os_str().is_empty() || p.is_dir())
            .unwrap_or(false)
}

/// Directories go to the commander, everything else to notepad.
///
/// Unopenable paths are reported before anything launches, so the
/// introduction of the last launched application is what remains.
pub fn open_files(shell: &mut Shell, paths: Vec<PathBuf>) {
    let (paths, missing): (Vec<_>, Vec<_>) = paths.into_iter().partition(|p| can_open(p));
    for path in &missing {
        tracing::info!("Cannot open {}", path.display());
        shell.play(Sound::EventNotProcessed);
        shell.message(&phrases::no_such_file(path));
    }
    for path in paths {
        if path.is_dir() {
            tracing::info!("Opening folder {}", path.display());
            shell.launch(Rc::new(Commander::new(path)));
        } else {
            tracing::info!("Opening file {}", path.display());
            shell.launch(Rc::new(Notepad::new(Some(path))));
        }
    }
}

/// Active area's folder, else the configured home, else the user's home
fn start_dir(shell: &mut Shell) -> PathBuf {
    let mut query = AreaQuery::current_dir();
    if shell.query_active(&mut query) {
        if let AreaQuery::CurrentDir(Some(dir)) = query {
            return dir;
        }
    }
    shell
        .settings()
        .user_home_dir
        .clone()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/"))
}
