//! Directory browser. Listings are read on the background runtime and come
//! back as `ThreadSync` events addressed to the listing area.

use crate::core::application::{Application, AreaLayout, InstanceId};
use crate::core::area::{Area, AreaQuery, Queryable};
use crate::core::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use crate::core::shell::Shell;
use crate::sound::Sound;
use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const PARENT: &str = "..";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

impl Entry {
    fn spoken(&self) -> String {
        if self.is_dir {
            format!("{} folder", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Result of one background directory read
#[derive(Debug)]
pub struct Listing {
    pub dir: PathBuf,
    pub entries: std::result::Result<Vec<Entry>, String>,
}

/// Read `dir`, folders first, then case-insensitive by name
pub fn read_listing(dir: &Path) -> Listing {
    let entries = fs::read_dir(dir)
        .map_err(|e| e.to_string())
        .map(|read| {
            let mut entries: Vec<Entry> = read
                .filter_map(|entry| entry.ok())
                .map(|entry| Entry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
                })
                .collect();
            entries.sort_by(|a, b| {
                b.is_dir
                    .cmp(&a.is_dir)
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            });
            entries
        });
    Listing {
        dir: dir.to_path_buf(),
        entries,
    }
}

pub struct CommanderArea {
    id: AreaId,
    dir: RefCell<PathBuf>,
    entries: RefCell<Vec<Entry>>,
    selected: Cell<usize>,
    /// Row where a region starts, set by `RegionPoint`
    anchor: Cell<Option<usize>>,
    loading: Cell<bool>,
    instance: Cell<Option<InstanceId>>,
}

impl CommanderArea {
    fn new(dir: PathBuf) -> Self {
        Self {
            id: AreaId::next(),
            dir: RefCell::new(dir),
            entries: RefCell::new(Vec::new()),
            selected: Cell::new(0),
            anchor: Cell::new(None),
            loading: Cell::new(false),
            instance: Cell::new(None),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.dir.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    fn has_parent(&self) -> bool {
        self.dir.borrow().parent().is_some()
    }

    /// Visible rows: the parent entry (when there is one) and the listing
    fn rows(&self) -> Vec<Entry> {
        let mut rows = Vec::new();
        if self.has_parent() {
            rows.push(Entry {
                name: PARENT.to_string(),
                is_dir: true,
            });
        }
        rows.extend(self.entries.borrow().iter().cloned());
        rows
    }

    fn selected_row(&self) -> Option<Entry> {
        self.rows().get(self.selected.get()).cloned()
    }

    fn selected_path(&self) -> Option<PathBuf> {
        let entry = self.selected_row()?;
        let dir = self.dir();
        if entry.name == PARENT {
            return dir.parent().map(Path::to_path_buf);
        }
        Some(dir.join(entry.name))
    }

    /// Paths from the anchor row to the selected row, or the selected path alone
    fn region_paths(&self) -> Vec<PathBuf> {
        let selected = self.selected.get();
        let Some(anchor) = self.anchor.get() else {
            return self.selected_path().into_iter().collect();
        };
        let (first, last) = (anchor.min(selected), anchor.max(selected));
        let dir = self.dir();
        self.rows()
            .into_iter()
            .enumerate()
            .filter(|(index, entry)| (first..=last).contains(index) && entry.name != PARENT)
            .map(|(_, entry)| dir.join(entry.name))
            .collect()
    }

    /// Start reading `dir`; the listing replaces the current one when it arrives
    fn load(&self, shell: &mut Shell, dir: PathBuf) -> bool {
        *self.dir.borrow_mut() = dir.clone();
        // rows of the previous directory must not be opened against the new one
        self.entries.borrow_mut().clear();
        self.selected.set(0);
        self.anchor.set(None);
        self.loading.set(true);
        tracing::debug!("Loading {}", dir.display());
        shell.spawn_job(self.id, move || read_listing(&dir))
    }

    fn apply_listing(&self, shell: &mut Shell, listing: &Listing) {
        if listing.dir != *self.dir.borrow() {
            tracing::debug!("Dropping stale listing of {}", listing.dir.display());
            return;
        }
        self.loading.set(false);
        match &listing.entries {
            Ok(entries) => {
                *self.entries.borrow_mut() = entries.clone();
                self.selected.set(0);
                shell.on_area_new_name(self);
                shell.on_area_new_content(self);
                let name = self.name();
                shell.say(&format!("{}, {} items", name, entries.len()));
            }
            Err(e) => {
                tracing::warn!("Cannot list {}: {}", listing.dir.display(), e);
                shell.play(Sound::Error);
                shell.message(&format!("Cannot open {}", listing.dir.display()));
            }
        }
    }

    fn select(&self, shell: &mut Shell, index: usize) {
        self.selected.set(index);
        let spoken = self.selected_row().map(|e| e.spoken()).unwrap_or_default();
        shell.say(&spoken);
        shell.on_area_new_hot_point(self);
    }

    fn open_selected(&self, shell: &mut Shell) -> bool {
        let (Some(entry), Some(path)) = (self.selected_row(), self.selected_path()) else {
            return false;
        };
        if entry.is_dir {
            self.load(shell, path)
        } else {
            shell.open_files(vec![path]);
            true
        }
    }

    fn go_to_parent(&self, shell: &mut Shell) -> bool {
        let Some(parent) = self.dir.borrow().parent().map(Path::to_path_buf) else {
            return false;
        };
        self.load(shell, parent)
    }
}

impl Area for CommanderArea {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        let dir = self.dir.borrow();
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string())
    }

    fn line_count(&self) -> usize {
        self.rows().len()
    }

    fn line(&self, index: usize) -> String {
        match self.rows().get(index) {
            Some(entry) if entry.is_dir => format!("{}/", entry.name),
            Some(entry) => entry.name.clone(),
            None => String::new(),
        }
    }

    fn hot_point(&self) -> (usize, usize) {
        (0, self.selected.get())
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if !event.modifiers.is_empty() {
            return false;
        }
        let count = self.rows().len();
        match event.as_special() {
            Some(Special::ArrowDown) if self.selected.get() + 1 < count => {
                self.select(shell, self.selected.get() + 1);
                true
            }
            Some(Special::ArrowUp) if self.selected.get() > 0 => {
                self.select(shell, self.selected.get() - 1);
                true
            }
            Some(Special::Home) if count > 0 => {
                self.select(shell, 0);
                true
            }
            Some(Special::End) if count > 0 => {
                self.select(shell, count - 1);
                true
            }
            Some(Special::Enter) => self.open_selected(shell),
            Some(Special::Backspace) => self.go_to_parent(shell),
            _ => false,
        }
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::ThreadSync { payload, .. } => match payload.downcast_ref::<Listing>() {
                Some(listing) => {
                    self.apply_listing(shell, listing);
                    true
                }
                None => false,
            },
            SystemEvent::Refresh => {
                let dir = self.dir();
                self.load(shell, dir)
            }
            SystemEvent::RegionPoint if self.line_count() > 0 => {
                self.anchor.set(Some(self.selected.get()));
                true
            }
            SystemEvent::MoveHotPoint { y, .. } if *y < self.line_count() => {
                self.select(shell, *y);
                true
            }
            SystemEvent::Close => match self.instance.get() {
                Some(instance) => {
                    shell.close_app(instance);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn queryable(&self) -> Option<&dyn Queryable> {
        Some(self)
    }
}

impl Queryable for CommanderArea {
    fn on_area_query(&self, query: &mut AreaQuery) -> bool {
        match query {
            AreaQuery::CurrentDir(_) => query.answer_dir(self.dir()),
            AreaQuery::Region(_) => {
                let paths = self.region_paths();
                if paths.is_empty() {
                    return false;
                }
                query.answer_region(paths.iter().map(|p| p.display().to_string()).collect())
            }
            AreaQuery::BackgroundSound(_) => false,
        }
    }
}

pub struct Commander {
    start_dir: PathBuf,
    area: RefCell<Option<Rc<CommanderArea>>>,
}

impl Commander {
    pub fn new(start_dir: PathBuf) -> Self {
        Self {
            start_dir,
            area: RefCell::new(None),
        }
    }

    pub fn area(&self) -> Option<Rc<CommanderArea>> {
        self.area.borrow().clone()
    }
}

impl Application for Commander {
    fn name(&self) -> String {
        "Commander".to_string()
    }

    fn on_launch(&self, shell: &mut Shell, instance: InstanceId) -> Result<bool> {
        if !self.start_dir.is_dir() {
            anyhow::bail!("{} is not a directory", self.start_dir.display());
        }
        let area = Rc::new(CommanderArea::new(self.start_dir.clone()));
        area.instance.set(Some(instance));
        area.load(shell, self.start_dir.clone());
        *self.area.borrow_mut() = Some(area);
        Ok(true)
    }

    fn areas_to_show(&self) -> Result<Option<AreaLayout>> {
        Ok(self
            .area
            .borrow()
            .clone()
            .map(|area| AreaLayout::single(area)))
    }
}
