//! Instance and application registries.
//!
//! `InstanceRegistry` mints and releases instance tokens. `AppRegistry` tracks
//! the applications that made it through launch, their layouts and focused
//! areas, and which one is in the foreground.

use super::application::{AppHandle, AreaLayout, InstanceId};
use super::area::{Area, AreaHandle};
use super::event::AreaId;
use std::collections::HashMap;

/// Live instance tokens; a token is never reused while the process runs
#[derive(Default)]
pub struct InstanceRegistry {
    next: u64,
    live: HashMap<InstanceId, AppHandle>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, app: AppHandle) -> InstanceId {
        self.next += 1;
        let id = InstanceId(self.next);
        self.live.insert(id, app);
        id
    }

    pub fn release(&mut self, instance: InstanceId) -> bool {
        self.live.remove(&instance).is_some()
    }

    pub fn contains(&self, instance: InstanceId) -> bool {
        self.live.contains_key(&instance)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// A successfully launched application
pub struct LaunchedApp {
    pub instance: InstanceId,
    pub app: AppHandle,
    layout: AreaLayout,
    focused: usize,
    /// Area standing in for the focused one, such as incremental search
    wrapper: Option<AreaHandle>,
    /// Foreground application at the moment this one was launched
    previous: Option<InstanceId>,
}

impl LaunchedApp {
    pub fn layout(&self) -> &AreaLayout {
        &self.layout
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    /// The wrapper when one is installed, else the focused layout area
    pub fn focused_area(&self) -> Option<AreaHandle> {
        self.wrapper.clone().or_else(|| self.unwrapped_focus())
    }

    /// The focused layout area, ignoring any wrapper
    pub fn unwrapped_focus(&self) -> Option<AreaHandle> {
        self.layout.areas.get(self.focused).cloned()
    }

    /// Layout areas as shown, with the wrapper in the focused slot
    pub fn shown_areas(&self) -> Vec<AreaHandle> {
        let mut areas = self.layout.areas.clone();
        if let (Some(wrapper), Some(slot)) = (&self.wrapper, areas.get_mut(self.focused)) {
            *slot = wrapper.clone();
        }
        areas
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapper.is_some()
    }

    /// Put `wrapper` in front of the focused area; refused if one is already there
    pub fn wrap_focused(&mut self, wrapper: AreaHandle) -> bool {
        if self.wrapper.is_some() || self.layout.areas.get(self.focused).is_none() {
            return false;
        }
        self.wrapper = Some(wrapper);
        true
    }

    pub fn unwrap_focused(&mut self) -> Option<AreaHandle> {
        self.wrapper.take()
    }

    /// Focus `area` if it belongs to the current layout
    pub fn set_focused(&mut self, area: &dyn Area) -> bool {
        match self.layout.position_of(area) {
            Some(index) => {
                self.focused = index;
                self.wrapper = None;
                true
            }
            None => false,
        }
    }

    /// Cycle focus to the next area of the layout
    pub fn focus_next(&mut self) -> bool {
        if self.layout.areas.len() < 2 {
            return false;
        }
        self.focused = (self.focused + 1) % self.layout.areas.len();
        self.wrapper = None;
        true
    }

    /// Swap in a new layout, keeping the focused area when it survives.
    /// Any wrapper is dropped.
    pub fn replace_layout(&mut self, layout: AreaLayout) {
        let previously_focused = self.layout.areas.get(self.focused).map(|a| a.area_id());
        let focused = previously_focused
            .and_then(|id| layout.areas.iter().position(|a| a.area_id() == id))
            .unwrap_or(layout.default_area);
        self.layout = layout;
        self.focused = focused;
        self.wrapper = None;
    }

    pub fn find_area(&self, id: AreaId) -> Option<AreaHandle> {
        self.layout
            .areas
            .iter()
            .chain(self.wrapper.iter())
            .find(|a| a.area_id() == id)
            .cloned()
    }
}

/// Launched applications in launch order plus the foreground pointer
#[derive(Default)]
pub struct AppRegistry {
    launched: Vec<LaunchedApp>,
    active: Option<usize>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application and make it the only visible one
    pub fn register_single_visible(&mut self, instance: InstanceId, app: AppHandle, layout: AreaLayout) {
        let previous = self.active_app().map(|a| a.instance);
        let focused = layout.default_area;
        self.launched.push(LaunchedApp {
            instance,
            app,
            layout,
            focused,
            wrapper: None,
            previous,
        });
        self.active = Some(self.launched.len() - 1);
    }

    /// Remove an application; the foreground falls back to whichever
    /// application was in front when it launched, else the newest one
    pub fn release(&mut self, instance: InstanceId) -> Option<LaunchedApp> {
        let index = self.index_of(instance)?;
        let was_active = self.active == Some(index);
        let active_instance = self.active_app().map(|a| a.instance);
        let removed = self.launched.remove(index);

        self.active = if self.launched.is_empty() {
            None
        } else if was_active {
            removed
                .previous
                .and_then(|prev| self.index_of(prev))
                .or(Some(self.launched.len() - 1))
        } else {
            active_instance.and_then(|inst| self.index_of(inst))
        };
        Some(removed)
    }

    /// Bring the next application to the foreground, cycling
    pub fn switch_next(&mut self) -> bool {
        if self.launched.len() < 2 {
            return false;
        }
        let next = match self.active {
            Some(i) => (i + 1) % self.launched.len(),
            None => 0,
        };
        self.active = Some(next);
        true
    }

    pub fn active_app(&self) -> Option<&LaunchedApp> {
        self.active.and_then(|i| self.launched.get(i))
    }

    pub fn active_app_mut(&mut self) -> Option<&mut LaunchedApp> {
        match self.active {
            Some(i) => self.launched.get_mut(i),
            None => None,
        }
    }

    pub fn is_active(&self, instance: InstanceId) -> bool {
        self.active_app().map(|a| a.instance) == Some(instance)
    }

    pub fn get(&self, instance: InstanceId) -> Option<&LaunchedApp> {
        self.launched.iter().find(|a| a.instance == instance)
    }

    pub fn get_mut(&mut self, instance: InstanceId) -> Option<&mut LaunchedApp> {
        self.launched.iter_mut().find(|a| a.instance == instance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaunchedApp> {
        self.launched.iter()
    }

    pub fn len(&self) -> usize {
        self.launched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.launched.is_empty()
    }

    pub fn find_area(&self, id: AreaId) -> Option<AreaHandle> {
        self.launched.iter().find_map(|a| a.find_area(id))
    }

    /// Owner of an area that belongs to some layout
    pub fn owner_of(&self, area: &dyn Area) -> Option<InstanceId> {
        let id = area.area_id();
        self.launched
            .iter()
            .find(|a| a.find_area(id).is_some())
            .map(|a| a.instance)
    }

    fn index_of(&self, instance: InstanceId) -> Option<usize> {
        self.launched.iter().position(|a| a.instance == instance)
    }
}
