//! Screen content and focus.
//!
//! Owns the application registry and the popup stack and derives the single
//! active area from them. Also produces the `ScreenView` snapshot handed to
//! the renderer, so renderers never touch area objects.

use super::application::LayoutKind;
use super::area::{Area, AreaHandle};
use super::event::AreaId;
use super::popups::{Placement, PopupStack};
use super::registry::AppRegistry;

/// Lines captured around the hot point for each visible area
const VIEW_WINDOW: usize = 200;

#[derive(Default)]
pub struct ScreenContent {
    pub apps: AppRegistry,
    pub popups: PopupStack,
    popup_active: bool,
}

impl ScreenContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Topmost popup, else the foreground application's focused area
    pub fn active_area(&self) -> Option<AreaHandle> {
        if let Some(top) = self.popups.top() {
            return Some(top.area.clone());
        }
        self.apps.active_app().and_then(|a| a.focused_area())
    }

    pub fn is_popup_active(&self) -> bool {
        self.popup_active
    }

    /// Recompute popup mode from the stack
    pub fn update_popup_state(&mut self) {
        self.popup_active = !self.popups.is_empty();
    }

    /// Enter popup mode; returns true when this switched the mode on
    pub fn set_popup_active(&mut self) -> bool {
        let was_active = self.popup_active;
        self.update_popup_state();
        self.popup_active && !was_active
    }

    /// Focus the next area of the foreground application
    pub fn activate_next_area(&mut self) -> bool {
        if self.popup_active {
            return false;
        }
        match self.apps.active_app_mut() {
            Some(app) => app.focus_next(),
            None => false,
        }
    }

    /// Resolve an area id against every layout and popup
    pub fn find_area(&self, id: AreaId) -> Option<AreaHandle> {
        self.popups.find_area(id).or_else(|| self.apps.find_area(id))
    }

    pub fn is_popup_area(&self, area: &dyn Area) -> bool {
        self.popups.find_area(area.area_id()).is_some()
    }

    /// Snapshot everything visible. Calls into area code; the caller guards it.
    pub fn view(&self, message: Option<&str>) -> ScreenView {
        let active_id = self.active_area().map(|a| a.area_id());
        let layout = self.apps.active_app().map(|app| {
            let layout = app.layout();
            LayoutView {
                kind: layout.kind,
                areas: app
                    .shown_areas()
                    .iter()
                    .map(|a| AreaView::capture(&**a, active_id))
                    .collect(),
            }
        });
        let popups = self
            .popups
            .iter()
            .map(|e| PopupView {
                placement: e.placement,
                area: AreaView::capture(&*e.area, active_id),
            })
            .collect();
        ScreenView {
            layout,
            popups,
            message: message.map(str::to_string),
        }
    }
}

/// What the renderer draws
#[derive(Debug, Clone, Default)]
pub struct ScreenView {
    pub layout: Option<LayoutView>,
    pub popups: Vec<PopupView>,
    pub message: Option<String>,
}

impl ScreenView {
    pub fn active(&self) -> Option<&AreaView> {
        self.popups
            .iter()
            .map(|p| &p.area)
            .chain(self.layout.iter().flat_map(|l| l.areas.iter()))
            .find(|a| a.active)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutView {
    pub kind: LayoutKind,
    pub areas: Vec<AreaView>,
}

#[derive(Debug, Clone)]
pub struct PopupView {
    pub placement: Placement,
    pub area: AreaView,
}

#[derive(Debug, Clone)]
pub struct AreaView {
    pub id: AreaId,
    pub name: String,
    /// Index of `lines[0]` within the area
    pub first_line: usize,
    pub lines: Vec<String>,
    pub line_count: usize,
    /// (column, line) in area coordinates
    pub hot_point: (usize, usize),
    pub active: bool,
}

impl AreaView {
    fn capture(area: &dyn Area, active: Option<AreaId>) -> Self {
        let line_count = area.line_count();
        let hot_point = area.hot_point();
        let first_line = hot_point.1.saturating_sub(VIEW_WINDOW / 2).min(line_count);
        let last_line = (first_line + VIEW_WINDOW).min(line_count);
        Self {
            id: area.area_id(),
            name: area.name(),
            first_line,
            lines: (first_line..last_line).map(|i| area.line(i)).collect(),
            line_count,
            hot_point,
            active: Some(area.area_id()) == active,
        }
    }
}

/// Outbound redraw back-end
pub trait Renderer {
    /// Redraw everything
    fn redraw(&mut self, view: &ScreenView) -> anyhow::Result<()>;

    /// Redraw one area; renderers without partial redraw draw everything
    fn redraw_area(&mut self, view: &ScreenView, _area: AreaId) -> anyhow::Result<()> {
        self.redraw(view)
    }

    /// Restore the terminal / close the window
    fn shutdown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Renderer that draws nothing (headless runs)
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn redraw(&mut self, _view: &ScreenView) -> anyhow::Result<()> {
        Ok(())
    }
}
