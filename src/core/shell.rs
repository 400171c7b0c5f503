//! The shell: one explicit context object owning every piece of UI state,
//! and the re-entrant dispatcher that drives it.
//!
//! `event_loop` is the whole dispatcher. The outer loop runs under
//! `ShellRunning`; every popup re-enters the same function under its own
//! `PopupStop`, so popups nest on the call stack and come down strictly LIFO.
//! All calls into application, area and command code go through `fault::guard`.

use super::application::{AppHandle, InstanceId};
use super::area::{query_area, Area, AreaHandle, AreaQuery, Popup};
use super::commands::CommandRegistry;
use super::event::{AreaId, Event, KeyboardEvent, Special, SystemEvent};
use super::fault::{guard, guard_result, Fault};
use super::jobs::BackgroundJobs;
use super::keymap::GlobalKeys;
use super::phrases;
use super::popups::{Placement, PopupEntry, PopupOwner};
use super::queue::{EventQueue, EventSender};
use super::registry::InstanceRegistry;
use super::screen::{Renderer, ScreenContent};
use super::search::SearchArea;
use super::standard_commands;
use super::stop::{PopupStop, ShellRunning, StopCondition};
use crate::clipboard::Clipboard;
use crate::output::Output;
use crate::popups::{EditPopup, ListPopup, YesNoPopup};
use crate::sound::Sound;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Outcome of forwarding an event to the active area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Processed,
    NotProcessed,
    NoApplications,
    /// The handler faulted; the fault has already been reported
    Failed,
}

/// Startup settings the shell itself needs
#[derive(Debug, Clone, Default)]
pub struct ShellSettings {
    pub user_home_dir: Option<PathBuf>,
    /// Action names offered by the main menu
    pub main_menu: Vec<String>,
    /// Mirror copies to the system clipboard
    pub clipboard_sync: bool,
}

pub type FileOpener = Rc<dyn Fn(&mut Shell, Vec<PathBuf>)>;

pub struct Shell {
    queue: EventQueue,
    instances: InstanceRegistry,
    screen: ScreenContent,
    commands: CommandRegistry,
    global_keys: GlobalKeys,
    output: Output,
    clipboard: Clipboard,
    renderer: Box<dyn Renderer>,
    jobs: BackgroundJobs,
    running: Rc<ShellRunning>,
    settings: ShellSettings,
    file_opener: Option<FileOpener>,

    /// Set by focus-changing operations, honoured once per loop iteration
    need_introduction: bool,

    /// Last message, shown on the message line
    message: Option<String>,
}

impl Shell {
    pub fn new(
        settings: ShellSettings,
        global_keys: GlobalKeys,
        output: Output,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let queue = EventQueue::new();
        let jobs = BackgroundJobs::new(queue.sender());
        let mut commands = CommandRegistry::new();
        standard_commands::register(&mut commands);
        Self {
            queue,
            instances: InstanceRegistry::new(),
            screen: ScreenContent::new(),
            commands,
            global_keys,
            output,
            clipboard: Clipboard::new(settings.clipboard_sync),
            renderer,
            jobs,
            running: Rc::new(ShellRunning::new()),
            settings,
            file_opener: None,
            need_introduction: false,
            message: None,
        }
    }

    // ---- wiring -------------------------------------------------------

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Producer handle for input threads
    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    pub fn enqueue(&self, event: impl Into<Event>) {
        self.queue.enqueue(event);
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn global_keys(&self) -> &GlobalKeys {
        &self.global_keys
    }

    /// Handler for `open_files`; installed by the bundled applications
    pub fn set_file_opener(&mut self, opener: FileOpener) {
        self.file_opener = Some(opener);
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    // ---- state queries ------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    pub fn active_area(&self) -> Option<AreaHandle> {
        self.screen.active_area()
    }

    pub fn is_popup_active(&self) -> bool {
        self.screen.is_popup_active()
    }

    pub fn popup_count(&self) -> usize {
        self.screen.popups.len()
    }

    /// Applications that made it through launch
    pub fn app_count(&self) -> usize {
        self.screen.apps.len()
    }

    /// Live instance tokens, including ones still launching
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn active_instance(&self) -> Option<InstanceId> {
        self.screen.apps.active_app().map(|a| a.instance)
    }

    // ---- main loop ----------------------------------------------------

    /// Run the outer loop until quit or until the queue is shut down
    pub fn run(&mut self) {
        info!("Shell starting");
        self.output.play(Sound::Startup);
        if self.screen.apps.is_empty() {
            self.message(phrases::STARTUP);
        }
        self.redraw();
        let running = Rc::clone(&self.running);
        self.event_loop(&*running);
        self.teardown();
    }

    fn teardown(&mut self) {
        info!("Shell shutting down");
        self.screen.popups.force_close_all();
        self.queue.shutdown();
        let dropped = self.queue.discard_pending();
        if dropped > 0 {
            debug!("Discarded {} pending events", dropped);
        }
        self.jobs.shutdown();
        self.output.play(Sound::Shutdown);
        if let Err(e) = self.renderer.shutdown() {
            warn!("Renderer shutdown failed: {}", e);
        }
    }

    /// The dispatcher. Re-entered for every popup with that popup's condition.
    pub fn event_loop(&mut self, stop: &dyn StopCondition) {
        while self.keep_looping(stop) {
            // at most one announcement per iteration, and only while still looping
            if self.need_introduction {
                self.introduce_active_area();
            }
            let Some(event) = self.queue.take_next() else {
                debug!("Event queue closed, leaving loop");
                break;
            };
            match event {
                Event::Keyboard(event) => self.on_keyboard_event(event),
                Event::System(event) => self.on_system_event(event),
            }
        }
    }

    /// A faulting condition ends its loop
    fn keep_looping(&mut self, stop: &dyn StopCondition) -> bool {
        match guard("loop condition", || stop.continue_loop()) {
            Ok(keep) => keep,
            Err(fault) => {
                self.report_fault(&fault);
                false
            }
        }
    }

    fn on_keyboard_event(&mut self, event: KeyboardEvent) {
        let event = event.translated();

        if let Some(action) = self.global_keys.lookup(&event).map(str::to_string) {
            debug!("Global key {:?} -> {}", event, action);
            self.run_action(&action);
            return;
        }

        // A bare Control press silences speech; other modifiers do nothing
        if let Some(special) = event.as_special().filter(|s| s.is_modifier()) {
            if special == Special::Control {
                self.output.stop_speech();
            }
            return;
        }

        if event.modifiers.left_alt_only()
            && event.as_char().map(|c| c.to_ascii_lowercase()) == Some('x')
        {
            self.run_action_popup();
            return;
        }

        let routed = self.forward_keyboard(&event);
        self.feedback(routed);
    }

    fn on_system_event(&mut self, event: SystemEvent) {
        match event {
            SystemEvent::Paste => {
                let lines = self.clipboard.contents();
                if lines.is_empty() {
                    debug!("Paste with an empty clipboard");
                    return;
                }
                self.output.play(Sound::Paste);
                let routed = self.forward_system(&SystemEvent::Insert(lines));
                self.feedback(routed);
            }
            SystemEvent::Open(files) => self.on_open(files),
            SystemEvent::ThreadSync { dest, payload } => self.on_thread_sync(dest, payload),
            SystemEvent::ScreenResized => self.redraw(),
            other => {
                let routed = self.forward_system(&other);
                self.feedback(routed);
            }
        }
    }

    fn on_open(&mut self, files: Vec<PathBuf>) {
        if self.forward_system(&SystemEvent::Open(files.clone())) == Routed::Processed {
            return;
        }
        if files.is_empty() {
            self.open_file_popup();
        } else {
            self.open_files(files);
        }
    }

    fn on_thread_sync(&mut self, dest: AreaId, payload: Box<dyn Any + Send>) {
        let Some(area) = self.screen.find_area(dest) else {
            debug!("Thread sync for vanished {} dropped", dest);
            return;
        };
        let event = SystemEvent::ThreadSync { dest, payload };
        match guard("thread sync handler", || area.on_system_event(self, &event)) {
            Ok(true) => {}
            Ok(false) => debug!("{} ignored its thread sync", dest),
            Err(fault) => self.report_fault(&fault),
        }
    }

    /// Send a keyboard event to the active area
    pub fn forward_keyboard(&mut self, event: &KeyboardEvent) -> Routed {
        let Some(area) = self.screen.active_area() else {
            return Routed::NoApplications;
        };
        match guard("keyboard handler", || area.on_keyboard_event(self, event)) {
            Ok(true) => Routed::Processed,
            Ok(false) => Routed::NotProcessed,
            Err(fault) => {
                self.report_fault(&fault);
                Routed::Failed
            }
        }
    }

    /// Send a system event to the active area
    pub fn forward_system(&mut self, event: &SystemEvent) -> Routed {
        let Some(area) = self.screen.active_area() else {
            return Routed::NoApplications;
        };
        match guard("system event handler", || area.on_system_event(self, event)) {
            Ok(true) => Routed::Processed,
            Ok(false) => Routed::NotProcessed,
            Err(fault) => {
                self.report_fault(&fault);
                Routed::Failed
            }
        }
    }

    /// Sound (and hint) for anything but a processed event
    pub fn feedback(&mut self, routed: Routed) {
        match routed {
            Routed::Processed | Routed::Failed => {}
            Routed::NotProcessed => self.output.play(Sound::EventNotProcessed),
            Routed::NoApplications => {
                self.output.play(Sound::NoApplications);
                self.message(phrases::NO_APPLICATIONS);
            }
        }
    }

    fn report_fault(&mut self, fault: &Fault) {
        self.output.play(Sound::Error);
        if fault.is_out_of_memory() {
            self.message(phrases::OUT_OF_MEMORY);
        } else {
            self.message(phrases::UNEXPECTED_ERROR);
        }
    }

    // ---- applications -------------------------------------------------

    /// Launch `app` as the new foreground application
    pub fn launch(&mut self, app: AppHandle) -> Option<InstanceId> {
        let instance = self.instances.register(Rc::clone(&app));
        let name = app.name();
        debug!("Launching {} as {}", name, instance);

        let context = format!("launch of {}", name);
        match guard_result(&context, || app.on_launch(self, instance)) {
            Ok(true) => {}
            Ok(false) => {
                info!("{} refused to launch", name);
                self.abort_launch(instance, &Fault::Unexpected("launch refused".into()));
                return None;
            }
            Err(fault) => {
                self.abort_launch(instance, &fault);
                return None;
            }
        }

        let context = format!("layout of {}", name);
        let layout = match guard_result(&context, || app.areas_to_show()) {
            Ok(Some(layout)) if layout.is_valid() => layout,
            Ok(layout) => {
                warn!("{} supplied an unusable layout: {:?}", name, layout);
                self.abort_launch(instance, &Fault::Unexpected("invalid layout".into()));
                return None;
            }
            Err(fault) => {
                self.abort_launch(instance, &fault);
                return None;
            }
        };

        self.screen.apps.register_single_visible(instance, app, layout);
        info!("Launched {} as {}", name, instance);
        self.redraw();
        self.need_introduction = true;
        Some(instance)
    }

    fn abort_launch(&mut self, instance: InstanceId, fault: &Fault) {
        self.instances.release(instance);
        self.report_fault(fault);
    }

    /// Close an application; refused while it owns a popup
    pub fn close_app(&mut self, instance: InstanceId) -> bool {
        let Some(app) = self.screen.apps.get(instance).map(|a| Rc::clone(&a.app)) else {
            debug!("Close of unknown {} ignored", instance);
            return false;
        };
        if self.screen.popups.has_popup_of(instance) {
            self.output.play(Sound::Blocked);
            self.message(phrases::APP_HAS_POPUP);
            return false;
        }

        if let Err(fault) = guard("close hook", || app.on_close(self)) {
            warn!("Close hook of {} faulted: {}", instance, fault);
        }
        // the hook may have closed it already
        if self.screen.apps.release(instance).is_none() {
            return false;
        }
        self.instances.release(instance);
        info!("Closed {}", instance);
        self.redraw();
        self.need_introduction = true;
        true
    }

    pub fn switch_next_app(&mut self) -> bool {
        if self.screen.is_popup_active() || !self.screen.apps.switch_next() {
            self.output.play(Sound::EventNotProcessed);
            return false;
        }
        self.redraw();
        self.need_introduction = true;
        true
    }

    pub fn switch_next_area(&mut self) -> bool {
        if !self.screen.activate_next_area() {
            self.output.play(Sound::EventNotProcessed);
            return false;
        }
        self.redraw();
        self.need_introduction = true;
        true
    }

    /// Put incremental search in front of the foreground application's
    /// focused area
    pub fn activate_search(&mut self) -> bool {
        if self.screen.is_popup_active() {
            self.output.play(Sound::EventNotProcessed);
            return false;
        }
        let Some(launched) = self.screen.apps.active_app() else {
            self.feedback(Routed::NoApplications);
            return false;
        };
        let instance = launched.instance;
        let inner = match launched.unwrapped_focus() {
            Some(inner) if !launched.is_wrapped() => inner,
            _ => {
                self.output.play(Sound::EventNotProcessed);
                return false;
            }
        };
        let point = match guard("hot point", || inner.hot_point()) {
            Ok(point) => point,
            Err(fault) => {
                self.report_fault(&fault);
                return false;
            }
        };
        let search: AreaHandle = Rc::new(SearchArea::new(inner, instance, point));
        let wrapped = self
            .screen
            .apps
            .get_mut(instance)
            .is_some_and(|launched| launched.wrap_focused(search));
        if !wrapped {
            return false;
        }
        debug!("Search started in {}", instance);
        self.output.play(Sound::Search);
        self.message(phrases::SEARCH_MODE);
        true
    }

    /// Drop the search wrapper of `instance`, if any
    pub fn end_search(&mut self, instance: InstanceId) -> bool {
        let ended = self
            .screen
            .apps
            .get_mut(instance)
            .and_then(|launched| launched.unwrap_focused())
            .is_some();
        if ended {
            debug!("Search ended in {}", instance);
            self.redraw();
        }
        ended
    }

    /// Move an application's focus to one of its own areas.
    ///
    /// The announcement is not spoken here: it is coalesced with any other
    /// focus change of the same event and made once, at the top of the next
    /// loop iteration, through the area's own `Introduce` handling (falling
    /// back to its name). A `message` issued after the focus change replaces
    /// the pending announcement.
    pub fn set_focus(&mut self, instance: InstanceId, area: &dyn Area) -> bool {
        let Some(launched) = self.screen.apps.get_mut(instance) else {
            debug!("Focus request for unknown {} ignored", instance);
            return false;
        };
        if !launched.set_focused(area) {
            debug!("{} is not in the layout of {}", area.area_id(), instance);
            return false;
        }
        if self.screen.apps.is_active(instance) && !self.screen.is_popup_active() {
            self.redraw();
            self.need_introduction = true;
        }
        true
    }

    /// Re-read an application's layout, keeping focus where possible
    pub fn on_new_area_layout(&mut self, instance: InstanceId) -> bool {
        let Some(app) = self.screen.apps.get(instance).map(|a| Rc::clone(&a.app)) else {
            return false;
        };
        let layout = match guard_result("layout refresh", || app.areas_to_show()) {
            Ok(Some(layout)) if layout.is_valid() => layout,
            Ok(_) => {
                warn!("{} supplied an unusable layout, keeping the old one", instance);
                return false;
            }
            Err(fault) => {
                self.report_fault(&fault);
                return false;
            }
        };
        let Some(launched) = self.screen.apps.get_mut(instance) else {
            return false;
        };
        let before = launched.focused_area().map(|a| a.area_id());
        launched.replace_layout(layout);
        let after = launched.focused_area().map(|a| a.area_id());
        if self.screen.apps.is_active(instance) {
            self.redraw();
            if before != after && !self.screen.is_popup_active() {
                self.need_introduction = true;
            }
        }
        true
    }

    // ---- popups -------------------------------------------------------

    /// Push a popup and run a nested loop until `stop` ends it
    pub fn enter_popup(
        &mut self,
        owner: PopupOwner,
        area: AreaHandle,
        placement: Placement,
        stop: Rc<dyn StopCondition>,
    ) -> bool {
        if let PopupOwner::App(instance) = owner {
            if !self.instances.contains(instance) {
                debug!("Popup for unknown {} ignored", instance);
                return false;
            }
        }
        let wrapped = PopupStop::wrap(stop);
        let id = area.area_id();
        self.screen.popups.push(PopupEntry {
            owner,
            area,
            placement,
            stop: Rc::clone(&wrapped),
        });
        if self.screen.set_popup_active() {
            debug!("Popup mode on");
        }
        debug!("Popup {} opened, depth {}", id, self.screen.popups.len());
        self.redraw();
        self.need_introduction = true;

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| self.event_loop(&*wrapped)));

        self.screen.popups.remove_last(&wrapped);
        self.screen.update_popup_state();
        debug!("Popup {} closed, depth {}", id, self.screen.popups.len());
        if let Err(payload) = unwound {
            panic::resume_unwind(payload);
        }
        self.redraw();
        self.need_introduction = true;
        true
    }

    /// Application popup at the bottom; true when accepted
    pub fn popup<P: Popup + 'static>(&mut self, instance: InstanceId, popup: Rc<P>) -> bool {
        if self.screen.apps.get(instance).is_none() && !self.instances.contains(instance) {
            warn!("Popup requested by stale {}", instance);
            return false;
        }
        let closing = popup.closing();
        let area: AreaHandle = popup;
        self.enter_popup(PopupOwner::App(instance), area, Placement::Bottom, closing.clone())
            && !closing.cancelled()
    }

    /// Shell-owned popup; true when accepted
    pub fn shell_popup<P: Popup + 'static>(&mut self, popup: Rc<P>, placement: Placement) -> bool {
        let closing = popup.closing();
        let area: AreaHandle = popup;
        self.enter_popup(PopupOwner::Shell, area, placement, closing.clone()) && !closing.cancelled()
    }

    /// Force every popup of `instance` closed through its loop condition
    pub fn cancel_popups_of(&mut self, instance: InstanceId) -> usize {
        self.screen.popups.force_close_of(instance)
    }

    // ---- introduction and feedback --------------------------------------

    pub fn request_introduction(&mut self) {
        self.need_introduction = true;
    }

    /// Announce the active area: its own introduction if it has one, else its name
    pub fn introduce_active_area(&mut self) {
        self.need_introduction = false;
        let Some(area) = self.screen.active_area() else {
            self.output.say(phrases::NO_APPLICATIONS);
            return;
        };
        let sound = if self.screen.is_popup_area(&*area) {
            Sound::IntroPopup
        } else {
            Sound::IntroRegular
        };
        self.output.play(sound);
        let introduced = guard("introduction", || {
            area.on_system_event(self, &SystemEvent::Introduce)
        })
        .unwrap_or(false);
        if !introduced {
            let name = guard("area name", || area.name()).unwrap_or_default();
            self.output.say(&name);
        }

        let mut query = AreaQuery::background_sound();
        if guard("background sound query", || query_area(&*area, &mut query)).unwrap_or(false) {
            if let AreaQuery::BackgroundSound(Some(name)) = &query {
                self.output.play_named(name);
            }
        }
    }

    /// Speak and display a message; replaces any pending introduction
    pub fn message(&mut self, text: &str) {
        self.need_introduction = false;
        self.message = Some(text.to_string());
        self.output.say(text);
        self.redraw();
    }

    /// Speak without touching the message line
    pub fn say(&mut self, text: &str) {
        self.output.say(text);
    }

    pub fn play(&mut self, sound: Sound) {
        self.output.play(sound);
    }

    /// Ask the active area a typed question
    pub fn query_active(&mut self, query: &mut AreaQuery) -> bool {
        let Some(area) = self.screen.active_area() else {
            return false;
        };
        guard("area query", || query_area(&*area, query)).unwrap_or(false)
    }

    /// Speak the line under the active area's hot point
    pub fn read_active_line(&mut self) -> bool {
        let Some(area) = self.screen.active_area() else {
            self.feedback(Routed::NoApplications);
            return false;
        };
        let line = guard("read line", || {
            let (_, y) = area.hot_point();
            if y < area.line_count() {
                Some(area.line(y))
            } else {
                None
            }
        });
        match line {
            Ok(Some(text)) => {
                self.output.say(&text);
                true
            }
            Ok(None) => {
                self.output.play(Sound::EventNotProcessed);
                false
            }
            Err(fault) => {
                self.report_fault(&fault);
                false
            }
        }
    }

    // ---- commands and shell popups --------------------------------------

    /// Run a registered command; false when no command has that name
    pub fn run_command(&mut self, name: &str) -> bool {
        let Some(command) = self.commands.get(name) else {
            return false;
        };
        debug!("Running command {}", name);
        let context = format!("command {}", name);
        if let Err(fault) = guard(&context, || command(self)) {
            self.report_fault(&fault);
        }
        true
    }

    /// Run a command, telling the user when it does not exist
    pub fn run_action(&mut self, name: &str) {
        if !self.run_command(name) {
            self.output.play(Sound::EventNotProcessed);
            self.message(&phrases::no_such_action(name));
        }
    }

    /// Quit confirmation; accepting "yes" stops the outer loop
    pub fn quit(&mut self) {
        let popup = YesNoPopup::new(phrases::QUIT_TITLE, phrases::QUIT_QUESTION, true);
        self.shell_popup(Rc::clone(&popup), Placement::Bottom);
        if popup.result() == Some(true) {
            info!("Quit confirmed");
            self.running.stop();
            self.screen.popups.force_close_all();
        }
    }

    pub fn main_menu(&mut self) {
        let items = self.settings.main_menu.clone();
        if items.is_empty() {
            self.output.play(Sound::EventNotProcessed);
            return;
        }
        self.output.play(Sound::MainMenu);
        let popup = ListPopup::menu(phrases::MAIN_MENU, items, Sound::MainMenuItem);
        if !self.shell_popup(Rc::clone(&popup), Placement::Left) {
            return;
        }
        if let Some(action) = popup.result() {
            self.run_action(&action);
        }
    }

    /// Pick any command by name
    pub fn run_action_popup(&mut self) {
        let popup = ListPopup::editable(phrases::RUN_ACTION, self.commands.names());
        if !self.shell_popup(Rc::clone(&popup), Placement::Bottom) {
            return;
        }
        if let Some(action) = popup.result() {
            self.run_action(action.trim());
        }
    }

    /// Ask for a path, starting from the active area's directory
    pub fn open_file_popup(&mut self) {
        let mut query = AreaQuery::current_dir();
        let start = if self.query_active(&mut query) {
            match query {
                AreaQuery::CurrentDir(Some(dir)) => dir,
                _ => PathBuf::from("/"),
            }
        } else {
            self.settings
                .user_home_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("/"))
        };
        let mut initial = start.display().to_string();
        if !initial.ends_with(std::path::MAIN_SEPARATOR) {
            initial.push(std::path::MAIN_SEPARATOR);
        }

        let popup = EditPopup::new(phrases::OPEN_FILE, &initial);
        if !self.shell_popup(Rc::clone(&popup), Placement::Bottom) {
            return;
        }
        match popup.result() {
            Some(text) if !text.trim().is_empty() => self.open_files(vec![PathBuf::from(text.trim())]),
            _ => self.output.play(Sound::Cancel),
        }
    }

    /// Hand paths to the installed opener (directories and files)
    pub fn open_files(&mut self, paths: Vec<PathBuf>) {
        let Some(opener) = self.file_opener.clone() else {
            warn!("No file opener installed, cannot open {:?}", paths);
            self.output.play(Sound::EventNotProcessed);
            return;
        };
        if let Err(fault) = guard("open files", || opener(self, paths)) {
            self.report_fault(&fault);
        }
    }

    // ---- background work ------------------------------------------------

    /// Run `job` off-thread; its result arrives as a `ThreadSync` for `dest`
    pub fn spawn_job<T, F>(&mut self, dest: AreaId, job: F) -> bool
    where
        T: Any + Send,
        F: FnOnce() -> T + Send + 'static,
    {
        match self.jobs.spawn(dest, job) {
            Ok(()) => true,
            Err(e) => {
                warn!("Background job for {} not started: {:#}", dest, e);
                false
            }
        }
    }

    // ---- redraw -------------------------------------------------------

    pub fn redraw(&mut self) {
        let message = self.message.clone();
        let view = match guard("screen snapshot", || self.screen.view(message.as_deref())) {
            Ok(view) => view,
            Err(_) => return,
        };
        if let Err(e) = self.renderer.redraw(&view) {
            warn!("Redraw failed: {:#}", e);
        }
    }

    fn redraw_area(&mut self, id: AreaId) {
        if !self.is_visible(id) {
            return;
        }
        let message = self.message.clone();
        let view = match guard("screen snapshot", || self.screen.view(message.as_deref())) {
            Ok(view) => view,
            Err(_) => return,
        };
        if let Err(e) = self.renderer.redraw_area(&view, id) {
            warn!("Redraw of {} failed: {:#}", id, e);
        }
    }

    fn is_visible(&self, id: AreaId) -> bool {
        self.screen.popups.find_area(id).is_some()
            || self
                .screen
                .apps
                .active_app()
                .is_some_and(|a| a.find_area(id).is_some())
    }

    pub fn on_area_new_content(&mut self, area: &dyn Area) {
        self.redraw_area(area.area_id());
    }

    pub fn on_area_new_hot_point(&mut self, area: &dyn Area) {
        self.redraw_area(area.area_id());
    }

    pub fn on_area_new_name(&mut self, area: &dyn Area) {
        self.redraw_area(area.area_id());
    }
}
