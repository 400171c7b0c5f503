//! Test doubles: scripted areas, popups and applications, and recording
//! back-ends so the dispatcher runs without a terminal or audio device.

use super::application::{AppHandle, Application, AreaLayout, InstanceId, LayoutKind};
use super::area::{Area, AreaHandle, AreaQuery, Popup, Queryable};
use super::event::{AreaId, KeyboardEvent, Special, SystemEvent};
use super::keymap::GlobalKeys;
use super::screen::{Renderer, ScreenView};
use super::shell::{Shell, ShellSettings};
use super::stop::PopupClosing;
use crate::braille::NoBraille;
use crate::output::Output;
use crate::sound::{Sound, SoundOutput};
use crate::tts::Speech;
use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

type Script = Rc<dyn Fn(&mut Shell)>;

/// Keyboard scripts plus a record of typed characters
#[derive(Default)]
struct KeyScripts {
    scripts: RefCell<HashMap<char, Script>>,
    typed: RefCell<String>,
}

impl KeyScripts {
    /// Record the key, then run its script; Some(true) when a script ran
    fn run(&self, shell: &mut Shell, event: &KeyboardEvent) -> Option<bool> {
        let c = event.as_char()?;
        self.typed.borrow_mut().push(c);
        let script = self.scripts.borrow().get(&c).cloned()?;
        script(shell);
        Some(true)
    }
}

pub struct TestArea {
    id: AreaId,
    name: String,
    lines: RefCell<Vec<String>>,
    keys: KeyScripts,
    handles_keys: Cell<bool>,
    inserts: RefCell<Vec<Vec<String>>>,
    system: RefCell<Vec<String>>,
    syncs: Cell<usize>,
    region: RefCell<Option<Vec<String>>>,
    dir: RefCell<Option<PathBuf>>,
}

impl TestArea {
    pub fn new(name: &str) -> Rc<Self> {
        Self::with_lines(name, &[])
    }

    pub fn with_lines(name: &str, lines: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            id: AreaId::next(),
            name: name.to_string(),
            lines: RefCell::new(lines.iter().map(|l| l.to_string()).collect()),
            keys: KeyScripts::default(),
            handles_keys: Cell::new(true),
            inserts: RefCell::new(Vec::new()),
            system: RefCell::new(Vec::new()),
            syncs: Cell::new(0),
            region: RefCell::new(None),
            dir: RefCell::new(None),
        })
    }

    pub fn on_key(&self, c: char, script: impl Fn(&mut Shell) + 'static) {
        self.keys.scripts.borrow_mut().insert(c, Rc::new(script));
    }

    pub fn typed(&self) -> String {
        self.keys.typed.borrow().clone()
    }

    pub fn set_handles_keys(&self, handles: bool) {
        self.handles_keys.set(handles);
    }

    pub fn inserts(&self) -> Vec<Vec<String>> {
        self.inserts.borrow().clone()
    }

    /// Debug names of other system events received
    pub fn system_events(&self) -> Vec<String> {
        self.system.borrow().clone()
    }

    pub fn syncs(&self) -> usize {
        self.syncs.get()
    }

    pub fn set_region(&self, lines: Vec<String>) {
        *self.region.borrow_mut() = Some(lines);
    }

    pub fn set_lines(&self, lines: &[&str]) {
        *self.lines.borrow_mut() = lines.iter().map(|l| l.to_string()).collect();
    }

    pub fn set_dir(&self, dir: PathBuf) {
        *self.dir.borrow_mut() = Some(dir);
    }
}

impl Area for TestArea {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn line_count(&self) -> usize {
        self.lines.borrow().len()
    }

    fn line(&self, index: usize) -> String {
        self.lines.borrow().get(index).cloned().unwrap_or_default()
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        match self.keys.run(shell, event) {
            Some(true) => true,
            _ => self.handles_keys.get(),
        }
    }

    fn on_system_event(&self, _shell: &mut Shell, event: &SystemEvent) -> bool {
        match event {
            SystemEvent::Insert(lines) => {
                self.inserts.borrow_mut().push(lines.clone());
                true
            }
            SystemEvent::ThreadSync { .. } => {
                self.syncs.set(self.syncs.get() + 1);
                true
            }
            SystemEvent::Introduce | SystemEvent::Open(_) => false,
            other => {
                self.system.borrow_mut().push(format!("{:?}", other));
                true
            }
        }
    }

    fn queryable(&self) -> Option<&dyn Queryable> {
        Some(self)
    }
}

impl Queryable for TestArea {
    fn on_area_query(&self, query: &mut AreaQuery) -> bool {
        match query {
            AreaQuery::Region(_) => match self.region.borrow().clone() {
                Some(lines) => query.answer_region(lines),
                None => false,
            },
            AreaQuery::CurrentDir(_) => match self.dir.borrow().clone() {
                Some(dir) => query.answer_dir(dir),
                None => false,
            },
            AreaQuery::BackgroundSound(_) => false,
        }
    }
}

/// Popup closed by Enter/Ok (accept) or Escape/Cancel/Close (reject)
pub struct TestPopup {
    id: AreaId,
    name: String,
    closing: Rc<PopupClosing>,
    keys: KeyScripts,
    introduce: RefCell<Option<Script>>,
}

impl TestPopup {
    pub fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            id: AreaId::next(),
            name: name.to_string(),
            closing: PopupClosing::new(),
            keys: KeyScripts::default(),
            introduce: RefCell::new(None),
        })
    }

    pub fn on_key(&self, c: char, script: impl Fn(&mut Shell) + 'static) {
        self.keys.scripts.borrow_mut().insert(c, Rc::new(script));
    }

    /// Run instead of the generic announcement
    pub fn on_introduce(&self, script: impl Fn(&mut Shell) + 'static) {
        *self.introduce.borrow_mut() = Some(Rc::new(script));
    }

    pub fn typed(&self) -> String {
        self.keys.typed.borrow().clone()
    }
}

impl Area for TestPopup {
    fn area_id(&self) -> AreaId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn line_count(&self) -> usize {
        1
    }

    fn line(&self, _index: usize) -> String {
        self.name.clone()
    }

    fn on_keyboard_event(&self, shell: &mut Shell, event: &KeyboardEvent) -> bool {
        if self.closing.on_keyboard_event(event) {
            return true;
        }
        if event.is_special(Special::Enter) {
            self.closing.do_ok();
            return true;
        }
        self.keys.run(shell, event).is_some()
    }

    fn on_system_event(&self, shell: &mut Shell, event: &SystemEvent) -> bool {
        if let SystemEvent::Introduce = event {
            let script = self.introduce.borrow().clone();
            return match script {
                Some(script) => {
                    script(shell);
                    true
                }
                None => false,
            };
        }
        self.closing.on_system_event(event)
    }
}

impl Popup for TestPopup {
    fn closing(&self) -> Rc<PopupClosing> {
        Rc::clone(&self.closing)
    }
}

/// How a `TestApp` behaves when launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchScript {
    Succeed,
    /// Two areas side by side
    Split,
    Refuse,
    Fail,
    Panic,
    OutOfMemory,
    BadLayout,
}

pub struct TestApp {
    name: String,
    script: LaunchScript,
    main: Rc<TestArea>,
    second: Rc<TestArea>,
    instance: Cell<Option<InstanceId>>,
    closed: Cell<bool>,
}

impl TestApp {
    pub fn new(name: &str) -> Rc<Self> {
        Self::scripted(name, LaunchScript::Succeed)
    }

    pub fn scripted(name: &str, script: LaunchScript) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            script,
            main: TestArea::new(&format!("{} main", name)),
            second: TestArea::new(&format!("{} second", name)),
            instance: Cell::new(None),
            closed: Cell::new(false),
        })
    }

    pub fn handle(name: &str) -> AppHandle {
        Self::new(name)
    }

    pub fn main_area(&self) -> Rc<TestArea> {
        Rc::clone(&self.main)
    }

    /// Right-hand area of a `Split` layout
    pub fn second_area(&self) -> Rc<TestArea> {
        Rc::clone(&self.second)
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.instance.get()
    }

    pub fn closed(&self) -> bool {
        self.closed.get()
    }
}

impl Application for TestApp {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn on_launch(&self, _shell: &mut Shell, instance: InstanceId) -> Result<bool> {
        match self.script {
            LaunchScript::Refuse => return Ok(false),
            LaunchScript::Fail => return Err(anyhow!("{} cannot start", self.name)),
            LaunchScript::Panic => panic!("{} exploded", self.name),
            LaunchScript::OutOfMemory => {
                let mut buffer: Vec<u8> = Vec::new();
                buffer.try_reserve(usize::MAX)?;
            }
            LaunchScript::Succeed | LaunchScript::Split | LaunchScript::BadLayout => {}
        }
        self.instance.set(Some(instance));
        Ok(true)
    }

    fn areas_to_show(&self) -> Result<Option<AreaLayout>> {
        let main: AreaHandle = self.main.clone();
        let second: AreaHandle = self.second.clone();
        Ok(Some(match self.script {
            LaunchScript::Split => AreaLayout::new(LayoutKind::LeftRight, vec![main, second], 0),
            LaunchScript::BadLayout => AreaLayout::new(LayoutKind::Single, vec![main], 5),
            _ => AreaLayout::single(main),
        }))
    }

    fn on_close(&self, _shell: &mut Shell) {
        self.closed.set(true);
    }
}

struct RecordingSpeech {
    spoken: Rc<RefCell<Vec<String>>>,
}

impl Speech for RecordingSpeech {
    fn say(&mut self, text: &str, _interrupt: bool) -> Result<()> {
        self.spoken.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn increase_rate(&mut self) -> Result<f32> {
        Ok(1.1)
    }

    fn decrease_rate(&mut self) -> Result<f32> {
        Ok(0.9)
    }

    fn increase_volume(&mut self) -> Result<f32> {
        Ok(1.0)
    }

    fn decrease_volume(&mut self) -> Result<f32> {
        Ok(0.9)
    }

    fn toggle_mute(&mut self) -> bool {
        true
    }
}

struct RecordingSound {
    played: Rc<RefCell<Vec<String>>>,
}

impl SoundOutput for RecordingSound {
    fn play_named(&mut self, name: &str) -> Result<()> {
        self.played.borrow_mut().push(name.to_string());
        Ok(())
    }
}

struct RecordingRenderer {
    redraws: Rc<Cell<usize>>,
    last: Rc<RefCell<Option<ScreenView>>>,
}

impl Renderer for RecordingRenderer {
    fn redraw(&mut self, view: &ScreenView) -> Result<()> {
        self.redraws.set(self.redraws.get() + 1);
        *self.last.borrow_mut() = Some(view.clone());
        Ok(())
    }
}

/// What the shell said, played and drew
#[derive(Clone, Default)]
pub struct Recorder {
    spoken: Rc<RefCell<Vec<String>>>,
    played: Rc<RefCell<Vec<String>>>,
    redraws: Rc<Cell<usize>>,
    last_view: Rc<RefCell<Option<ScreenView>>>,
}

impl Recorder {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.borrow().clone()
    }

    pub fn played(&self, sound: Sound) -> usize {
        self.played_named(sound.file_stem())
    }

    pub fn played_named(&self, name: &str) -> usize {
        self.played.borrow().iter().filter(|s| *s == name).count()
    }

    pub fn redraws(&self) -> usize {
        self.redraws.get()
    }

    pub fn last_view(&self) -> Option<ScreenView> {
        self.last_view.borrow().clone()
    }
}

pub fn test_shell() -> (Shell, Recorder) {
    test_shell_with(ShellSettings::default(), GlobalKeys::new())
}

pub fn test_shell_with(settings: ShellSettings, keys: GlobalKeys) -> (Shell, Recorder) {
    let recorder = Recorder::default();
    let output = Output::new(
        Box::new(RecordingSpeech {
            spoken: recorder.spoken.clone(),
        }),
        Box::new(RecordingSound {
            played: recorder.played.clone(),
        }),
        Box::new(NoBraille),
    );
    let renderer = RecordingRenderer {
        redraws: recorder.redraws.clone(),
        last: recorder.last_view.clone(),
    };
    let shell = Shell::new(settings, keys, output, Box::new(renderer));
    (shell, recorder)
}
