//! Sound cues.
//!
//! The shell plays named `Sound` cues; `SoundPlayer` resolves each to a file in
//! the sounds directory and plays it through rodio (feature `sound`).

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Cues the shell itself plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    EventNotProcessed,
    NoApplications,
    Startup,
    Shutdown,
    MainMenu,
    MainMenuItem,
    IntroRegular,
    IntroPopup,
    Paste,
    Ok,
    Cancel,
    Blocked,
    Error,
    Search,
    RegionPoint,
}

impl Sound {
    /// File stem looked up in the sounds directory
    pub fn file_stem(self) -> &'static str {
        match self {
            Sound::EventNotProcessed => "event-not-processed",
            Sound::NoApplications => "no-applications",
            Sound::Startup => "startup",
            Sound::Shutdown => "shutdown",
            Sound::MainMenu => "main-menu",
            Sound::MainMenuItem => "main-menu-item",
            Sound::IntroRegular => "intro-regular",
            Sound::IntroPopup => "intro-popup",
            Sound::Paste => "paste",
            Sound::Ok => "ok",
            Sound::Cancel => "cancel",
            Sound::Blocked => "blocked",
            Sound::Error => "error",
            Sound::Search => "search",
            Sound::RegionPoint => "region-point",
        }
    }
}

/// Outbound sound back-end
pub trait SoundOutput {
    /// Play the file whose stem is `name`
    fn play_named(&mut self, name: &str) -> Result<()>;

    fn play(&mut self, sound: Sound) -> Result<()> {
        self.play_named(sound.file_stem())
    }
}

/// Drops every cue (disabled, or no audio device)
#[derive(Debug, Default)]
pub struct SilentSound;

impl SoundOutput for SilentSound {
    fn play_named(&mut self, name: &str) -> Result<()> {
        tracing::trace!("(silent) sound {}", name);
        Ok(())
    }
}

/// Per-cue cooldown so held keys do not stack the same cue
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
struct Cooldowns {
    last_played: HashMap<String, Instant>,
    duration: Duration,
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
impl Cooldowns {
    fn new(cooldown_ms: u64) -> Self {
        Self {
            last_played: HashMap::new(),
            duration: Duration::from_millis(cooldown_ms),
        }
    }

    /// True (and restarts the cooldown) when the cue may play now
    fn try_start(&mut self, name: &str) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_played.get(name) {
            if now.duration_since(*last) < self.duration {
                return false;
            }
        }
        self.last_played.insert(name.to_string(), now);
        true
    }
}

/// Resolve `stem` in `dir`, trying common audio extensions
pub fn find_sound_file(dir: &std::path::Path, stem: &str) -> Option<PathBuf> {
    let exact = dir.join(stem);
    if exact.is_file() {
        return Some(exact);
    }
    ["wav", "ogg", "mp3", "flac"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
}

#[cfg(feature = "sound")]
mod player {
    use super::*;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::fs::File;
    use std::io::BufReader;

    /// Sound player for cue files
    pub struct SoundPlayer {
        _stream: OutputStream,
        stream_handle: OutputStreamHandle,
        sounds_dir: PathBuf,
        volume: f32,
        cooldowns: Cooldowns,
    }

    impl SoundPlayer {
        pub fn new(sounds_dir: PathBuf, volume: f32, cooldown_ms: u64) -> Result<Self> {
            let (stream, stream_handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                stream_handle,
                sounds_dir,
                volume: volume.clamp(0.0, 1.0),
                cooldowns: Cooldowns::new(cooldown_ms),
            })
        }
    }

    impl SoundOutput for SoundPlayer {
        fn play_named(&mut self, name: &str) -> Result<()> {
            if !self.cooldowns.try_start(name) {
                debug!("Sound '{}' is on cooldown, skipping", name);
                return Ok(());
            }
            let Some(path) = find_sound_file(&self.sounds_dir, name) else {
                debug!("No file for sound '{}' in {:?}", name, self.sounds_dir);
                return Ok(());
            };

            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    warn!("Failed to open sound file {:?}: {}", path, e);
                    return Ok(());
                }
            };
            let source = match Decoder::new(BufReader::new(file)) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to decode sound file {:?}: {}", path, e);
                    return Ok(());
                }
            };

            let sink = Sink::try_new(&self.stream_handle)?;
            sink.set_volume(self.volume);
            sink.append(source);
            sink.detach();
            debug!("Playing sound: {:?} at volume {}", path, self.volume);
            Ok(())
        }
    }
}

#[cfg(feature = "sound")]
pub use player::SoundPlayer;

/// Build the configured sound back-end, falling back to silence
pub fn open_sound_output(
    enabled: bool,
    sounds_dir: PathBuf,
    volume: f32,
    cooldown_ms: u64,
) -> Box<dyn SoundOutput> {
    if !enabled {
        return Box::new(SilentSound);
    }
    if !sounds_dir.is_dir() {
        if let Err(e) = std::fs::create_dir_all(&sounds_dir) {
            warn!("Cannot create sounds directory {:?}: {}", sounds_dir, e);
        }
    }
    #[cfg(feature = "sound")]
    {
        match SoundPlayer::new(sounds_dir, volume, cooldown_ms) {
            Ok(player) => return Box::new(player),
            Err(e) => warn!("No audio output, sounds disabled: {}", e),
        }
    }
    #[cfg(not(feature = "sound"))]
    {
        let _ = (volume, cooldown_ms);
        debug!("Built without the sound feature, {:?} unused", sounds_dir);
    }
    Box::new(SilentSound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_blocks_repeats() {
        let mut cooldowns = Cooldowns::new(60_000);
        assert!(cooldowns.try_start("ok"));
        assert!(!cooldowns.try_start("ok"));
        assert!(cooldowns.try_start(Sound::Cancel.file_stem()));

        let mut none = Cooldowns::new(0);
        assert!(none.try_start("ok"));
        assert!(none.try_start("ok"));
    }

    #[test]
    fn test_extension_fallback() {
        let dir = std::env::temp_dir().join(format!("talkshell-sounds-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("paste.ogg"), b"x").unwrap();
        assert_eq!(find_sound_file(&dir, "paste"), Some(dir.join("paste.ogg")));
        assert_eq!(find_sound_file(&dir, "ok"), None);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
