//! Text-to-Speech
//!
//! The shell speaks through the `Speech` trait. `TtsSpeech` drives the
//! platform engine from the `tts` crate (Windows SAPI, macOS
//! AVSpeechSynthesizer, Linux Speech Dispatcher); `SilentSpeech` is used when
//! speech is disabled or the engine cannot start.

use anyhow::Result;
use tts::Tts;

/// Outbound speech back-end
pub trait Speech {
    /// Speak `text`, cutting off whatever is being spoken when `interrupt`
    fn say(&mut self, text: &str, interrupt: bool) -> Result<()>;

    /// Stop current speech
    fn stop(&mut self) -> Result<()>;

    fn increase_rate(&mut self) -> Result<f32>;
    fn decrease_rate(&mut self) -> Result<f32>;
    fn increase_volume(&mut self) -> Result<f32>;
    fn decrease_volume(&mut self) -> Result<f32>;

    /// Returns the new muted state
    fn toggle_mute(&mut self) -> bool;
}

const RATE_STEP: f32 = 0.1;
const MIN_RATE: f32 = 0.5;
const MAX_RATE: f32 = 2.0;
const VOLUME_STEP: f32 = 0.1;

/// Speech through the platform TTS engine
pub struct TtsSpeech {
    engine: Option<Tts>,

    /// Engine failed to start; don't retry on every utterance
    unavailable: bool,

    muted: bool,

    /// Speech rate from config (0.5 slow, 1.0 normal, 2.0 fast)
    rate: f32,

    /// Speech volume from config (0.0 to 1.0)
    volume: f32,

    /// Backend min/max ranges for normalization
    backend_min_rate: f32,
    backend_max_rate: f32,
    backend_min_volume: f32,
    backend_max_volume: f32,
}

impl TtsSpeech {
    pub fn new(rate: f32, volume: f32) -> Self {
        Self {
            engine: None,
            unavailable: false,
            muted: false,
            rate: rate.clamp(MIN_RATE, MAX_RATE),
            volume: volume.clamp(0.0, 1.0),
            // Updated during initialization
            backend_min_rate: 0.1,
            backend_max_rate: 10.0,
            backend_min_volume: 0.0,
            backend_max_volume: 1.0,
        }
    }

    /// Initialize the TTS engine on first use
    fn ensure_initialized(&mut self) -> Result<Option<&mut Tts>> {
        if self.engine.is_none() && !self.unavailable {
            tracing::info!("Initializing TTS engine...");
            let mut tts = match Tts::default() {
                Ok(tts) => tts,
                Err(e) => {
                    self.unavailable = true;
                    tracing::warn!("TTS engine unavailable, continuing without speech: {}", e);
                    return Ok(None);
                }
            };

            self.backend_min_rate = tts.min_rate();
            self.backend_max_rate = tts.max_rate();
            self.backend_min_volume = tts.min_volume();
            self.backend_max_volume = tts.max_volume();
            tracing::info!(
                "TTS backend ranges: rate={} to {}, volume={} to {}",
                self.backend_min_rate,
                self.backend_max_rate,
                self.backend_min_volume,
                self.backend_max_volume
            );

            let rate = self.normalize_rate(self.rate);
            let volume = self.normalize_volume(self.volume);
            let _ = tts.set_rate(rate);
            let _ = tts.set_volume(volume);
            tracing::info!("TTS configured: rate={} volume={}", rate, volume);

            self.engine = Some(tts);
        }
        Ok(self.engine.as_mut())
    }

    /// Clamp config rate into the backend's range (most use 1.0 as normal)
    fn normalize_rate(&self, config_rate: f32) -> f32 {
        config_rate.clamp(self.backend_min_rate, self.backend_max_rate)
    }

    /// Map config volume (0.0 to 1.0) onto the backend's range
    fn normalize_volume(&self, config_volume: f32) -> f32 {
        let clamped = config_volume.clamp(0.0, 1.0);
        self.backend_min_volume + clamped * (self.backend_max_volume - self.backend_min_volume)
    }

    fn apply_rate(&mut self) -> Result<f32> {
        let normalized = self.normalize_rate(self.rate);
        if let Some(engine) = self.engine.as_mut() {
            engine.set_rate(normalized)?;
        }
        tracing::info!("TTS rate set to {} (normalized: {})", self.rate, normalized);
        Ok(self.rate)
    }

    fn apply_volume(&mut self) -> Result<f32> {
        let normalized = self.normalize_volume(self.volume);
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(normalized)?;
        }
        tracing::info!("TTS volume set to {} (normalized: {})", self.volume, normalized);
        Ok(self.volume)
    }
}

impl Speech for TtsSpeech {
    fn say(&mut self, text: &str, interrupt: bool) -> Result<()> {
        if self.muted || text.trim().is_empty() {
            return Ok(());
        }
        if let Some(engine) = self.ensure_initialized()? {
            tracing::debug!("Speaking: {}", text);
            engine.speak(text, interrupt)?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(engine) = self.engine.as_mut() {
            engine.stop()?;
        }
        Ok(())
    }

    fn increase_rate(&mut self) -> Result<f32> {
        self.rate = (self.rate + RATE_STEP).min(MAX_RATE);
        self.apply_rate()
    }

    fn decrease_rate(&mut self) -> Result<f32> {
        self.rate = (self.rate - RATE_STEP).max(MIN_RATE);
        self.apply_rate()
    }

    fn increase_volume(&mut self) -> Result<f32> {
        self.volume = (self.volume + VOLUME_STEP).min(1.0);
        self.apply_volume()
    }

    fn decrease_volume(&mut self) -> Result<f32> {
        self.volume = (self.volume - VOLUME_STEP).max(0.0);
        self.apply_volume()
    }

    fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if self.muted {
            tracing::info!("TTS muted");
            let _ = self.stop();
        } else {
            tracing::info!("TTS unmuted");
        }
        self.muted
    }
}

/// No-op speech (disabled in config or `--no-speech`)
#[derive(Debug, Default)]
pub struct SilentSpeech {
    muted: bool,
}

impl Speech for SilentSpeech {
    fn say(&mut self, text: &str, _interrupt: bool) -> Result<()> {
        tracing::trace!("(silent) {}", text);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn increase_rate(&mut self) -> Result<f32> {
        Ok(1.0)
    }

    fn decrease_rate(&mut self) -> Result<f32> {
        Ok(1.0)
    }

    fn increase_volume(&mut self) -> Result<f32> {
        Ok(1.0)
    }

    fn decrease_volume(&mut self) -> Result<f32> {
        Ok(1.0)
    }

    fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}
