//! Feedback channels the shell talks through: speech, sound cues, braille.
//!
//! All calls are best effort. Back-end failures are logged here and never
//! reach the dispatcher.

use crate::braille::BrailleDisplay;
use crate::sound::{Sound, SoundOutput};
use crate::tts::Speech;

pub struct Output {
    speech: Box<dyn Speech>,
    sound: Box<dyn SoundOutput>,
    braille: Box<dyn BrailleDisplay>,
}

impl Output {
    pub fn new(
        speech: Box<dyn Speech>,
        sound: Box<dyn SoundOutput>,
        braille: Box<dyn BrailleDisplay>,
    ) -> Self {
        Self {
            speech,
            sound,
            braille,
        }
    }

    /// Speak `text`, interrupting current speech, and mirror it to braille
    pub fn say(&mut self, text: &str) {
        if let Err(e) = self.speech.say(text, true) {
            tracing::warn!("Speech failed: {}", e);
        }
        if let Err(e) = self.braille.write(text) {
            tracing::warn!("Braille write failed: {}", e);
        }
    }

    pub fn play(&mut self, sound: Sound) {
        if let Err(e) = self.sound.play(sound) {
            tracing::warn!("Sound {:?} failed: {}", sound, e);
        }
    }

    /// Play an area-supplied sound by file stem
    pub fn play_named(&mut self, name: &str) {
        if let Err(e) = self.sound.play_named(name) {
            tracing::warn!("Sound '{}' failed: {}", name, e);
        }
    }

    pub fn stop_speech(&mut self) {
        if let Err(e) = self.speech.stop() {
            tracing::debug!("Stopping speech failed: {}", e);
        }
    }

    pub fn speech_mut(&mut self) -> &mut dyn Speech {
        &mut *self.speech
    }
}
