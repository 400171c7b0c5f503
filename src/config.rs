//! Configuration: `<data-dir>/config.toml`, created from the embedded
//! defaults on first start.

use crate::core::keymap::GlobalKeys;
use crate::core::shell::ShellSettings;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Environment override for the data directory
pub const DATA_DIR_ENV: &str = "TALKSHELL_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub braille: BrailleConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    /// Chord -> action name
    #[serde(default)]
    pub keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_speech_rate")]
    pub rate: f32, // 0.5 to 2.0, 1.0 = normal
    #[serde(default = "default_speech_volume")]
    pub volume: f32, // 0.0 to 1.0
}

fn default_speech_rate() -> f32 {
    1.0
}

fn default_speech_volume() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            rate: default_speech_rate(),
            volume: default_speech_volume(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_sound_volume")]
    pub volume: f32, // Master volume (0.0 to 1.0)
    #[serde(default = "default_sound_cooldown")]
    pub cooldown_ms: u64, // Cooldown between plays of the same cue
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_sound_volume() -> f32 {
    0.7
}

fn default_sound_cooldown() -> u64 {
    100
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            volume: default_sound_volume(),
            cooldown_ms: default_sound_cooldown(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrailleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_braille_width")]
    pub width: usize,
}

fn default_braille_width() -> usize {
    40
}

impl Default for BrailleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width: default_braille_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default = "default_true")]
    pub system_sync: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            system_sync: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub user_home_dir: Option<PathBuf>,
    #[serde(default)]
    pub main_menu: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// `--data-dir`, else `TALKSHELL_DIR`, else `~/.talkshell`
    pub fn data_dir(cli_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_dir {
            return Ok(dir.to_path_buf());
        }
        if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
            if !custom_dir.trim().is_empty() {
                return Ok(PathBuf::from(custom_dir));
            }
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".talkshell"))
    }

    /// Create the data directory if needed; refuse anything that is not a directory
    pub fn ensure_data_dir(dir: &Path) -> Result<()> {
        if dir.exists() {
            if !dir.is_dir() {
                bail!("Data directory {} is not a directory", dir.display());
            }
            return Ok(());
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        tracing::info!("Created data directory {}", dir.display());
        Ok(())
    }

    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    pub fn log_path(data_dir: &Path) -> PathBuf {
        data_dir.join("talkshell.log")
    }

    /// Configured sounds directory, else `<data-dir>/sounds`
    pub fn sounds_dir(&self, data_dir: &Path) -> PathBuf {
        self.sound
            .dir
            .clone()
            .unwrap_or_else(|| data_dir.join("sounds"))
    }

    /// Load `<data-dir>/config.toml`, writing the defaults first when it is missing
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::config_path(data_dir);
        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote default configuration to {}", path.display());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// The embedded defaults
    pub fn defaults() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG).context("Embedded default configuration is invalid")
    }

    /// Fatal configuration problems
    pub fn validate(&self) -> Result<()> {
        if let Some(home) = &self.shell.user_home_dir {
            if !home.is_absolute() {
                bail!("user_home_dir {} is not an absolute path", home.display());
            }
            if !home.is_dir() {
                bail!("user_home_dir {} is not a directory", home.display());
            }
        }
        if !(0.0..=1.0).contains(&self.sound.volume) {
            bail!("sound volume {} is outside 0.0-1.0", self.sound.volume);
        }
        self.global_keys()?;
        Ok(())
    }

    /// Non-fatal oddities worth reporting from `check-config`
    pub fn warnings(&self, known_actions: &[String]) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut bound: Vec<_> = self.keys.iter().collect();
        bound.sort();
        for (chord, action) in bound {
            if !known_actions.iter().any(|a| a == action.trim()) {
                warnings.push(format!("Key '{}' is bound to unknown action '{}'", chord, action));
            }
        }
        for item in &self.shell.main_menu {
            if !known_actions.iter().any(|a| a == item) {
                warnings.push(format!("Main menu item '{}' is not a known action", item));
            }
        }
        warnings
    }

    pub fn global_keys(&self) -> Result<GlobalKeys> {
        GlobalKeys::from_table(&self.keys)
    }

    pub fn shell_settings(&self) -> ShellSettings {
        ShellSettings {
            user_home_dir: self.shell.user_home_dir.clone(),
            main_menu: self.shell.main_menu.clone(),
            clipboard_sync: self.clipboard.system_sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("talkshell-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_defaults_parse_and_validate() {
        let config = Config::defaults().unwrap();
        assert!(config.speech.enabled);
        assert_eq!(config.shell.main_menu.first().map(String::as_str), Some("notepad"));
        assert_eq!(config.keys.get("f1").map(String::as_str), Some("main-menu"));
        config.validate().unwrap();
        assert!(config.global_keys().unwrap().len() >= 10);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::parse("[speech]\nrate = 1.5\n").unwrap();
        assert_eq!(config.speech.rate, 1.5);
        assert!(config.speech.enabled);
        assert_eq!(config.sound.cooldown_ms, 100);
        assert!(config.keys.is_empty());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(Config::parse("[speech\nrate = ").is_err());
    }

    #[test]
    fn test_relative_home_dir_rejected() {
        let config = Config::parse("[shell]\nuser_home_dir = \"relative/dir\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_missing_home_dir_rejected() {
        let missing = scratch_dir("no-home");
        let config = Config {
            shell: ShellConfig {
                user_home_dir: Some(missing),
                main_menu: Vec::new(),
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_key_chord_rejected() {
        let config = Config::parse("[keys]\n\"ctrl+nonsense\" = \"quit\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = scratch_dir("load");
        Config::ensure_data_dir(&dir).unwrap();
        let config = Config::load(&dir).unwrap();
        assert!(Config::config_path(&dir).exists());
        assert_eq!(config.sounds_dir(&dir), dir.join("sounds"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_data_dir_must_be_a_directory() {
        let dir = scratch_dir("file");
        fs::write(&dir, "not a dir").unwrap();
        assert!(Config::ensure_data_dir(&dir).is_err());
        let _ = fs::remove_file(&dir);
    }

    #[test]
    fn test_warnings_for_unknown_actions() {
        let config = Config::parse("[keys]\nf9 = \"fly\"\n[shell]\nmain_menu = [\"quit\", \"swim\"]\n")
            .unwrap();
        let known = vec!["quit".to_string()];
        let warnings = config.warnings(&known);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("fly"));
    }
}
