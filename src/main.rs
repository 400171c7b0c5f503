//! talkshell - keyboard-driven, speech-first desktop shell
//!
//! One dispatcher thread runs the shell; a terminal input thread and the
//! background job runtime feed it through the event queue.

mod apps;
mod braille;
mod clipboard;
mod config;
mod core;
mod frontend;
mod output;
mod popups;
mod sound;
mod tts;

use crate::braille::{BrailleDisplay, NoBraille, VirtualBraille};
use crate::config::Config;
use crate::core::keymap::GlobalKeys;
use crate::core::screen::{NullRenderer, Renderer};
use crate::core::{Shell, ShellSettings};
use crate::output::Output;
use crate::sound::SilentSound;
use crate::tts::{SilentSpeech, Speech, TtsSpeech};
use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "talkshell")]
#[command(about = "Keyboard-driven, speech-first desktop shell", long_about = None)]
struct Cli {
    /// Configuration file path (default: <data-dir>/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.talkshell)
    /// Can also be set via TALKSHELL_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Folder offered first by "open" (overrides [shell] user_home_dir)
    #[arg(long, value_name = "DIR")]
    user_home_dir: Option<PathBuf>,

    /// Run without the speech engine
    #[arg(long)]
    no_speech: bool,

    /// Files or folders to open at startup
    #[arg(value_name = "PATH")]
    files: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration and key map, then exit
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = Config::data_dir(cli.data_dir.as_deref())?;
    Config::ensure_data_dir(&data_dir)?;
    init_logging(&data_dir)?;
    install_panic_hook();
    tracing::info!("Using data directory {}", data_dir.display());

    let config = match load_config(&cli, &data_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {:#}", e);
            return Err(e);
        }
    };

    if let Some(Commands::CheckConfig) = cli.command {
        check_config(&config);
        return Ok(());
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration error: {:#}", e);
        return Err(e);
    }

    run_shell(&cli, &config, &data_dir)
}

/// TUI apps can't log to stdout, so everything goes to <data-dir>/talkshell.log
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_path = Config::log_path(data_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Contained faults unwind through `catch_unwind`; keep their messages off the screen
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {}", info);
    }));
}

fn load_config(cli: &Cli, data_dir: &Path) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load(data_dir)?,
    };
    if let Some(home) = &cli.user_home_dir {
        config.shell.user_home_dir = Some(home.clone());
    }
    Ok(config)
}

/// Action names a fully wired shell knows
fn known_actions() -> Vec<String> {
    let output = Output::new(
        Box::new(SilentSpeech::default()),
        Box::new(SilentSound),
        Box::new(NoBraille),
    );
    let mut shell = Shell::new(
        ShellSettings::default(),
        GlobalKeys::new(),
        output,
        Box::new(NullRenderer),
    );
    apps::install(&mut shell);
    shell.commands().names()
}

fn check_config(config: &Config) {
    let mut errors = 0;
    match config.validate() {
        Ok(()) => println!("✓ Configuration is valid"),
        Err(e) => {
            eprintln!("✗ {:#}", e);
            errors += 1;
        }
    }
    if let Ok(keys) = config.global_keys() {
        println!("  {} global keys bound", keys.len());
    }

    let warnings = config.warnings(&known_actions());
    for warning in &warnings {
        println!("⚠ Warning: {}", warning);
    }
    if errors == 0 && warnings.is_empty() {
        println!("✓ No issues found");
    }
    if errors > 0 {
        std::process::exit(1);
    }
}

fn run_shell(cli: &Cli, config: &Config, data_dir: &Path) -> Result<()> {
    let speech: Box<dyn Speech> = if config.speech.enabled && !cli.no_speech {
        Box::new(TtsSpeech::new(config.speech.rate, config.speech.volume))
    } else {
        Box::new(SilentSpeech::default())
    };
    let sound = sound::open_sound_output(
        config.sound.enabled,
        config.sounds_dir(data_dir),
        config.sound.volume,
        config.sound.cooldown_ms,
    );
    let braille: Box<dyn BrailleDisplay> = if config.braille.enabled {
        Box::new(VirtualBraille::new(config.braille.width))
    } else {
        Box::new(NoBraille)
    };
    let output = Output::new(speech, sound, braille);

    let renderer: Box<dyn Renderer> = match frontend::TuiRenderer::new() {
        Ok(renderer) => Box::new(renderer),
        Err(e) => {
            tracing::warn!("No terminal screen, running speech-only: {:#}", e);
            Box::new(NullRenderer)
        }
    };

    let mut shell = Shell::new(config.shell_settings(), config.global_keys()?, output, renderer);
    apps::install(&mut shell);
    let input = frontend::spawn_input_thread(shell.sender())?;

    if !cli.files.is_empty() {
        shell.open_files(cli.files.clone());
    }
    shell.run();

    if input.join().is_err() {
        tracing::warn!("Input thread panicked");
    }
    tracing::info!("Exited cleanly");
    Ok(())
}
