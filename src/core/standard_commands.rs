//! Commands every shell has, registered before any application adds its own.

use super::area::AreaQuery;
use super::commands::CommandRegistry;
use super::event::SystemEvent;
use super::phrases;
use super::shell::{Routed, Shell};
use crate::sound::Sound;
use anyhow::Result;

pub fn register(commands: &mut CommandRegistry) {
    commands.add("main-menu", |shell| shell.main_menu());
    commands.add("quit", |shell| shell.quit());

    commands.add("ok", |shell| shell.enqueue(SystemEvent::Ok));
    commands.add("cancel", |shell| shell.enqueue(SystemEvent::Cancel));
    commands.add("close", |shell| shell.enqueue(SystemEvent::Close));
    commands.add("save", |shell| shell.enqueue(SystemEvent::Save));
    commands.add("refresh", |shell| shell.enqueue(SystemEvent::Refresh));
    commands.add("open", |shell| shell.enqueue(SystemEvent::Open(Vec::new())));
    commands.add("introduce", |shell| shell.request_introduction());

    commands.add("copy", |shell| {
        copy_region(shell);
    });
    commands.add("cut", |shell| {
        if copy_region(shell) {
            let routed = shell.forward_system(&SystemEvent::DeleteRegion);
            shell.feedback(routed);
        }
    });
    commands.add("delete", |shell| {
        let routed = shell.forward_system(&SystemEvent::DeleteRegion);
        shell.feedback(routed);
    });
    commands.add("paste", |shell| {
        if shell.clipboard().is_empty() {
            shell.play(Sound::EventNotProcessed);
            shell.message(phrases::CLIPBOARD_EMPTY);
        } else {
            shell.enqueue(SystemEvent::Paste);
        }
    });
    commands.add("region-point", |shell| match shell.forward_system(&SystemEvent::RegionPoint) {
        Routed::Processed => {
            shell.play(Sound::RegionPoint);
            shell.say(phrases::REGION_POINT);
        }
        routed => shell.feedback(routed),
    });
    commands.add("search", |shell| {
        shell.activate_search();
    });
    commands.add("paste-system", |shell| match shell.clipboard_mut().import_system() {
        Ok(0) => {
            shell.play(Sound::EventNotProcessed);
            shell.message(phrases::CLIPBOARD_EMPTY);
        }
        Ok(_) => shell.enqueue(SystemEvent::Paste),
        Err(e) => {
            tracing::debug!("System clipboard unavailable: {}", e);
            shell.play(Sound::EventNotProcessed);
            shell.message(phrases::SYSTEM_CLIPBOARD_UNAVAILABLE);
        }
    });

    commands.add("switch-next-app", |shell| {
        shell.switch_next_app();
    });
    commands.add("switch-next-area", |shell| {
        shell.switch_next_area();
    });
    commands.add("read-area", |shell| {
        shell.read_active_line();
    });
    commands.add("time", |shell| {
        let now = chrono::Local::now();
        shell.say(&now.format("%H:%M").to_string());
    });

    commands.add("speech-speed-inc", |shell| {
        let rate = shell.output_mut().speech_mut().increase_rate();
        report_level(shell, rate, phrases::speech_rate);
    });
    commands.add("speech-speed-dec", |shell| {
        let rate = shell.output_mut().speech_mut().decrease_rate();
        report_level(shell, rate, phrases::speech_rate);
    });
    commands.add("volume-inc", |shell| {
        let volume = shell.output_mut().speech_mut().increase_volume();
        report_level(shell, volume, phrases::volume);
    });
    commands.add("volume-dec", |shell| {
        let volume = shell.output_mut().speech_mut().decrease_volume();
        report_level(shell, volume, phrases::volume);
    });
    commands.add("speech-mute", |shell| {
        let muted = shell.output_mut().speech_mut().toggle_mute();
        let text = if muted {
            phrases::SPEECH_MUTED
        } else {
            phrases::SPEECH_UNMUTED
        };
        shell.message(text);
    });
}

/// Put the active area's region into the clipboard
fn copy_region(shell: &mut Shell) -> bool {
    let mut query = AreaQuery::region();
    if !shell.query_active(&mut query) {
        let routed = if shell.active_area().is_some() {
            Routed::NotProcessed
        } else {
            Routed::NoApplications
        };
        shell.feedback(routed);
        if routed == Routed::NotProcessed {
            shell.message(phrases::NO_REGION);
        }
        return false;
    }
    let AreaQuery::Region(Some(lines)) = query else {
        return false;
    };
    if lines.is_empty() {
        shell.play(Sound::EventNotProcessed);
        shell.message(phrases::NOTHING_TO_COPY);
        return false;
    }
    let count = lines.len();
    shell.clipboard_mut().set(lines);
    shell.message(&phrases::copied(count));
    true
}

fn report_level(shell: &mut Shell, level: Result<f32>, describe: fn(f32) -> String) {
    match level {
        Ok(level) => shell.message(&describe(level)),
        Err(e) => {
            tracing::warn!("Speech setting not changed: {:#}", e);
            shell.play(Sound::EventNotProcessed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::application::AppHandle;
    use crate::core::event::{Event, SystemCode};
    use crate::core::testing::{test_shell, TestApp};

    fn queued_codes(shell: &Shell) -> Vec<SystemCode> {
        let mut codes = Vec::new();
        while let Some(event) = shell.queue().try_take() {
            if let Event::System(system) = event {
                codes.push(system.code());
            }
        }
        codes
    }

    #[test]
    fn test_standard_names_present() {
        let (shell, _recorder) = test_shell();
        for name in [
            "main-menu", "quit", "copy", "cut", "paste", "paste-system", "region-point", "search",
            "time", "speech-mute",
        ] {
            assert!(shell.commands().contains(name), "{name} missing");
        }
    }

    #[test]
    fn test_event_commands_enqueue() {
        let (mut shell, _recorder) = test_shell();
        for name in ["ok", "cancel", "close", "save", "refresh", "open"] {
            assert!(shell.run_command(name));
        }
        assert_eq!(
            queued_codes(&shell),
            vec![
                SystemCode::Ok,
                SystemCode::Cancel,
                SystemCode::Close,
                SystemCode::Save,
                SystemCode::Refresh,
                SystemCode::Open,
            ]
        );
    }

    #[test]
    fn test_copy_and_cut() {
        let (mut shell, recorder) = test_shell();
        let app = TestApp::new("app");
        let handle: AppHandle = app.clone();
        shell.launch(handle).unwrap();
        app.main_area().set_region(vec!["one".into(), "two".into()]);

        shell.run_command("copy");
        assert_eq!(shell.clipboard().get(), ["one".to_string(), "two".to_string()]);
        assert_eq!(recorder.spoken().last().map(String::as_str), Some("Copied 2 lines"));

        shell.run_command("cut");
        assert_eq!(app.main_area().system_events(), vec!["DeleteRegion".to_string()]);
    }

    #[test]
    fn test_copy_without_region() {
        let (mut shell, recorder) = test_shell();
        let handle = TestApp::handle("app");
        shell.launch(handle).unwrap();
        shell.run_command("copy");
        assert!(shell.clipboard().is_empty());
        assert_eq!(recorder.played(Sound::EventNotProcessed), 1);
        assert_eq!(recorder.spoken().last().map(String::as_str), Some(phrases::NO_REGION));
    }

    #[test]
    fn test_paste_needs_clipboard_content() {
        let (mut shell, recorder) = test_shell();
        shell.run_command("paste");
        assert!(shell.queue().is_empty());
        assert_eq!(recorder.spoken().last().map(String::as_str), Some(phrases::CLIPBOARD_EMPTY));

        shell.clipboard_mut().set(vec!["x".into()]);
        shell.run_command("paste");
        assert_eq!(queued_codes(&shell), vec![SystemCode::Paste]);
    }

    #[test]
    fn test_region_point_goes_to_active_area() {
        let (mut shell, recorder) = test_shell();
        shell.run_command("region-point");
        assert_eq!(recorder.played(Sound::NoApplications), 1);

        let app = TestApp::new("app");
        let handle: AppHandle = app.clone();
        shell.launch(handle).unwrap();
        shell.run_command("region-point");
        assert_eq!(app.main_area().system_events(), vec!["RegionPoint".to_string()]);
        assert_eq!(recorder.played(Sound::RegionPoint), 1);
        assert_eq!(recorder.spoken().last().map(String::as_str), Some(phrases::REGION_POINT));
    }

    #[test]
    fn test_speech_settings_are_announced() {
        let (mut shell, recorder) = test_shell();
        shell.run_command("speech-speed-inc");
        assert_eq!(recorder.spoken().last().map(String::as_str), Some("Speech rate 110"));
        shell.run_command("speech-mute");
        assert_eq!(recorder.spoken().last().map(String::as_str), Some(phrases::SPEECH_MUTED));
    }
}
