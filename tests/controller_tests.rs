// Integration tests for command dispatch
//
// The controller, registry, and handlers run headless here: a stub speech
// backend stands in for the service boundary and a recording view captures
// everything a front end would render.

mod common;

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use voxarch::{
    AudioCapture, Backend, CommandArgs, CommandRegistry, CommandStatus, Config, Controller,
};

use common::{write_test_wav, RecordingView, StubSpeech};

fn ready_controller(view: Arc<RecordingView>, root: &Path, transcript: &str) -> Controller {
    let mut controller = Controller::new(view, Config::default());
    controller.ready(Backend {
        capture: AudioCapture::new(Config::default().capture),
        speech: Box::new(StubSpeech::new(transcript)),
        archive_root: root.to_path_buf(),
    });
    controller
}

#[test]
fn registry_is_deterministic() {
    // Built twice in the same process, the registry exposes the same
    // command-name set.
    let first = CommandRegistry::new();
    let second = CommandRegistry::new();

    assert_eq!(first.names(), second.names());
    assert_eq!(first.names(), vec!["list", "listen", "speak", "transcribe"]);
}

#[test]
fn registry_lookup_is_case_insensitive() {
    let registry = CommandRegistry::new();

    assert!(registry.get("list").is_some());
    assert!(registry.get("LIST").is_some());
    assert!(registry.get("Transcribe").is_some());
    assert!(registry.get("bogus").is_none());
}

#[tokio::test]
async fn execute_before_init_reports_not_ready() {
    let view = Arc::new(RecordingView::new());
    let controller = Controller::new(view.clone(), Config::default());

    let result = controller.execute("list", &CommandArgs::default()).await;

    assert_eq!(result.status, CommandStatus::Failed);
    assert!(!controller.is_ready());
    assert!(controller.services().is_empty());
    assert!(view.has_event("error:list"));
}

#[tokio::test]
async fn unknown_command_warns_with_valid_names() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "");

    let result = controller.execute("shout", &CommandArgs::default()).await;

    // Verify: no panic, a warning naming every registered command
    assert_eq!(result.status, CommandStatus::Failed);
    let events = view.events();
    let warning = events
        .iter()
        .find(|e| e.starts_with("warn:"))
        .expect("a warning event");
    assert!(warning.contains("shout"));
    assert!(warning.contains("list, listen, speak, transcribe"));

    Ok(())
}

#[tokio::test]
async fn services_exposes_the_registered_names() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view, temp_dir.path(), "");

    assert_eq!(
        controller.services(),
        vec!["list", "listen", "speak", "transcribe"]
    );

    Ok(())
}

#[tokio::test]
async fn list_renders_header_then_rows() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_test_wav(&temp_dir.path().join("a.wav"), 160, 16_000)?;
    write_test_wav(&temp_dir.path().join("b.wav"), 160, 16_000)?;
    fs::write(temp_dir.path().join("notes.txt"), "ignored")?;

    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "");

    let result = controller.execute("list", &CommandArgs::default()).await;

    assert_eq!(result.status, CommandStatus::Success);
    let events = view.events();
    assert_eq!(events[0], "header:SAMPLES|SIZE|DURATION|RATE|BITS");
    assert_eq!(events[1], "rows:2");

    Ok(())
}

#[tokio::test]
async fn list_missing_archive_renders_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("gone");

    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), &missing, "");

    let result = controller.execute("list", &CommandArgs::default()).await;

    assert_eq!(result.status, CommandStatus::Failed);
    assert!(view.has_event("error:list"));

    Ok(())
}

#[tokio::test]
async fn transcribe_missing_file_is_not_found_and_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "should not appear");

    let args = CommandArgs {
        path: Some(temp_dir.path().join("missing.wav")),
        tag: Some("ghost".to_string()),
        ..CommandArgs::default()
    };

    let result = controller.execute("transcribe", &args).await;

    // Verify: not-found error, and no transcript file was created
    assert_eq!(result.status, CommandStatus::Failed);
    let events = view.events();
    let error = events
        .iter()
        .find(|e| e.starts_with("error:transcribe"))
        .expect("an error event");
    assert!(error.contains("not found"));
    assert!(!temp_dir.path().join("ghost.txt").exists());

    Ok(())
}

#[tokio::test]
async fn transcribe_persists_tagged_transcript() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let audio = temp_dir.path().join("meeting.wav");
    write_test_wav(&audio, 1600, 16_000)?;

    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "minutes of the meeting");

    let args = CommandArgs {
        path: Some(audio),
        tag: Some("minutes".to_string()),
        ..CommandArgs::default()
    };

    let result = controller.execute("transcribe", &args).await;

    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(result.text.as_deref(), Some("minutes of the meeting"));
    assert!(view.has_event("transcribing"));
    assert!(view.has_event("transcription:minutes of the meeting"));
    assert!(view.has_event("success:transcribe"));

    let saved = fs::read_to_string(temp_dir.path().join("minutes.txt"))?;
    assert_eq!(saved, "minutes of the meeting");

    Ok(())
}

#[tokio::test]
async fn transcribe_quiet_skips_rendering_but_still_returns_text() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let audio = temp_dir.path().join("clip.wav");
    write_test_wav(&audio, 1600, 16_000)?;

    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "quiet words");

    let args = CommandArgs {
        path: Some(audio),
        print: false,
        ..CommandArgs::default()
    };

    let result = controller.execute("transcribe", &args).await;

    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(result.text.as_deref(), Some("quiet words"));
    assert!(!view.has_event("transcription:"));

    Ok(())
}

#[tokio::test]
async fn speak_synthesizes_into_the_archive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "");

    let args = CommandArgs {
        text: Some("good morning".to_string()),
        tag: Some("greeting".to_string()),
        ..CommandArgs::default()
    };

    let result = controller.execute("speak", &args).await;

    assert_eq!(result.status, CommandStatus::Success);
    assert!(view.has_event("synthesizing"));
    assert!(view.has_event("success:speak"));

    let wav = temp_dir.path().join("greeting.wav");
    assert!(wav.exists());
    assert_eq!(result.artifact.as_deref(), Some(wav.as_path()));

    Ok(())
}

#[tokio::test]
async fn speak_uses_the_prompted_tag() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let view = Arc::new(RecordingView::with_tag_answer("prompted"));
    let controller = ready_controller(view.clone(), temp_dir.path(), "");

    let args = CommandArgs {
        text: Some("hi".to_string()),
        ..CommandArgs::default()
    };

    let result = controller.execute("speak", &args).await;

    assert_eq!(result.status, CommandStatus::Success);
    assert!(view.has_event("prompt_tag"));
    assert!(temp_dir.path().join("prompted.wav").exists());

    Ok(())
}

#[tokio::test]
async fn speak_falls_back_to_a_timestamp_tag() -> Result<()> {
    let temp_dir = TempDir::new()?;
    // The silent-style answer: the prompt yields nothing
    let view = Arc::new(RecordingView::new());
    let controller = ready_controller(view.clone(), temp_dir.path(), "");

    let args = CommandArgs {
        text: Some("hi".to_string()),
        ..CommandArgs::default()
    };

    let result = controller.execute("speak", &args).await;

    assert_eq!(result.status, CommandStatus::Success);

    // Exactly one WAV appeared, named by timestamp
    let wavs: Vec<_> = fs::read_dir(temp_dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "wav").unwrap_or(false))
        .collect();
    assert_eq!(wavs.len(), 1);
    let name = wavs[0].file_stem().unwrap().to_string_lossy().into_owned();
    assert!(name.contains('@'), "timestamp tag expected, got {}", name);

    Ok(())
}
