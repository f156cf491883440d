use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

use super::{
    resolve_tag, transcript_path, wav_path, Backend, Command, CommandArgs, CommandResult,
    CommandStatus,
};
use crate::audio::ArchiveIndex;
use crate::error::VoxError;
use crate::speech::SynthesisOptions;
use crate::view::View;

const LIST_HEADERS: [&str; 5] = ["SAMPLES", "SIZE", "DURATION", "RATE", "BITS"];

const DEFAULT_SPEAK_TEXT: &str =
    "Hello, World! You seem to have forgotten to provide text to speak.";

/// `list`: dump the archive as a table.
pub struct ListCommand;

#[async_trait::async_trait]
impl Command for ListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    async fn execute(
        &self,
        _args: &CommandArgs,
        backend: &Backend,
        view: &dyn View,
    ) -> CommandResult {
        match ArchiveIndex::scan(&backend.archive_root) {
            Ok(entries) => {
                view.samples_header(&LIST_HEADERS);
                view.samples_rows(&entries);
                CommandResult::success(None, None)
            }
            Err(e) => {
                view.error(self.name(), &format!("{:#}", e));
                CommandResult::failed()
            }
        }
    }
}

/// `speak`: synthesize text into a tagged archive artifact.
pub struct SpeakCommand;

#[async_trait::async_trait]
impl Command for SpeakCommand {
    fn name(&self) -> &'static str {
        "speak"
    }

    async fn execute(
        &self,
        args: &CommandArgs,
        backend: &Backend,
        view: &dyn View,
    ) -> CommandResult {
        let tag = resolve_tag(args.tag.as_deref(), view);
        let output = wav_path(&backend.archive_root, &tag);
        let text = args.text.as_deref().unwrap_or(DEFAULT_SPEAK_TEXT);
        let options = SynthesisOptions {
            voice: args.voice.clone(),
            language: args.language.clone(),
        };

        view.synthesizing();

        tokio::select! {
            result = backend.speech.synthesize(text, &options, &output) => match result {
                Ok(artifact) => {
                    view.success(self.name(), &artifact.path);
                    CommandResult::success(Some(artifact.path), None)
                }
                Err(e) => {
                    view.error(self.name(), &format!("{:#}", e));
                    CommandResult::failed()
                }
            },
            _ = tokio::signal::ctrl_c() => {
                view.interrupted(self.name());
                CommandResult::interrupted()
            }
        }
    }
}

/// `listen`: record until interrupted, finalize, then transcribe.
///
/// The interrupt `Notify` belongs to this handler so that an embedding
/// caller (or a test) can stop the capture without a process signal; the
/// console flow uses Ctrl+C. Either way the recording is finalized before
/// transcription starts.
pub struct ListenCommand {
    interrupt: Arc<Notify>,
}

impl ListenCommand {
    pub fn new() -> Self {
        Self {
            interrupt: Arc::new(Notify::new()),
        }
    }

    /// Handle that stops an in-flight `execute` the same way Ctrl+C does.
    pub fn interrupt_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.interrupt)
    }
}

impl Default for ListenCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Command for ListenCommand {
    fn name(&self) -> &'static str {
        "listen"
    }

    async fn execute(
        &self,
        args: &CommandArgs,
        backend: &Backend,
        view: &dyn View,
    ) -> CommandResult {
        let tag = resolve_tag(args.tag.as_deref(), view);
        let audio_path = wav_path(&backend.archive_root, &tag);

        if let Err(e) = backend.capture.start(&audio_path).await {
            view.error(self.name(), &format!("{:#}", e));
            return CommandResult::failed();
        }

        view.recording();

        // Park until the user interrupts; no polling. The signal only
        // requests a stop; finalization happens unconditionally below.
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = self.interrupt.notified() => {}
        }

        let artifact = match backend.capture.stop().await {
            Ok(Some(artifact)) => artifact,
            Ok(None) => {
                view.interrupted(self.name());
                return CommandResult::interrupted();
            }
            Err(e) => {
                view.error(self.name(), &format!("{:#}", e));
                return CommandResult::failed();
            }
        };

        view.success(self.name(), &artifact.path);
        view.transcribing();

        match backend.speech.transcribe(&artifact.path).await {
            Ok(text) if !text.is_empty() => {
                if args.print {
                    view.transcription(&text);
                }
                let txt = transcript_path(&backend.archive_root, &tag);
                match tokio::fs::write(&txt, &text).await {
                    Ok(()) => info!("Transcript saved to {}", txt.display()),
                    Err(e) => view.error(self.name(), &format!("saving transcript: {}", e)),
                }
                CommandResult::success(Some(artifact.path), Some(text))
            }
            Ok(_) => CommandResult::success(Some(artifact.path), None),
            Err(e) => {
                view.error(self.name(), &format!("{:#}", e));
                CommandResult {
                    status: CommandStatus::Failed,
                    artifact: Some(artifact.path),
                    text: None,
                }
            }
        }
    }
}

/// `transcribe`: turn an existing audio file into text, optionally
/// archiving the transcript under a tag.
pub struct TranscribeCommand;

#[async_trait::async_trait]
impl Command for TranscribeCommand {
    fn name(&self) -> &'static str {
        "transcribe"
    }

    async fn execute(
        &self,
        args: &CommandArgs,
        backend: &Backend,
        view: &dyn View,
    ) -> CommandResult {
        let Some(path) = args.path.as_deref() else {
            view.error(self.name(), "no audio file path provided");
            return CommandResult::failed();
        };

        if !path.exists() {
            let err = VoxError::NotFound(path.display().to_string());
            view.error(self.name(), &err.to_string());
            return CommandResult::failed();
        }

        view.transcribing();

        let text = tokio::select! {
            result = backend.speech.transcribe(path) => match result {
                Ok(text) => text,
                Err(e) => {
                    view.error(self.name(), &format!("{:#}", e));
                    return CommandResult::failed();
                }
            },
            _ = tokio::signal::ctrl_c() => {
                view.interrupted(self.name());
                return CommandResult::interrupted();
            }
        };

        if args.print && !text.is_empty() {
            view.transcription(&text);
        }

        if let Some(tag) = args.tag.as_deref() {
            let txt = transcript_path(&backend.archive_root, tag);
            match tokio::fs::write(&txt, &text).await {
                Ok(()) => view.success(self.name(), &txt),
                Err(e) => view.error(self.name(), &format!("saving transcript: {}", e)),
            }
        }

        CommandResult::success(None, Some(text))
    }
}
