//! Command orchestration: the shared handler contract, the argument and
//! result bundles, and the registry of named operations.

pub mod handlers;
pub mod registry;

pub use handlers::{ListCommand, ListenCommand, SpeakCommand, TranscribeCommand};
pub use registry::CommandRegistry;

use std::path::{Path, PathBuf};

use crate::audio::AudioCapture;
use crate::speech::SpeechBackend;
use crate::view::View;

/// Argument bundle passed to every handler. Individual commands read the
/// fields they care about and ignore the rest.
#[derive(Debug, Clone)]
pub struct CommandArgs {
    /// Text to synthesize (speak)
    pub text: Option<String>,
    /// Artifact tag; prompted for or timestamp-derived when absent
    pub tag: Option<String>,
    /// Existing audio file to transcribe
    pub path: Option<PathBuf>,
    /// Language override for synthesis
    pub language: Option<String>,
    /// Voice override for synthesis
    pub voice: Option<String>,
    /// Whether to render transcribed text
    pub print: bool,
}

impl Default for CommandArgs {
    fn default() -> Self {
        Self {
            text: None,
            tag: None,
            path: None,
            language: None,
            voice: None,
            print: true,
        }
    }
}

/// Outcome tag of a handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Interrupted,
    Failed,
}

/// Result of one handler invocation; consumed by the caller immediately,
/// never persisted.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub artifact: Option<PathBuf>,
    pub text: Option<String>,
}

impl CommandResult {
    pub fn success(artifact: Option<PathBuf>, text: Option<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            artifact,
            text,
        }
    }

    pub fn interrupted() -> Self {
        Self {
            status: CommandStatus::Interrupted,
            artifact: None,
            text: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: CommandStatus::Failed,
            artifact: None,
            text: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

/// The collaborators a handler operates against: the capture device, the
/// speech service boundary, and the archive root.
pub struct Backend {
    pub capture: AudioCapture,
    pub speech: Box<dyn SpeechBackend>,
    pub archive_root: PathBuf,
}

/// The shared handler contract. Handlers report progress and results only
/// through the given view and are stateless across invocations, except
/// where an operation inherently carries session state (see
/// `ListenCommand`'s interrupt signal).
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Canonical lowercase command name, unique per handler.
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        args: &CommandArgs,
        backend: &Backend,
        view: &dyn View,
    ) -> CommandResult;
}

/// Timestamp-derived tag in the archive's naming convention.
pub fn stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d@%H%M%S").to_string()
}

/// Tag resolution order: explicit argument, then the view's prompt, then a
/// timestamp.
pub(crate) fn resolve_tag(explicit: Option<&str>, view: &dyn View) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| view.prompt_tag())
        .unwrap_or_else(stamp)
}

/// Archive path for a tag's audio artifact.
pub(crate) fn wav_path(root: &Path, tag: &str) -> PathBuf {
    if tag.to_ascii_lowercase().ends_with(".wav") {
        root.join(tag)
    } else {
        root.join(format!("{}.wav", tag))
    }
}

/// Archive path for a tag's transcript artifact: same base name as the
/// audio, `.txt` extension.
pub(crate) fn transcript_path(root: &Path, tag: &str) -> PathBuf {
    let base = tag
        .strip_suffix(".wav")
        .or_else(|| tag.strip_suffix(".WAV"))
        .unwrap_or(tag);
    if base.to_ascii_lowercase().ends_with(".txt") {
        root.join(base)
    } else {
        root.join(format!("{}.txt", base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_path_appends_extension_once() {
        let root = Path::new("archive");
        assert_eq!(wav_path(root, "demo"), root.join("demo.wav"));
        assert_eq!(wav_path(root, "demo.wav"), root.join("demo.wav"));
        assert_eq!(wav_path(root, "demo.WAV"), root.join("demo.WAV"));
    }

    #[test]
    fn transcript_path_swaps_audio_extension() {
        let root = Path::new("archive");
        assert_eq!(transcript_path(root, "demo"), root.join("demo.txt"));
        assert_eq!(transcript_path(root, "demo.wav"), root.join("demo.txt"));
        assert_eq!(transcript_path(root, "demo.txt"), root.join("demo.txt"));
    }

    #[test]
    fn stamp_has_the_archive_shape() {
        let tag = stamp();
        // e.g. 2026-08-06@142551
        assert_eq!(tag.len(), 17);
        assert_eq!(&tag[4..5], "-");
        assert_eq!(&tag[10..11], "@");
    }
}
