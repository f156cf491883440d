use anyhow::Result;
use std::path::Path;

use crate::audio::AudioArtifact;

/// Per-request synthesis options, merged from command arguments over the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    pub voice: Option<String>,
    pub language: Option<String>,
}

/// Speech service boundary.
///
/// Both operations are long-running and synchronous from the caller's point
/// of view; implementations may talk to a local engine or a remote API.
/// Failures surface as `VoxError::Backend` inside the returned error.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize `text` into a WAV file at `output` and return its
    /// metadata. The parent directory is expected to exist.
    async fn synthesize(
        &self,
        text: &str,
        options: &SynthesisOptions,
        output: &Path,
    ) -> Result<AudioArtifact>;

    /// Transcribe the audio file at `path` to plain text.
    async fn transcribe(&self, path: &Path) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
