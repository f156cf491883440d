use std::path::Path;

use super::View;
use crate::audio::AudioArtifact;

/// A view that renders nothing. Used for embedded/non-interactive
/// invocation and as the default when no front end is bound; tag prompts
/// yield no tag so callers fall back to timestamp naming.
pub struct SilentView;

impl SilentView {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SilentView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for SilentView {
    fn samples_header(&self, _headers: &[&str]) {}

    fn samples_rows(&self, _entries: &[AudioArtifact]) {}

    fn synthesizing(&self) {}

    fn recording(&self) {}

    fn transcribing(&self) {}

    fn transcription(&self, _text: &str) {}

    fn success(&self, _command: &str, _artifact: &Path) {}

    fn interrupted(&self, _command: &str) {}

    fn error(&self, _command: &str, _cause: &str) {}

    fn warn(&self, _message: &str) {}

    fn prompt_tag(&self) -> Option<String> {
        None
    }
}
