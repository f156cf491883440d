// Shared test doubles: a canned speech backend and a view that records
// every call for assertion.
#![allow(dead_code)]

use anyhow::Result;
use std::path::Path;
use std::sync::Mutex;

use voxarch::{ArchiveIndex, AudioArtifact, SpeechBackend, SynthesisOptions, View};

/// Write a small mono 16-bit WAV fixture.
pub fn write_test_wav(path: &Path, frames: usize, sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for i in 0..frames {
        writer.write_sample(((i % 100) as i16) * 50)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Speech backend returning canned results: synthesis writes a fixture WAV,
/// transcription returns a fixed transcript.
pub struct StubSpeech {
    pub transcript: String,
}

impl StubSpeech {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SpeechBackend for StubSpeech {
    async fn synthesize(
        &self,
        _text: &str,
        _options: &SynthesisOptions,
        output: &Path,
    ) -> Result<AudioArtifact> {
        write_test_wav(output, 1600, 16_000)?;
        ArchiveIndex::probe(output)
    }

    async fn transcribe(&self, path: &Path) -> Result<String> {
        anyhow::ensure!(path.exists(), "audio file missing: {}", path.display());
        Ok(self.transcript.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// View that records every rendering call as a string event.
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<String>>,
    /// What `prompt_tag` should answer.
    pub tag_answer: Mutex<Option<String>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_answer(tag: &str) -> Self {
        let view = Self::default();
        *view.tag_answer.lock().unwrap() = Some(tag.to_string());
        view
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn has_event(&self, prefix: &str) -> bool {
        self.events().iter().any(|e| e.starts_with(prefix))
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl View for RecordingView {
    fn samples_header(&self, headers: &[&str]) {
        self.push(format!("header:{}", headers.join("|")));
    }

    fn samples_rows(&self, entries: &[AudioArtifact]) {
        self.push(format!("rows:{}", entries.len()));
    }

    fn synthesizing(&self) {
        self.push("synthesizing".to_string());
    }

    fn recording(&self) {
        self.push("recording".to_string());
    }

    fn transcribing(&self) {
        self.push("transcribing".to_string());
    }

    fn transcription(&self, text: &str) {
        self.push(format!("transcription:{}", text));
    }

    fn success(&self, command: &str, artifact: &Path) {
        self.push(format!("success:{}:{}", command, artifact.display()));
    }

    fn interrupted(&self, command: &str) {
        self.push(format!("interrupted:{}", command));
    }

    fn error(&self, command: &str, cause: &str) {
        self.push(format!("error:{}:{}", command, cause));
    }

    fn warn(&self, message: &str) {
        self.push(format!("warn:{}", message));
    }

    fn prompt_tag(&self) -> Option<String> {
        self.push("prompt_tag".to_string());
        self.tag_answer.lock().unwrap().clone()
    }
}
