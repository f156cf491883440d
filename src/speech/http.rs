use anyhow::{Context, Result};
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::{SpeechBackend, SynthesisOptions};
use crate::audio::{ArchiveIndex, AudioArtifact};
use crate::config::SpeechConfig;
use crate::error::VoxError;

/// Client for an OpenAI-compatible audio API (`/v1/audio/transcriptions`
/// and `/v1/audio/speech`). Works against api.openai.com or any local
/// server speaking the same surface.
pub struct HttpSpeechClient {
    config: SpeechConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

impl HttpSpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build speech service HTTP client")?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl SpeechBackend for HttpSpeechClient {
    async fn synthesize(
        &self,
        text: &str,
        options: &SynthesisOptions,
        output: &Path,
    ) -> Result<AudioArtifact> {
        let voice = options.voice.as_deref().unwrap_or(&self.config.voice);
        let language = options
            .language
            .as_deref()
            .or(self.config.language.as_deref());

        debug!(
            "Synthesizing {} chars with voice '{}' into {}",
            text.len(),
            voice,
            output.display()
        );

        let body = SpeechRequest {
            model: &self.config.tts_model,
            input: text,
            voice,
            response_format: "wav",
            language,
        };

        let response = self
            .client
            .post(self.url("/v1/audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoxError::Backend(format!("speech request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            return Err(VoxError::Backend(format!("synthesis: {} - {}", status, detail)).into());
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoxError::Backend(format!("reading synthesis response: {}", e)))?;

        tokio::fs::write(output, &audio)
            .await
            .map_err(|e| VoxError::Io(format!("writing {}: {}", output.display(), e)))?;

        info!("Synthesized speech saved to {}", output.display());

        ArchiveIndex::probe(output)
    }

    async fn transcribe(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| VoxError::NotFound(format!("{}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        debug!("Uploading {} ({} bytes) for transcription", file_name, bytes.len());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.stt_model.clone());

        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(self.url("/v1/audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoxError::Backend(format!("transcription request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            return Err(
                VoxError::Backend(format!("transcription: {} - {}", status, detail)).into(),
            );
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoxError::Backend(format!("parsing transcription response: {}", e)))?;

        Ok(parsed.text)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Pull the human-readable message out of an API error body, falling back
/// to the raw body when it is not the usual `{"error": {"message": ...}}`
/// shape.
fn error_detail(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_unwraps_api_error_bodies() {
        let body = r#"{"error": {"message": "invalid voice", "type": "invalid_request_error"}}"#;
        assert_eq!(error_detail(body.to_string()), "invalid voice");
    }

    #[test]
    fn error_detail_passes_through_plain_bodies() {
        assert_eq!(error_detail("bad gateway".to_string()), "bad gateway");
    }
}

