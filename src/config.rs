use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub capture: CaptureConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Root directory holding WAV recordings and their transcripts.
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Sample rate in Hz (Whisper-friendly 16kHz)
    pub sample_rate: u32,
    /// Channel count (1 = mono)
    pub channels: u16,
    /// Frames per PCM chunk read from the device
    pub chunk_frames: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Base URL of an OpenAI-compatible audio API
    pub endpoint: String,
    /// Bearer token; usually supplied via VOXARCH_SPEECH__API_KEY
    pub api_key: String,
    /// Transcription model name
    pub stt_model: String,
    /// Synthesis model name
    pub tts_model: String,
    /// Default synthesis voice
    pub voice: String,
    /// Default language hint, if any
    pub language: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: ArchiveConfig {
                root: "archive".to_string(),
            },
            capture: CaptureConfig {
                sample_rate: 16_000,
                channels: 1,
                chunk_frames: 1024,
            },
            speech: SpeechConfig {
                endpoint: "https://api.openai.com".to_string(),
                api_key: String::new(),
                stt_model: "whisper-1".to_string(),
                tts_model: "tts-1".to_string(),
                voice: "alloy".to_string(),
                language: None,
                timeout_secs: 60,
            },
        }
    }
}

impl Config {
    /// Load configuration: built-in defaults, overridden by an optional
    /// config file, overridden by VOXARCH_* environment variables
    /// (e.g. VOXARCH_SPEECH__API_KEY).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("VOXARCH").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.capture.sample_rate, 16_000);
        assert_eq!(cfg.capture.channels, 1);
        assert_eq!(cfg.capture.chunk_frames, 1024);
        assert_eq!(cfg.archive.root, "archive");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let cfg = Config::load("config/does-not-exist")?;
        assert_eq!(cfg.archive.root, "archive");
        assert_eq!(cfg.speech.stt_model, "whisper-1");
        Ok(())
    }
}
