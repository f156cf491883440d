use anyhow::{Context, Result};
use hound::WavReader;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::VoxError;

/// Metadata for one WAV file in the archive.
///
/// Duration and bit depth are derived from the file header every time the
/// file is probed; nothing here is cached across listings.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl AudioArtifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read-only index over the archive directory.
pub struct ArchiveIndex;

impl ArchiveIndex {
    /// Read size, duration, rate, and bit depth from a single WAV file.
    ///
    /// Opens the header only; the sample payload is never decoded.
    pub fn probe(path: impl AsRef<Path>) -> Result<AudioArtifact> {
        let path = path.as_ref();

        let size_bytes = fs::metadata(path)
            .map_err(|e| VoxError::NotFound(format!("{}: {}", path.display(), e)))?
            .len();

        let reader = WavReader::open(path)
            .map_err(|e| VoxError::CorruptArtifact(format!("{}: {}", path.display(), e)))?;

        let spec = reader.spec();
        let frames = reader.duration();
        let duration_secs = frames as f64 / spec.sample_rate as f64;

        debug!(
            "Probed {}: {:.2}s, {}Hz, {}-bit",
            path.display(),
            duration_secs,
            spec.sample_rate,
            spec.bits_per_sample
        );

        Ok(AudioArtifact {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        })
    }

    /// List every `*.wav` file (case-insensitive) directly under `dir`,
    /// sorted by filename.
    ///
    /// The listing is recomputed on every call since files come and go
    /// underneath us. An entry whose header cannot be parsed is logged and
    /// skipped rather than failing the whole scan; callers that need the
    /// stricter behavior can `probe` individual files.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Vec<AudioArtifact>> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(
                VoxError::NotFound(format!("archive directory {}", dir.display())).into(),
            );
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read archive directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("wav"))
                    .unwrap_or(false)
            })
            .collect();

        paths.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));

        let mut artifacts = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::probe(&path) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => warn!("Skipping unreadable archive entry: {}", e),
            }
        }

        Ok(artifacts)
    }
}
