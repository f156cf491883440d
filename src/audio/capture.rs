use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SizedSample};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::archive::{ArchiveIndex, AudioArtifact};
use crate::config::CaptureConfig;
use crate::error::VoxError;

/// How long the capture worker blocks on the chunk channel before
/// re-checking the cancellation latch. Only relevant while the device
/// delivers nothing; a live microphone wakes the worker every chunk.
const IDLE_RECV_TIMEOUT: Duration = Duration::from_millis(200);

/// Microphone capture with a start/stop lifecycle.
///
/// At most one recording session is active per instance. `start` launches a
/// single worker that owns the device stream and the chunk buffer; `stop`
/// signals it, waits for the WAV file to be fully written and closed, and
/// returns the finalized artifact. The input device is resolved on first
/// use and held for the lifetime of the instance.
pub struct AudioCapture {
    config: CaptureConfig,
    device: Mutex<Option<cpal::Device>>,
    active: tokio::sync::Mutex<Option<ActiveSession>>,
}

struct ActiveSession {
    session_id: Uuid,
    path: PathBuf,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<AudioArtifact>>,
}

impl AudioCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            device: Mutex::new(None),
            active: tokio::sync::Mutex::new(None),
        }
    }

    /// Begin recording into `path`.
    ///
    /// Returns once the device stream is running; PCM chunks accumulate on a
    /// background worker until `stop`. Calling `start` while a session is
    /// active is a no-op, so the device is never opened twice.
    pub async fn start(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();

        let mut active = self.active.lock().await;
        if let Some(session) = active.as_ref() {
            warn!(
                "Recording already active ({}), ignoring start for {}",
                session.path.display(),
                path.display()
            );
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    VoxError::Io(format!("creating {}: {}", parent.display(), e))
                })?;
            }
        }

        let device = self.input_device()?;
        let session_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = spawn_capture_worker(
            device,
            self.config.clone(),
            path.clone(),
            Arc::clone(&cancel),
            ready_tx,
        );

        // The worker reports stream startup synchronously so that device
        // and stream errors surface here rather than at stop.
        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.await;
                return Err(e);
            }
            Err(_) => {
                let _ = worker.await;
                return Err(VoxError::DeviceUnavailable(
                    "capture worker exited before the stream started".to_string(),
                )
                .into());
            }
        }

        info!(
            "Recording started: {} (session {})",
            path.display(),
            session_id
        );

        *active = Some(ActiveSession {
            session_id,
            path,
            cancel,
            worker,
        });

        Ok(())
    }

    /// Stop the active recording, if any, and finalize its WAV file.
    ///
    /// Blocks until the worker has written and closed the file, so callers
    /// may read the returned artifact immediately. Idempotent: with no
    /// active session this returns `Ok(None)`.
    pub async fn stop(&self) -> Result<Option<AudioArtifact>> {
        let mut active = self.active.lock().await;
        let Some(session) = active.take() else {
            debug!("stop() with no active recording");
            return Ok(None);
        };

        session.cancel.store(true, Ordering::SeqCst);

        let artifact = session
            .worker
            .await
            .context("Capture worker panicked")??;

        info!(
            "Recording stopped: {} ({:.2}s, session {})",
            artifact.path.display(),
            artifact.duration_secs,
            session.session_id
        );

        Ok(Some(artifact))
    }

    pub async fn is_recording(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Resolve the default input device, caching it for later sessions.
    fn input_device(&self) -> Result<cpal::Device> {
        let mut cached = self
            .device
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(device) = cached.as_ref() {
            return Ok(device.clone());
        }

        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| VoxError::DeviceUnavailable("no default input device".to_string()))?;

        if let Ok(name) = device.name() {
            info!("Using audio input device: {}", name);
        }

        *cached = Some(device.clone());
        Ok(device)
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        // Signal any straggling session; the worker finishes the file on
        // its own blocking thread even though nobody awaits it.
        if let Ok(mut active) = self.active.try_lock() {
            if let Some(session) = active.take() {
                warn!(
                    "AudioCapture dropped while recording {}; finalizing in background",
                    session.path.display()
                );
                session.cancel.store(true, Ordering::SeqCst);
            }
        }
    }
}

/// Launch the blocking worker that owns the cpal stream and the buffer.
///
/// The stream is created, driven, and dropped entirely on the worker thread
/// (cpal streams must not cross threads). The worker reports stream startup
/// through `ready_tx`, then collects chunks until cancelled, then writes
/// the WAV container and returns the probed artifact.
fn spawn_capture_worker(
    device: cpal::Device,
    config: CaptureConfig,
    path: PathBuf,
    cancel: Arc<AtomicBool>,
    ready_tx: oneshot::Sender<Result<()>>,
) -> JoinHandle<Result<AudioArtifact>> {
    tokio::task::spawn_blocking(move || {
        let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<Vec<i32>>();

        let stream = match build_input_stream(&device, &config, chunk_tx) {
            Ok(stream) => stream,
            Err(e) => {
                let msg = e.to_string();
                let _ = ready_tx.send(Err(e));
                return Err(VoxError::DeviceUnavailable(msg).into());
            }
        };

        if let Err(e) = stream.play() {
            let err = VoxError::DeviceUnavailable(format!("failed to start stream: {}", e));
            let _ = ready_tx.send(Err(err.clone().into()));
            return Err(err.into());
        }

        let _ = ready_tx.send(Ok(()));

        let mut chunks = collect_chunks(&chunk_rx, &cancel);

        // Chunks already queued were read from the device before the
        // signal; keep them. Anything the callback produces after this
        // point is discarded along with the stream.
        while let Ok(chunk) = chunk_rx.try_recv() {
            chunks.push(chunk);
        }
        drop(stream);

        debug!(
            "Capture worker collected {} chunks for {}",
            chunks.len(),
            path.display()
        );

        finalize_wav(&path, &chunks, config.sample_rate, config.channels)?;
        ArchiveIndex::probe(&path)
    })
}

/// Accumulate chunks until the cancellation latch is observed.
///
/// The worker parks in `recv_timeout`, waking on each arriving chunk; the
/// latch is therefore observed at chunk-boundary granularity. The timeout
/// arm only fires while the device delivers nothing ("no microphone input
/// yet") and simply re-checks the latch.
fn collect_chunks(chunk_rx: &Receiver<Vec<i32>>, cancel: &AtomicBool) -> Vec<Vec<i32>> {
    let mut chunks = Vec::new();
    loop {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        match chunk_rx.recv_timeout(IDLE_RECV_TIMEOUT) {
            Ok(chunk) => chunks.push(chunk),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    chunks
}

/// Write buffered chunks into a single WAV container.
///
/// The file is written next to its destination as `<name>.part` and renamed
/// into place once finalized, so a failed or interrupted write never leaves
/// a truncated `.wav` behind.
fn finalize_wav(path: &Path, chunks: &[Vec<i32>], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Int,
    };

    let tmp = part_path(path);

    let written = write_samples(&tmp, spec, chunks);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(VoxError::Io(format!("writing {}: {}", path.display(), e)).into());
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        VoxError::Io(format!("renaming {} into place: {}", path.display(), e))
    })?;

    Ok(())
}

fn write_samples(tmp: &Path, spec: hound::WavSpec, chunks: &[Vec<i32>]) -> Result<()> {
    let mut writer = hound::WavWriter::create(tmp, spec)
        .with_context(|| format!("Failed to create WAV file {}", tmp.display()))?;

    for chunk in chunks {
        for &sample in chunk {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Build the mono input stream, dispatching on the device's native sample
/// format. The callback re-chunks whatever buffer sizes the device delivers
/// into exactly `chunk_frames`-sized chunks; a trailing partial chunk at
/// shutdown is dropped with the stream.
fn build_input_stream(
    device: &cpal::Device,
    config: &CaptureConfig,
    chunk_tx: Sender<Vec<i32>>,
) -> Result<cpal::Stream> {
    let stream_config = cpal::StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        // Device-default buffer size; the callback re-chunks to
        // `chunk_frames` regardless of what the host delivers.
        buffer_size: cpal::BufferSize::Default,
    };

    let default_config = device
        .default_input_config()
        .context("No supported input configuration")?;

    let chunk_frames = config.chunk_frames as usize;

    let stream = match default_config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream_typed::<f32>(device, &stream_config, chunk_frames, chunk_tx)?
        }
        cpal::SampleFormat::I16 => {
            build_stream_typed::<i16>(device, &stream_config, chunk_frames, chunk_tx)?
        }
        cpal::SampleFormat::U16 => {
            build_stream_typed::<u16>(device, &stream_config, chunk_frames, chunk_tx)?
        }
        cpal::SampleFormat::I32 => {
            build_stream_typed::<i32>(device, &stream_config, chunk_frames, chunk_tx)?
        }
        other => anyhow::bail!("Unsupported device sample format: {:?}", other),
    };

    Ok(stream)
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    chunk_frames: usize,
    chunk_tx: Sender<Vec<i32>>,
) -> Result<cpal::Stream>
where
    T: SizedSample + Sample + Send + 'static,
    <T as Sample>::Float: Into<f32>,
{
    let mut pending: Vec<i32> = Vec::with_capacity(chunk_frames * 2);

    let data_callback = move |data: &[T], _info: &cpal::InputCallbackInfo| {
        pending.extend(data.iter().map(|&sample| sample_to_i32(sample)));

        while pending.len() >= chunk_frames {
            let chunk: Vec<i32> = pending.drain(..chunk_frames).collect();
            if chunk_tx.send(chunk).is_err() {
                // Receiver gone: the worker is shutting down.
                return;
            }
        }
    };

    let error_callback = |err| {
        tracing::error!("Audio stream error: {}", err);
    };

    let stream = device
        .build_input_stream(stream_config, data_callback, error_callback, None)
        .context("Failed to build input stream")?;

    Ok(stream)
}

fn sample_to_i32<T>(sample: T) -> i32
where
    T: Sample,
    <T as Sample>::Float: Into<f32>,
{
    let f: f32 = sample.to_float_sample().into();
    let clamped = f.clamp(-1.0, 1.0) as f64;
    (clamped * i32::MAX as f64) as i32
}
