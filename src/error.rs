use std::fmt;

/// Error kinds surfaced by the capture, archive, and speech layers.
///
/// Components return `anyhow::Result` and wrap one of these where the caller
/// needs to distinguish the failure class; handlers downcast with
/// `err.downcast_ref::<VoxError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoxError {
    /// No usable audio input device, or the device refused a stream.
    DeviceUnavailable(String),
    /// File write/read/permission failure.
    Io(String),
    /// A referenced file or directory does not exist.
    NotFound(String),
    /// A WAV header could not be parsed.
    CorruptArtifact(String),
    /// The speech service rejected or failed a request.
    Backend(String),
    /// An operation was invoked before `Controller::init`.
    NotReady,
}

impl fmt::Display for VoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxError::DeviceUnavailable(detail) => {
                write!(f, "audio input device unavailable: {}", detail)
            }
            VoxError::Io(detail) => write!(f, "I/O failure: {}", detail),
            VoxError::NotFound(what) => write!(f, "not found: {}", what),
            VoxError::CorruptArtifact(detail) => {
                write!(f, "unreadable WAV file: {}", detail)
            }
            VoxError::Backend(detail) => write!(f, "speech service failure: {}", detail),
            VoxError::NotReady => write!(f, "controller has not been initialized"),
        }
    }
}

impl std::error::Error for VoxError {}
