//! User-facing output abstraction.
//!
//! Command handlers report progress and results exclusively through a
//! `View`; swapping the implementation switches the whole front end between
//! the interactive console, blocking modal dialogs, and silent embedded
//! operation without touching any handler.

pub mod console;
pub mod dialog;
pub mod silent;

pub use console::ConsoleView;
pub use dialog::DialogView;
pub use silent::SilentView;

use std::path::Path;

use crate::audio::AudioArtifact;

pub trait View: Send + Sync {
    /// Render the column headers of an archive listing.
    fn samples_header(&self, headers: &[&str]);

    /// Render the rows of an archive listing.
    fn samples_rows(&self, entries: &[AudioArtifact]);

    /// Announce that speech synthesis is in progress.
    fn synthesizing(&self);

    /// Announce that recording is in progress.
    fn recording(&self);

    /// Announce that transcription is in progress.
    fn transcribing(&self);

    /// Render transcribed text.
    fn transcription(&self, text: &str);

    /// Render a successful command outcome with its artifact path.
    fn success(&self, command: &str, artifact: &Path);

    /// Render a command interruption.
    fn interrupted(&self, command: &str);

    /// Render a command failure with its cause.
    fn error(&self, command: &str, cause: &str);

    /// Render a warning that is not tied to a running command.
    fn warn(&self, message: &str);

    /// Ask the user for a tag. `None` means no tag was provided (empty
    /// input, or a front end with nobody to ask).
    fn prompt_tag(&self) -> Option<String>;
}

/// Human-readable file size in megabytes.
pub(crate) fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Duration bucketed into seconds, minutes, or hours.
pub(crate) fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else if secs < 3600.0 {
        format!("{:.2}min", secs / 60.0)
    } else {
        format!("{:.2}h", secs / 3600.0)
    }
}

/// Truncate a file name for a 30-character table column.
pub(crate) fn clip_name(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}
