pub mod audio;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod speech;
pub mod view;

pub use audio::{ArchiveIndex, AudioArtifact, AudioCapture};
pub use command::{
    Backend, Command, CommandArgs, CommandRegistry, CommandResult, CommandStatus, ListCommand,
    ListenCommand, SpeakCommand, TranscribeCommand,
};
pub use config::Config;
pub use controller::Controller;
pub use error::VoxError;
pub use speech::{HttpSpeechClient, SpeechBackend, SynthesisOptions};
pub use view::{ConsoleView, DialogView, SilentView, View};
