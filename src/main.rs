use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

use voxarch::{
    CommandArgs, Config, ConsoleView, Controller, DialogView, View,
};

/// Speech capture and transcription archive
#[derive(Parser)]
#[command(name = "voxarch", version, about)]
struct Cli {
    /// Render through modal dialogs instead of the console
    #[arg(long)]
    gui: bool,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Config file (TOML, extension omitted)
    #[arg(long, default_value = "config/voxarch")]
    config: String,

    /// Archive directory override
    #[arg(long)]
    archive: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Convert text to speech
    Speak {
        /// Text to synthesize
        #[arg(long)]
        text: Option<String>,
        /// Tag for the generated audio file
        #[arg(long)]
        tag: Option<String>,
        /// Language for synthesis
        #[arg(long)]
        language: Option<String>,
        /// Voice for synthesis
        #[arg(long)]
        speaker: Option<String>,
    },
    /// Record the microphone until interrupted, then transcribe
    Listen {
        /// Tag for the recorded audio file
        #[arg(long)]
        tag: Option<String>,
        /// Suppress printing the recognized text
        #[arg(long)]
        quiet: bool,
    },
    /// Transcribe an existing audio file
    Transcribe {
        /// Audio file to transcribe
        #[arg(long)]
        path: PathBuf,
        /// Tag under which to archive the transcript
        #[arg(long)]
        tag: Option<String>,
        /// Suppress printing the transcribed text
        #[arg(long)]
        quiet: bool,
    },
    /// List all recorded audio samples
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let mut config = Config::load(&cli.config)?;
    if let Some(archive) = cli.archive {
        config.archive.root = archive;
    }

    let view: Arc<dyn View> = if cli.gui {
        Arc::new(DialogView::new())
    } else {
        Arc::new(ConsoleView::new())
    };

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut controller = Controller::new(view, config);
    controller.init(cli.debug)?;

    let (name, args) = match command {
        CliCommand::Speak {
            text,
            tag,
            language,
            speaker,
        } => (
            "speak",
            CommandArgs {
                text,
                tag,
                language,
                voice: speaker,
                ..CommandArgs::default()
            },
        ),
        CliCommand::Listen { tag, quiet } => (
            "listen",
            CommandArgs {
                tag,
                print: !quiet,
                ..CommandArgs::default()
            },
        ),
        CliCommand::Transcribe { path, tag, quiet } => (
            "transcribe",
            CommandArgs {
                path: Some(path),
                tag,
                print: !quiet,
                ..CommandArgs::default()
            },
        ),
        CliCommand::List => ("list", CommandArgs::default()),
    };

    controller.execute(name, &args).await;

    Ok(())
}
