use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audio::AudioCapture;
use crate::command::{Backend, CommandArgs, CommandRegistry, CommandResult};
use crate::config::Config;
use crate::error::VoxError;
use crate::speech::HttpSpeechClient;
use crate::view::View;

/// Binds a view, the capture/speech backend, and the command registry, and
/// routes named commands to their handlers.
///
/// State machine: `new` leaves the controller uninitialized; `init` wires
/// the archive directory and collaborators and moves it to ready. Any
/// `execute` before `init` renders a not-ready error instead of running.
pub struct Controller {
    view: Arc<dyn View>,
    config: Config,
    state: Option<Ready>,
}

struct Ready {
    backend: Backend,
    registry: CommandRegistry,
}

impl Controller {
    pub fn new(view: Arc<dyn View>, config: Config) -> Self {
        Self {
            view,
            config,
            state: None,
        }
    }

    /// Create the archive directory (permissive access, best effort), build
    /// the speech backend and capture device wrapper, and register the
    /// command table.
    pub fn init(&mut self, debug: bool) -> Result<()> {
        if debug {
            debug!("Configuration: {:?}", self.config);
        }

        let root = PathBuf::from(&self.config.archive.root);
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create archive directory {}", root.display()))?;

        // The archive is shared with whatever external tools the user
        // points at it; open it up where the platform lets us.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&root, fs::Permissions::from_mode(0o777)) {
                warn!("Could not set archive permissions: {}", e);
            }
        }

        let speech = HttpSpeechClient::new(self.config.speech.clone())?;
        let capture = AudioCapture::new(self.config.capture.clone());

        self.ready(Backend {
            capture,
            speech: Box::new(speech),
            archive_root: root,
        });

        Ok(())
    }

    /// Wire a custom backend bundle instead of the configured one. Meant
    /// for embedding and tests; `init` uses this internally.
    pub fn ready(&mut self, backend: Backend) {
        info!(
            "Controller ready (archive: {})",
            backend.archive_root.display()
        );
        self.state = Some(Ready {
            backend,
            registry: CommandRegistry::new(),
        });
    }

    /// Route a named command to its handler. Unknown names render a view
    /// warning listing the valid names; the handler's result is returned
    /// uninterpreted.
    pub async fn execute(&self, name: &str, args: &CommandArgs) -> CommandResult {
        let Some(state) = self.state.as_ref() else {
            self.view.error(name, &VoxError::NotReady.to_string());
            return CommandResult::failed();
        };

        match state.registry.get(name) {
            Some(handler) => handler.execute(args, &state.backend, self.view.as_ref()).await,
            None => {
                self.view.warn(&format!(
                    "Command '{}' not found. Must be one of: {}",
                    name,
                    state.registry.names().join(", ")
                ));
                CommandResult::failed()
            }
        }
    }

    /// Registered command names; empty before `init`.
    pub fn services(&self) -> Vec<&'static str> {
        self.state
            .as_ref()
            .map(|s| s.registry.names())
            .unwrap_or_default()
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }
}
