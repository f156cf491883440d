use std::collections::HashMap;

use super::handlers::{ListCommand, ListenCommand, SpeakCommand, TranscribeCommand};
use super::Command;

/// Immutable name → handler table, built once at init.
///
/// The table is spelled out explicitly; adding a command means adding a
/// handler type and one line here.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let handlers: Vec<Box<dyn Command>> = vec![
            Box::new(ListCommand),
            Box::new(SpeakCommand),
            Box::new(ListenCommand::new()),
            Box::new(TranscribeCommand),
        ];

        let mut commands = HashMap::with_capacity(handlers.len());
        for handler in handlers {
            let replaced = commands.insert(handler.name(), handler);
            debug_assert!(replaced.is_none(), "duplicate command name");
        }

        Self { commands }
    }

    /// Look up a handler by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        let canonical = name.to_ascii_lowercase();
        self.commands.get(canonical.as_str()).map(|b| b.as_ref())
    }

    /// Registered command names, sorted for help text.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
