use std::io::{self, BufRead, Write};
use std::path::Path;

use super::{clip_name, format_duration, format_size, View};
use crate::audio::AudioArtifact;

const RULE_WIDTH: usize = 72;
const NAME_WIDTH: usize = 30;

/// Interactive terminal renderer: immediate prints, blocking line prompts.
pub struct ConsoleView;

impl ConsoleView {
    pub fn new() -> Self {
        Self
    }

    fn rule(&self) {
        println!("{}", "=".repeat(RULE_WIDTH));
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for ConsoleView {
    fn samples_header(&self, headers: &[&str]) {
        self.rule();
        let mut line = String::new();
        for (i, header) in headers.iter().enumerate() {
            if i == 0 {
                line.push_str(&format!("{:<width$}", header, width = NAME_WIDTH));
            } else if i <= 2 {
                line.push_str(&format!(" {:>10}", header));
            } else {
                line.push_str(&format!(" {:>8}", header));
            }
        }
        println!("{}", line);
        self.rule();
    }

    fn samples_rows(&self, entries: &[AudioArtifact]) {
        for entry in entries {
            println!(
                "{:<name$} {:>10} {:>10} {:>8} {:>8}",
                clip_name(&entry.file_name(), NAME_WIDTH),
                format_size(entry.size_bytes),
                format_duration(entry.duration_secs),
                entry.sample_rate,
                entry.bits_per_sample,
                name = NAME_WIDTH,
            );
        }
        self.rule();
    }

    fn synthesizing(&self) {
        println!("🎵 Synthesizing speech... Press Ctrl+C to stop. 🔊");
    }

    fn recording(&self) {
        println!("🎤 Recording in progress... Press Ctrl+C to stop. 🔴");
    }

    fn transcribing(&self) {
        println!("📝 Transcribing audio... Press Ctrl+C to stop. ✏️");
    }

    fn transcription(&self, text: &str) {
        println!("\n❝{}❞\n", text);
    }

    fn success(&self, command: &str, artifact: &Path) {
        println!(
            "✅ Service {} complete. Output saved to: {}",
            title_case(command),
            artifact.display()
        );
    }

    fn interrupted(&self, command: &str) {
        println!("\n⚠️ Service {} interrupted.", title_case(command));
    }

    fn error(&self, command: &str, cause: &str) {
        println!("❌ Error in {}: {}", command, cause);
    }

    fn warn(&self, message: &str) {
        println!("⚠️ {}", message);
    }

    fn prompt_tag(&self) -> Option<String> {
        print!("Name the recording (ENTER for datetime): ");
        if io::stdout().flush().is_err() {
            return None;
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        }
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
