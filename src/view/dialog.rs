use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

use super::{clip_name, format_duration, format_size, View};
use crate::audio::AudioArtifact;

const NAME_WIDTH: usize = 30;

/// Modal-dialog renderer.
///
/// Every call opens a centered dialog in the alternate screen and blocks
/// until the user dismisses it (Enter/Esc); the tag prompt is a text-input
/// dialog. Terminal state is set up and restored around each dialog so the
/// surrounding shell session is never left in raw mode.
pub struct DialogView {
    // Listing headers arrive in a separate call from the rows; stash them
    // until the rows dialog is shown.
    table_headers: Mutex<Vec<String>>,
}

impl DialogView {
    pub fn new() -> Self {
        Self {
            table_headers: Mutex::new(Vec::new()),
        }
    }

    fn show(&self, title: &str, lines: Vec<String>) {
        if let Err(e) = run_dialog(title, &lines, false) {
            warn!("Dialog rendering failed: {}", e);
        }
    }
}

impl Default for DialogView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for DialogView {
    fn samples_header(&self, headers: &[&str]) {
        let mut stored = self
            .table_headers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stored = headers.iter().map(|h| h.to_string()).collect();
    }

    fn samples_rows(&self, entries: &[AudioArtifact]) {
        let headers = {
            let stored = self
                .table_headers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stored.clone()
        };

        let mut lines = Vec::with_capacity(entries.len() + 1);
        if !headers.is_empty() {
            lines.push(table_line(
                headers.first().map(String::as_str).unwrap_or(""),
                headers.get(1).map(String::as_str).unwrap_or(""),
                headers.get(2).map(String::as_str).unwrap_or(""),
                headers.get(3).map(String::as_str).unwrap_or(""),
                headers.get(4).map(String::as_str).unwrap_or(""),
            ));
        }
        for entry in entries {
            lines.push(table_line(
                &clip_name(&entry.file_name(), NAME_WIDTH),
                &format_size(entry.size_bytes),
                &format_duration(entry.duration_secs),
                &entry.sample_rate.to_string(),
                &entry.bits_per_sample.to_string(),
            ));
        }
        if entries.is_empty() {
            lines.push("(no recordings)".to_string());
        }

        self.show("Audio Samples", lines);
    }

    fn synthesizing(&self) {
        self.show("Synthesizing", vec!["🎵 Synthesizing speech...".to_string()]);
    }

    fn recording(&self) {
        self.show(
            "Recording",
            vec!["🎤 Recording in progress... Press Ctrl+C to stop. 🔴".to_string()],
        );
    }

    fn transcribing(&self) {
        self.show("Transcribing", vec!["📝 Transcribing audio...".to_string()]);
    }

    fn transcription(&self, text: &str) {
        self.show("Transcription", vec![format!("❝{}❞", text)]);
    }

    fn success(&self, command: &str, artifact: &Path) {
        self.show(
            "Success",
            vec![format!(
                "✅ Service {} complete.",
                command
            ),
            format!("Output saved to: {}", artifact.display())],
        );
    }

    fn interrupted(&self, command: &str) {
        self.show(
            "Interrupted",
            vec![format!("⚠️ Service {} interrupted.", command)],
        );
    }

    fn error(&self, command: &str, cause: &str) {
        self.show("Error", vec![format!("❌ Error in {}: {}", command, cause)]);
    }

    fn warn(&self, message: &str) {
        self.show("Warning", vec![format!("⚠️ {}", message)]);
    }

    fn prompt_tag(&self) -> Option<String> {
        match run_dialog(
            "Name the recording",
            &["Enter a tag (leave empty for a datetime tag):".to_string()],
            true,
        ) {
            Ok(Some(tag)) if !tag.is_empty() => Some(tag),
            Ok(_) => None,
            Err(e) => {
                warn!("Tag prompt dialog failed: {}", e);
                None
            }
        }
    }
}

fn table_line(name: &str, size: &str, duration: &str, rate: &str, bits: &str) -> String {
    format!(
        "{:<name$} {:>10} {:>10} {:>8} {:>8}",
        name,
        size,
        duration,
        rate,
        bits,
        name = NAME_WIDTH,
    )
}

/// Run one modal dialog to completion and restore the terminal.
///
/// With `want_input`, typed characters build up an input line and Enter
/// returns it; otherwise Enter simply dismisses. Esc (or Ctrl+C) always
/// dismisses and yields no input.
fn run_dialog(title: &str, lines: &[String], want_input: bool) -> Result<Option<String>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = dialog_loop(&mut terminal, title, lines, want_input);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn dialog_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    title: &str,
    lines: &[String],
    want_input: bool,
) -> Result<Option<String>> {
    let mut input = String::new();

    loop {
        terminal.draw(|f| {
            let field = want_input.then_some(input.as_str());
            draw_dialog(f, title, lines, field);
        })?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Enter => {
                        return Ok(want_input.then(|| input.trim().to_string()));
                    }
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(None);
                    }
                    KeyCode::Backspace if want_input => {
                        input.pop();
                    }
                    KeyCode::Char(c) if want_input => input.push(c),
                    _ => {}
                }
            }
        }
    }
}

fn draw_dialog(f: &mut Frame, title: &str, lines: &[String], input: Option<&str>) {
    // Body lines, plus the input row and its spacer, plus the hint row and
    // its spacer, plus the borders.
    let extra = if input.is_some() { 6 } else { 4 };
    let height = (lines.len() + extra) as u16;
    let area = centered_rect(74, height, f.area());

    let mut text: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();

    if let Some(field) = input {
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::raw("> "),
            Span::styled(
                field.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]));
    }

    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        if input.is_some() {
            "Enter to confirm, Esc to skip"
        } else {
            "Enter or Esc to dismiss"
        },
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));

    let paragraph = Paragraph::new(Text::from(text))
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Center a fixed-height box of the given percentage width.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(r.height)),
            Constraint::Fill(1),
        ])
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
