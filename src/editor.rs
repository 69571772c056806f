//! Interactive line editor over crossterm raw-mode key events.
//!
//! The editor intentionally exposes only the [`LineReader`] contract so the
//! dispatch loop owns routing decisions while this module owns terminal
//! editing mechanics: cursor movement, history recall, and interrupt
//! semantics (Ctrl-C on a non-empty buffer clears it and continues; on an
//! empty buffer it ends the loop).

use crate::prompt::strip_ansi;
use crate::repl::{LineReader, ReadOutcome};
use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use std::path::PathBuf;

const HISTORY_LIMIT: usize = 100;

/// Restores cooked mode on every exit path of a read.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Crossterm-backed line editor with persistent history.
pub struct Editor {
    history: Vec<String>,
    history_path: Option<PathBuf>,
}

impl Editor {
    /// Editor with history persisted at `~/.jib_history`.
    pub fn new() -> Self {
        Self::with_history_path(dirs::home_dir().map(|h| h.join(".jib_history")))
    }

    /// Editor with an explicit (or no) history file.
    pub fn with_history_path(path: Option<PathBuf>) -> Self {
        let history = path
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .map(|text| {
                text.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            history,
            history_path: path,
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Record a submitted line, dropping blanks and immediate duplicates.
    fn remember(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if self.history.last().map(String::as_str) == Some(line) {
            return;
        }
        self.history.push(line.to_string());
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        if let Some(path) = &self.history_path {
            let _ = std::fs::write(path, self.history.join("\n") + "\n");
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-row redraw. Input longer than the terminal width is not wrapped;
/// the cursor column is clamped to the last visible cell.
fn redraw(out: &mut impl Write, prompt: &str, buffer: &[char], cursor: usize) -> io::Result<()> {
    let text: String = buffer.iter().collect();
    out.queue(MoveToColumn(0))?
        .queue(Clear(ClearType::CurrentLine))?
        .queue(Print(prompt))?
        .queue(Print(&text))?;
    let width = terminal::size().map(|(cols, _)| cols).unwrap_or(u16::MAX);
    let col = strip_ansi(prompt).chars().count() + cursor;
    let col = u16::try_from(col)
        .unwrap_or(u16::MAX)
        .min(width.saturating_sub(1));
    out.queue(MoveToColumn(col))?;
    out.flush()
}

impl LineReader for Editor {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        let _raw = RawModeGuard::enter()?;
        let mut out = io::stdout();

        let mut buffer: Vec<char> = Vec::new();
        let mut cursor = 0usize; // char index into `buffer`
        let mut history_index: Option<usize> = None;
        let mut stash = String::new();

        redraw(&mut out, prompt, &buffer, cursor)?;

        loop {
            let ev = event::read()?;
            let key = match ev {
                Event::Key(key)
                    if key.kind == KeyEventKind::Press || key.kind == KeyEventKind::Repeat =>
                {
                    key
                }
                Event::Resize(..) => {
                    redraw(&mut out, prompt, &buffer, cursor)?;
                    continue;
                }
                _ => continue,
            };

            match key.code {
                KeyCode::Enter => {
                    out.queue(Print("\r\n"))?;
                    out.flush()?;
                    let line: String = buffer.iter().collect();
                    self.remember(&line);
                    return Ok(ReadOutcome::Line(line));
                }
                KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if buffer.is_empty() {
                        out.queue(Print("\r\n"))?;
                        out.flush()?;
                        return Ok(ReadOutcome::Eof);
                    }
                    if cursor < buffer.len() {
                        buffer.remove(cursor);
                    }
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    out.queue(Print("^C\r\n"))?;
                    out.flush()?;
                    if buffer.is_empty() {
                        return Ok(ReadOutcome::Cancelled);
                    }
                    // Non-empty buffer: drop the draft and keep reading.
                    buffer.clear();
                    cursor = 0;
                    history_index = None;
                }
                KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    cursor = 0;
                }
                KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    cursor = buffer.len();
                }
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.drain(..cursor);
                    cursor = 0;
                }
                KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.truncate(cursor);
                }
                KeyCode::Up => {
                    let len = self.history.len();
                    if len == 0 {
                        continue;
                    }
                    let next = match history_index {
                        None => {
                            stash = buffer.iter().collect();
                            len - 1
                        }
                        Some(0) => 0,
                        Some(i) => i - 1,
                    };
                    history_index = Some(next);
                    buffer = self.history[next].chars().collect();
                    cursor = buffer.len();
                }
                KeyCode::Down => {
                    let Some(i) = history_index else { continue };
                    if i + 1 < self.history.len() {
                        history_index = Some(i + 1);
                        buffer = self.history[i + 1].chars().collect();
                    } else {
                        history_index = None;
                        buffer = stash.chars().collect();
                    }
                    cursor = buffer.len();
                }
                KeyCode::Left => cursor = cursor.saturating_sub(1),
                KeyCode::Right => {
                    if cursor < buffer.len() {
                        cursor += 1;
                    }
                }
                KeyCode::Home => cursor = 0,
                KeyCode::End => cursor = buffer.len(),
                KeyCode::Backspace => {
                    if cursor > 0 {
                        buffer.remove(cursor - 1);
                        cursor -= 1;
                    }
                }
                KeyCode::Delete => {
                    if cursor < buffer.len() {
                        buffer.remove(cursor);
                    }
                }
                KeyCode::Char(ch) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        || key.modifiers.contains(KeyModifiers::ALT)
                    {
                        continue;
                    }
                    buffer.insert(cursor, ch);
                    cursor += 1;
                }
                _ => {}
            }

            redraw(&mut out, prompt, &buffer, cursor)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_history_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("jib-history-{tag}-{}", std::process::id()))
    }

    #[test]
    fn history_round_trips_through_the_file() {
        let path = temp_history_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let mut editor = Editor::with_history_path(Some(path.clone()));
        editor.remember("echo one");
        editor.remember("echo two");

        let reloaded = Editor::with_history_path(Some(path.clone()));
        assert_eq!(reloaded.history(), ["echo one", "echo two"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn blanks_and_consecutive_duplicates_are_dropped() {
        let mut editor = Editor::with_history_path(None);
        editor.remember("ls");
        editor.remember("ls");
        editor.remember("   ");
        editor.remember("pwd");
        assert_eq!(editor.history(), ["ls", "pwd"]);
    }

    #[test]
    fn history_is_capped() {
        let mut editor = Editor::with_history_path(None);
        for i in 0..(HISTORY_LIMIT + 20) {
            editor.remember(&format!("cmd {i}"));
        }
        assert_eq!(editor.history().len(), HISTORY_LIMIT);
        assert_eq!(editor.history()[0], "cmd 20");
    }

    #[test]
    fn redraw_clamps_cursor_column_for_oversized_input() {
        let buffer = vec!['x'; 70_000];
        let mut out = Vec::new();
        redraw(&mut out, "> ", &buffer, buffer.len()).unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn missing_history_file_yields_empty_history() {
        let editor = Editor::with_history_path(Some(temp_history_path("missing")));
        assert!(editor.history().is_empty());
    }
}
