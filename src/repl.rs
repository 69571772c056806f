//! REPL dispatch loop.
//!
//! One strictly sequential loop: read a line, route it (built-in, AI path,
//! or plain run), render the result, refresh the prompt. All errors are
//! recovered here and rendered; only an explicit exit terminates the loop.

use crate::agent::{is_ai_query, strip_ai_prefix};
use crate::config::ColorConfig;
use crate::confirm::{is_affirmative, parse_reply, ParsedReply};
use crate::git;
use crate::prompt::{ai_message, error_message, render_prompt};
use crate::session::Session;
use std::io::{self, BufRead, Write};

/// Display settings threaded through the loop.
#[derive(Debug, Clone)]
pub struct Style {
    pub color: bool,
    pub colors: ColorConfig,
}

/// What the loop should do after a processed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Continue,
    Exit,
}

/// Result of reading one interactive input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// User submitted a full line.
    Line(String),
    /// End-of-input (`Ctrl-D` on an empty buffer / stdin EOF).
    Eof,
    /// Interrupt with an empty buffer; treated as loop termination.
    Cancelled,
}

/// Line-input collaborator: one line per call, prompt supplied by the loop.
///
/// Implemented by the crossterm editor in production and by mocks in tests.
/// An interrupt with a non-empty buffer is handled inside the reader
/// ("ignore and continue"); only the empty-buffer case surfaces here.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;
}

const HELP_TEXT: &str = "Built-in commands:
  cd <dir>     - change directory
  help, ?      - show this help message
  :ai on|off   - toggle AI mode
  exit         - exit the shell

Start a line with '>>' to ask the AI assistant (e.g. '>> how do I list files?').
In AI mode, prefix a line with '!' to force a shell command.
All other input runs as shell commands.";

const EXIT_ALIASES: &[&str] = &["exit", "quit", ":q"];

fn is_exit(line: &str) -> bool {
    let lowered = line.to_ascii_lowercase();
    EXIT_ALIASES.contains(&lowered.as_str())
}

/// Render the prompt for the session's current state.
pub fn prompt_line(session: &Session, style: &Style) -> String {
    let branch = git::current_branch(session.cwd());
    render_prompt(
        session.cwd(),
        session.ai_enabled,
        branch.as_deref(),
        &style.colors,
        style.color,
    )
}

/// Write captured output, supplying a trailing newline when missing.
fn write_output(out: &mut dyn Write, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Handle one input line and report whether the loop should exit.
pub async fn process_line(
    session: &mut Session,
    line: &str,
    out: &mut dyn Write,
    err_out: &mut dyn Write,
    style: &Style,
) -> io::Result<LineAction> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(LineAction::Continue);
    }
    if is_exit(line) {
        return Ok(LineAction::Exit);
    }

    let mut fields = line.split_whitespace();
    let first = fields.next().unwrap_or("");

    if first == "cd" {
        let arg: String = fields.collect::<Vec<_>>().join(" ");
        if let Err(e) = session.change_dir(arg.trim()) {
            err_out.write_all(error_message(&e, &style.colors, style.color).as_bytes())?;
        }
        return Ok(LineAction::Continue);
    }

    if line == "help" || line == "?" {
        writeln!(out, "{HELP_TEXT}")?;
        return Ok(LineAction::Continue);
    }

    if first == ":ai" {
        match (fields.next(), fields.next()) {
            (Some("on"), None) => {
                session.ai_enabled = true;
                writeln!(out, "[AI mode enabled]")?;
            }
            (Some("off"), None) => {
                session.ai_enabled = false;
                writeln!(out, "[AI mode disabled]")?;
            }
            _ => writeln!(out, "Usage: :ai on|off")?,
        }
        return Ok(LineAction::Continue);
    }

    // The confirmation machine intercepts every remaining line while a
    // suggestion is pending, before AI-query recognition can see it.
    if let Some(suggestion) = session.ai.take() {
        if is_affirmative(line) {
            match session.run(&suggestion.command).await {
                Ok(output) => write_output(out, &output)?,
                Err(e) => {
                    write_output(out, e.output())?;
                    out.write_all(
                        ai_message(&format!("error: {e}"), &style.colors, style.color).as_bytes(),
                    )?;
                }
            }
        } else {
            out.write_all(ai_message("Cancelled.", &style.colors, style.color).as_bytes())?;
        }
        return Ok(LineAction::Continue);
    }

    let has_agent = session.agent().is_some();
    if session.ai_enabled && has_agent {
        if let Some(forced) = line.strip_prefix('!') {
            run_command(session, forced.trim(), out, err_out, style).await?;
        } else {
            ai_query(session, strip_ai_prefix(line), out, style).await?;
        }
        return Ok(LineAction::Continue);
    }
    if has_agent && is_ai_query(line) {
        ai_query(session, strip_ai_prefix(line), out, style).await?;
        return Ok(LineAction::Continue);
    }

    run_command(session, line, out, err_out, style).await?;
    Ok(LineAction::Continue)
}

/// Run a shell command and render output/error.
///
/// Partial output is rendered even when the command fails; the error line
/// goes to the error stream with the exit status embedded.
async fn run_command(
    session: &Session,
    command: &str,
    out: &mut dyn Write,
    err_out: &mut dyn Write,
    style: &Style,
) -> io::Result<()> {
    match session.run(command).await {
        Ok(output) => write_output(out, &output),
        Err(e) => {
            write_output(out, e.output())?;
            err_out.write_all(error_message(&e, &style.colors, style.color).as_bytes())
        }
    }
}

/// Send one query to the assistant and route the reply through the
/// confirmation machine.
async fn ai_query(
    session: &mut Session,
    query: &str,
    out: &mut dyn Write,
    style: &Style,
) -> io::Result<()> {
    let reply = match session.agent() {
        Some(agent) => agent.respond(query).await,
        None => return Ok(()),
    };
    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => {
            // Assistant failure: stay Idle, never leave a dangling suggestion.
            out.write_all(
                ai_message(&format!("error: {e}"), &style.colors, style.color).as_bytes(),
            )?;
            return Ok(());
        }
    };

    match parse_reply(&reply) {
        ParsedReply::Info(text) => write_output(out, &text),
        ParsedReply::Suggestion(suggestion) => {
            if !suggestion.explanation.is_empty() {
                out.write_all(
                    ai_message(&suggestion.explanation, &style.colors, style.color).as_bytes(),
                )?;
            }
            writeln!(out, "AI suggests: {}", suggestion.command)?;
            writeln!(out, "Execute this? [y/N]")?;
            session.ai.propose(suggestion);
            Ok(())
        }
    }
}

/// Run the loop over a plain byte stream (piped input, integration tests).
///
/// The prompt is written to `out` before each read so piped transcripts look
/// like interactive ones.
pub async fn run_from_reader<R: BufRead>(
    session: &mut Session,
    input: R,
    out: &mut dyn Write,
    err_out: &mut dyn Write,
    style: &Style,
) -> io::Result<()> {
    out.write_all(prompt_line(session, style).as_bytes())?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let action = process_line(session, &line, out, err_out, style).await?;
        out.write_all(prompt_line(session, style).as_bytes())?;
        out.flush()?;
        if action == LineAction::Exit {
            break;
        }
    }
    Ok(())
}

/// Run the loop against an interactive line reader.
pub async fn run_with_editor(
    session: &mut Session,
    reader: &mut dyn LineReader,
    style: &Style,
) -> io::Result<()> {
    let mut out = io::stdout();
    let mut err_out = io::stderr();
    loop {
        let prompt = prompt_line(session, style);
        match reader.read_line(&prompt)? {
            ReadOutcome::Line(line) => {
                let action =
                    process_line(session, &line, &mut out, &mut err_out, style).await?;
                out.flush()?;
                err_out.flush()?;
                if action == LineAction::Exit {
                    break;
                }
            }
            ReadOutcome::Eof | ReadOutcome::Cancelled => break,
        }
    }
    Ok(())
}
