//! Lexically shallow command classification.
//!
//! Classification looks only at the first whitespace-delimited token of a
//! command line; arguments, pipes, and quoting are deliberately ignored. The
//! spawned shell owns all real command-language interpretation.

/// Commands that launch detached GUI/editor tooling and must not block the
/// session waiting for them to exit.
pub const ASYNC_COMMANDS: &[&str] = &["idea", "code", "chrome", "open"];

/// Programs that require an attached terminal and get a PTY bridge.
pub const INTERACTIVE_COMMANDS: &[&str] = &[
    "vim", "nano", "less", "more", "man", "ssh", "top", "htop", "nvim", "vi",
];

/// Execution strategy selected for a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Spawn, wait, capture combined output.
    Plain,
    /// Spawn and return immediately without waiting.
    Async,
    /// Bridge a pseudo-terminal until the child exits.
    Interactive,
}

/// Classify a raw command line by its first token.
///
/// Matching is exact against the full token, so `vim file` is interactive
/// while `vimdiff file` is not. The empty command is always `Plain`.
pub fn classify(command: &str) -> CommandKind {
    let Some(first) = command.split_whitespace().next() else {
        return CommandKind::Plain;
    };
    if ASYNC_COMMANDS.contains(&first) {
        return CommandKind::Async;
    }
    if INTERACTIVE_COMMANDS.contains(&first) {
        return CommandKind::Interactive;
    }
    CommandKind::Plain
}

/// First whitespace-delimited token of a command line, for launch messages.
pub fn first_token(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or(command)
}
