//! Prompt and message formatting.
//!
//! The engine hands this module a working directory, an AI-mode flag, an
//! optional branch label, and the loaded color config; it gets back display
//! strings. No color decisions are made anywhere else.

use crate::config::{ansi_code, ColorConfig, RESET};
use std::path::Path;

/// Render the shell prompt for the current session state.
pub fn render_prompt(
    cwd: &Path,
    ai_enabled: bool,
    branch: Option<&str>,
    colors: &ColorConfig,
    color: bool,
) -> String {
    let short = shorten_home(cwd);
    let marker = if ai_enabled { "[AI] " } else { "" };

    if !color {
        return match branch {
            Some(b) => format!("{marker}jib:{short} ({b}) > "),
            None => format!("{marker}jib:{short} > "),
        };
    }

    let prompt_color = ansi_code(&colors.prompt);
    let branch_part = match branch {
        Some(b) => format!(" {}({b}){RESET}", ansi_code(&colors.branch)),
        None => String::new(),
    };
    format!("{prompt_color}{marker}jib:{short}{RESET}{branch_part}{prompt_color} > {RESET}")
}

/// Render an error line for the error stream, trailing newline included.
pub fn error_message(err: &dyn std::fmt::Display, colors: &ColorConfig, color: bool) -> String {
    if color {
        format!("{}error: {err}{RESET}\n", ansi_code(&colors.error))
    } else {
        format!("error: {err}\n")
    }
}

/// Render an `[AI]`-tagged informational line, trailing newline included.
pub fn ai_message(text: &str, colors: &ColorConfig, color: bool) -> String {
    if color {
        format!("{}[AI] {text}{RESET}\n", ansi_code(&colors.prompt))
    } else {
        format!("[AI] {text}\n")
    }
}

/// Replace a home-directory prefix with `~`.
fn shorten_home(cwd: &Path) -> String {
    let display = cwd.display().to_string();
    let Some(home) = dirs::home_dir() else {
        return display;
    };
    let home = home.display().to_string();
    match display.strip_prefix(&home) {
        Some("") => "~".to_string(),
        Some(rest) if rest.starts_with('/') => format!("~{rest}"),
        _ => display,
    }
}

/// Remove ANSI SGR escape sequences, for width math and test assertions.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn colors() -> ColorConfig {
        ColorConfig::default()
    }

    #[test]
    fn plain_prompt_shows_directory() {
        let p = render_prompt(Path::new("/tmp"), false, None, &colors(), false);
        assert_eq!(p, "jib:/tmp > ");
    }

    #[test]
    fn ai_mode_adds_marker() {
        let p = render_prompt(Path::new("/tmp"), true, None, &colors(), false);
        assert!(p.starts_with("[AI] jib:"));
    }

    #[test]
    fn branch_is_included_when_known() {
        let p = render_prompt(Path::new("/tmp"), false, Some("main"), &colors(), false);
        assert_eq!(p, "jib:/tmp (main) > ");
    }

    #[test]
    fn colored_prompt_strips_back_to_plain_text() {
        let p = render_prompt(Path::new("/tmp"), false, Some("main"), &colors(), true);
        assert!(p.contains("\x1b["));
        assert_eq!(strip_ansi(&p), "jib:/tmp (main) > ");
    }

    #[test]
    fn home_directory_is_shortened() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let p = render_prompt(&home, false, None, &colors(), false);
        assert_eq!(p, "jib:~ > ");

        let sub = PathBuf::from(format!("{}/projects", home.display()));
        let p = render_prompt(&sub, false, None, &colors(), false);
        assert_eq!(p, "jib:~/projects > ");
    }

    #[test]
    fn sibling_of_home_is_not_shortened() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let sibling = PathBuf::from(format!("{}2", home.display()));
        let p = render_prompt(&sibling, false, None, &colors(), false);
        assert!(!p.contains('~'), "got: {p}");
    }

    #[test]
    fn error_message_carries_color_and_newline() {
        let msg = error_message(&"boom", &colors(), true);
        assert!(msg.ends_with('\n'));
        assert_eq!(strip_ansi(&msg), "error: boom\n");
        assert_eq!(error_message(&"boom", &colors(), false), "error: boom\n");
    }

    #[test]
    fn strip_ansi_removes_sgr_sequences() {
        assert_eq!(strip_ansi("\x1b[36mhi\x1b[0m"), "hi");
        assert_eq!(strip_ansi("plain"), "plain");
    }
}
