//! CLI argument parsing via clap.

use clap::Parser;
use jib::build_info;

/// An AI-assisted shell. With no arguments, starts an interactive session.
#[derive(Debug, Parser)]
#[command(name = "jib", version = &*build_info::cli_version_text().leak())]
pub struct Args {
    /// Command to run one-shot; the words are joined into a single shell
    /// command line.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Path to config file (default: ~/.config/jib/jib.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Run inside the terminal's alternate screen buffer.
    #[arg(long = "alt-screen")]
    pub alt_screen: bool,
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn bare_invocation_has_no_command() {
        let args = Args::parse_from(["jib"]);
        assert!(args.command.is_empty());
        assert!(!args.no_color);
    }

    #[test]
    fn trailing_words_form_the_one_shot_command() {
        let args = Args::parse_from(["jib", "ls", "-la", "/tmp"]);
        assert_eq!(args.command, ["ls", "-la", "/tmp"]);
    }

    #[test]
    fn flags_before_the_command_are_parsed() {
        let args = Args::parse_from(["jib", "--no-color", "echo", "hi"]);
        assert!(args.no_color);
        assert_eq!(args.command, ["echo", "hi"]);
    }

    #[test]
    fn config_path_is_accepted() {
        let args = Args::parse_from(["jib", "-c", "/tmp/jib.toml"]);
        assert_eq!(args.config.as_deref(), Some("/tmp/jib.toml"));
    }
}
