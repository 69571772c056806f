//! Unified error types for the shell engine.

use std::fmt;

// ---------------------------------------------------------------------------
// ExecError
// ---------------------------------------------------------------------------

/// Errors arising from running a command against the host OS.
#[derive(Debug)]
pub enum ExecError {
    /// The shell process could not be started at all.
    Spawn(std::io::Error),
    /// The child ran but exited non-zero (or was killed by a signal).
    ///
    /// Output already produced by the child is carried along so callers can
    /// render it; it is never discarded on failure.
    Exit {
        /// Exit code, when the child exited normally.
        status: Option<i32>,
        /// Combined stdout/stderr captured before the failure.
        output: String,
    },
    /// PTY allocation or terminal-mode plumbing failed.
    Terminal(String),
}

impl ExecError {
    /// Partial output captured before the failure, if any.
    pub fn output(&self) -> &str {
        match self {
            Self::Exit { output, .. } => output,
            _ => "",
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to start shell: {e}"),
            Self::Exit {
                status: Some(code), ..
            } => write!(f, "exit status {code}"),
            Self::Exit { status: None, .. } => write!(f, "terminated by signal"),
            Self::Terminal(msg) => write!(f, "terminal: {msg}"),
        }
    }
}

impl std::error::Error for ExecError {}

// ---------------------------------------------------------------------------
// AgentError
// ---------------------------------------------------------------------------

/// Errors from the assistant collaborator.
#[derive(Debug)]
pub enum AgentError {
    /// No credential available for the configured provider.
    NotConfigured,
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status or provider-reported error body.
    Api(String),
    /// The reply arrived but could not be decoded.
    MalformedReply(String),
    /// The provider returned no choices.
    EmptyReply,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => {
                write!(
                    f,
                    "AI is not configured. Set OPENAI_API_KEY environment variable"
                )
            }
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Api(msg) => write!(f, "api: {msg}"),
            Self::MalformedReply(msg) => write!(f, "failed to parse assistant reply: {msg}"),
            Self::EmptyReply => write!(f, "assistant returned no response"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ShellError — top-level
// ---------------------------------------------------------------------------

/// Top-level error type for the shell binary boundary.
#[derive(Debug)]
pub enum ShellError {
    Config(ConfigError),
    Exec(ExecError),
    Agent(AgentError),
    Io(std::io::Error),
    /// The user's home directory could not be determined.
    NoHomeDir,
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Exec(e) => write!(f, "{e}"),
            Self::Agent(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::NoHomeDir => write!(f, "could not determine home directory"),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<ConfigError> for ShellError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ExecError> for ShellError {
    fn from(e: ExecError) -> Self {
        Self::Exec(e)
    }
}

impl From<AgentError> for ShellError {
    fn from(e: AgentError) -> Self {
        Self::Agent(e)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_error_embeds_exit_status() {
        let e = ExecError::Exit {
            status: Some(127),
            output: "sh: nope: not found\n".into(),
        };
        assert_eq!(e.to_string(), "exit status 127");
        assert!(e.output().contains("not found"));
    }

    #[test]
    fn signal_exit_has_no_status_code() {
        let e = ExecError::Exit {
            status: None,
            output: String::new(),
        };
        assert_eq!(e.to_string(), "terminated by signal");
    }

    #[test]
    fn spawn_error_mentions_shell() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e = ExecError::Spawn(io_err);
        let s = e.to_string();
        assert!(s.starts_with("failed to start shell:"), "got: {s}");
    }

    #[test]
    fn non_exit_errors_carry_no_output() {
        let e = ExecError::Terminal("openpty failed".into());
        assert_eq!(e.output(), "");
    }

    #[test]
    fn agent_not_configured_names_the_env_var() {
        assert!(AgentError::NotConfigured
            .to_string()
            .contains("OPENAI_API_KEY"));
    }

    #[test]
    fn shell_error_from_exec_error() {
        let e = ShellError::from(ExecError::Exit {
            status: Some(1),
            output: String::new(),
        });
        assert_eq!(e.to_string(), "exit status 1");
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }
}
