//! Session state: working directory, AI mode, and the confirmation machine.
//!
//! A session is owned exclusively by one REPL run and mutated only through
//! its own operations, so no locking is needed anywhere in the engine.

use crate::agent::Agent;
use crate::confirm::AiState;
use crate::error::{ExecError, ShellError};
use crate::exec::Executor;
use std::path::{Path, PathBuf};

pub struct Session {
    /// Absolute working directory applied to every spawned command.
    cwd: PathBuf,
    /// When set, non-built-in lines are routed to the assistant by default.
    pub ai_enabled: bool,
    /// Confirmation machine state for AI-proposed commands.
    pub ai: AiState,
    executor: Box<dyn Executor>,
    agent: Option<Box<dyn Agent>>,
}

impl Session {
    /// Create a session rooted at the process's current directory.
    pub fn new(
        executor: Box<dyn Executor>,
        agent: Option<Box<dyn Agent>>,
    ) -> Result<Self, ShellError> {
        let cwd = std::env::current_dir()?;
        Ok(Self {
            cwd,
            ai_enabled: false,
            ai: AiState::Idle,
            executor,
            agent,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn agent(&self) -> Option<&dyn Agent> {
        self.agent.as_deref()
    }

    /// Change the session's working directory.
    ///
    /// `""` and `"~"` resolve to the home directory, `"~/rest"` joins onto
    /// it, and anything else is taken as given (relative paths resolve
    /// against the current session directory). The OS-level directory change
    /// is performed and the stored cwd re-read as an absolute, resolved path.
    /// On failure the stored cwd is left untouched and the original error
    /// surfaces unchanged.
    pub fn change_dir(&mut self, path: &str) -> Result<(), ShellError> {
        let target = if path.is_empty() || path == "~" {
            home_dir()?
        } else if let Some(rest) = path.strip_prefix("~/") {
            home_dir()?.join(rest)
        } else {
            let p = Path::new(path);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                self.cwd.join(p)
            }
        };

        std::env::set_current_dir(&target)?;
        self.cwd = std::env::current_dir()?;
        Ok(())
    }

    /// Run a command with the session's current working directory.
    ///
    /// Running a command never mutates session state: a child that invokes
    /// `cd` internally changes only its own process, not this session.
    pub async fn run(&self, command: &str) -> Result<String, ExecError> {
        self.executor.run(command, &self.cwd).await
    }
}

fn home_dir() -> Result<PathBuf, ShellError> {
    dirs::home_dir().ok_or(ShellError::NoHomeDir)
}
