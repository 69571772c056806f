//! Execution strategies: plain capture, async launch, and the PTY bridge.
//!
//! Every strategy spawns the configured host shell with `-c <command>` and
//! sets the working directory on the child process object. The engine never
//! interprets shell syntax itself.

pub mod pty;

use crate::classify::{classify, first_token, CommandKind};
use crate::error::ExecError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Injectable command-execution interface consumed by the session.
///
/// `ShellExecutor` is the production implementation; tests substitute a
/// scripted mock without touching the OS.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `command` with `cwd` as the child's working directory.
    ///
    /// An empty `cwd` means "inherit the parent's directory". Returns the
    /// captured combined output; on failure the error carries any partial
    /// output the child produced.
    async fn run(&self, command: &str, cwd: &Path) -> Result<String, ExecError>;
}

/// Executor backed by the host shell (`bash` by default).
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Plain capture: spawn, wait, return combined stdout/stderr verbatim.
    async fn run_plain(&self, command: &str, cwd: &Path) -> Result<String, ExecError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !cwd.as_os_str().is_empty() {
            cmd.current_dir(cwd);
        }

        let out = cmd.output().await.map_err(ExecError::Spawn)?;
        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&out.stderr));

        if out.status.success() {
            Ok(text)
        } else {
            Err(ExecError::Exit {
                status: out.status.code(),
                output: text,
            })
        }
    }

    /// Async launch: spawn and return immediately with a confirmation line.
    ///
    /// The child is intentionally never waited on and must outlive this call,
    /// so `kill_on_drop` stays off. A later failure of the child is not an
    /// error here; only the spawn itself can fail.
    fn launch(&self, command: &str, cwd: &Path) -> Result<String, ExecError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if !cwd.as_os_str().is_empty() {
            cmd.current_dir(cwd);
        }

        cmd.spawn().map_err(ExecError::Spawn)?;
        Ok(format!("[launched {}]\n", first_token(command)))
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn run(&self, command: &str, cwd: &Path) -> Result<String, ExecError> {
        let kind = classify(command);
        debug!(command, ?kind, "dispatching command");
        match kind {
            CommandKind::Async => self.launch(command, cwd),
            CommandKind::Interactive => pty::run_interactive(&self.shell, command, cwd).await,
            CommandKind::Plain => self.run_plain(command, cwd).await,
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("bash")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn executor() -> ShellExecutor {
        ShellExecutor::default()
    }

    #[tokio::test]
    async fn echo_captures_output_with_trailing_newline() {
        let out = executor().run("echo hello world", Path::new("")).await;
        assert_eq!(out.unwrap(), "hello world\n");
    }

    #[tokio::test]
    async fn output_is_not_trimmed() {
        let out = executor().run("printf 'a\\n\\n'", Path::new("")).await;
        assert_eq!(out.unwrap(), "a\n\n");
    }

    #[tokio::test]
    async fn stderr_is_part_of_combined_output() {
        let out = executor()
            .run("echo oops >&2", Path::new(""))
            .await
            .unwrap();
        assert_eq!(out, "oops\n");
    }

    #[tokio::test]
    async fn empty_command_succeeds_with_empty_output() {
        let out = executor().run("", Path::new("")).await;
        assert_eq!(out.unwrap(), "");
    }

    #[tokio::test]
    async fn unknown_command_reports_exit_status_and_keeps_output() {
        let err = executor()
            .run("nonexistentcommand12345", Path::new(""))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exit status"), "got: {msg}");
        assert!(
            err.output().contains("not found") || err.output().contains("nonexistentcommand12345"),
            "got output: {:?}",
            err.output()
        );
    }

    #[tokio::test]
    async fn exit_code_is_preserved() {
        let err = executor().run("exit 3", Path::new("")).await.unwrap_err();
        match err {
            ExecError::Exit { status, .. } => assert_eq!(status, Some(3)),
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn partial_output_survives_failure() {
        let err = executor()
            .run("echo partial && exit 1", Path::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.output(), "partial\n");
    }

    #[tokio::test]
    async fn working_directory_is_applied() {
        let dir = std::env::temp_dir();
        let out = executor().run("pwd", &dir).await.unwrap();
        let reported = PathBuf::from(out.trim());
        // Compare canonicalized paths; temp_dir may be a symlink (macOS).
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn async_launch_returns_immediately() {
        // `open` is in the async set; the inner command would block for a
        // long time if the engine waited on it.
        let started = Instant::now();
        let out = executor()
            .run("open /tmp && sleep 30", Path::new(""))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(out, "[launched open]\n");
    }

    #[tokio::test]
    async fn async_launch_reports_only_spawn_failures() {
        // The shell spawns fine even though the launched program will fail
        // later; that later failure is invisible by design.
        let out = ShellExecutor::default()
            .run("open /definitely/not/a/file", Path::new(""))
            .await;
        assert_eq!(out.unwrap(), "[launched open]\n");
    }

    #[tokio::test]
    async fn missing_shell_binary_is_a_spawn_error() {
        let err = ShellExecutor::new("jib-no-such-shell-xyz")
            .run("echo hi", Path::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn(_)), "got {err:?}");
    }
}
