//! Pseudo-terminal bridge for terminal-bound programs.
//!
//! The bridge spawns the command inside a PTY, puts the controlling terminal
//! into raw mode for the duration, and relays bytes in both directions until
//! the child exits. Window-size changes are forwarded to the PTY for the
//! lifetime of the bridge only, with one synthetic resize right after spawn
//! so a change that predates the bridge is not lost.

use crate::error::ExecError;
use crossterm::terminal;
use portable_pty::{native_pty_system, Child, CommandBuilder, PtySize};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::Path;
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::debug;

/// Restores the terminal's prior mode when dropped.
///
/// Restoration must happen on every exit path of the bridge; leaving the
/// terminal raw breaks the user's shell.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, ExecError> {
        terminal::enable_raw_mode()
            .map_err(|e| ExecError::Terminal(format!("enter raw mode: {e}")))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            // Not silently swallowed: a failed restore leaves the terminal
            // unusable, so at least say so.
            eprintln!("jib: failed to restore terminal mode: {e}");
        }
    }
}

fn current_size() -> PtySize {
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// Kill and wait a child that will never reach the normal wait path, so it
/// cannot linger as a zombie.
fn reap(child: &mut (dyn Child + Send + Sync)) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Relay bytes from `source` into the child's input until torn down or EOF.
///
/// Readiness is awaited through the reactor before every read, so the task
/// never parks inside a blocking read; `abort()` on the returned handle tears
/// it down deterministically, and input arriving after teardown stays unread
/// for whoever reads the source next. Keyboard input arrives well below the
/// buffer size, so one read per readiness event is enough.
fn spawn_input_pump<R>(
    source: R,
    mut writer: Box<dyn Write + Send>,
) -> std::io::Result<JoinHandle<()>>
where
    R: AsRawFd + Send + Sync + 'static,
    for<'a> &'a R: Read,
{
    let fd = AsyncFd::with_interest(source, Interest::READABLE)?;
    Ok(tokio::spawn(async move {
        let mut buf = [0u8; 8192];
        loop {
            let mut guard = match fd.readable().await {
                Ok(guard) => guard,
                Err(_) => return,
            };
            let mut src = fd.get_ref();
            match src.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => {
                    if writer.write_all(&buf[..n]).is_err() || writer.flush().is_err() {
                        return;
                    }
                }
            }
            guard.clear_ready();
        }
    }))
}

/// Bridge `shell -c command` through a freshly allocated PTY.
///
/// Blocks the dispatch loop until the child exits, by design. Returns empty
/// captured output; everything the child wrote already went straight to the
/// terminal.
pub async fn run_interactive(shell: &str, command: &str, cwd: &Path) -> Result<String, ExecError> {
    let pty = native_pty_system();
    let pair = pty
        .openpty(current_size())
        .map_err(|e| ExecError::Terminal(format!("openpty: {e}")))?;

    let mut winch = signal(SignalKind::window_change())
        .map_err(|e| ExecError::Terminal(format!("SIGWINCH listener: {e}")))?;

    let mut builder = CommandBuilder::new(shell);
    builder.arg("-c");
    builder.arg(command);
    if !cwd.as_os_str().is_empty() {
        builder.cwd(cwd);
    }

    let mut child = pair
        .slave
        .spawn_command(builder)
        .map_err(|e| ExecError::Spawn(std::io::Error::other(e.to_string())))?;
    // The child holds its own slave handles; dropping ours lets the reader
    // observe EOF once the child is gone.
    drop(pair.slave);

    let master = pair.master;
    let mut reader = match master.try_clone_reader() {
        Ok(reader) => reader,
        Err(e) => {
            reap(child.as_mut());
            return Err(ExecError::Terminal(format!("pty reader: {e}")));
        }
    };
    let writer = match master.take_writer() {
        Ok(writer) => writer,
        Err(e) => {
            reap(child.as_mut());
            return Err(ExecError::Terminal(format!("pty writer: {e}")));
        }
    };

    let raw = match RawModeGuard::enter() {
        Ok(raw) => raw,
        Err(e) => {
            reap(child.as_mut());
            return Err(e);
        }
    };
    debug!(command, "pty bridge started");

    // Terminal -> child.
    let input_pump = match spawn_input_pump(std::io::stdin(), writer) {
        Ok(handle) => handle,
        Err(e) => {
            drop(raw);
            reap(child.as_mut());
            return Err(ExecError::Terminal(format!("stdin watch: {e}")));
        }
    };

    // Child -> terminal. Ends at EOF when the last slave handle closes.
    let output_pump = tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout();
        let _ = std::io::copy(&mut reader, &mut stdout);
        let _ = stdout.flush();
    });

    // Synthetic initial resize: replay whatever size the terminal had before
    // the bridge existed.
    let _ = master.resize(current_size());

    let mut wait = tokio::task::spawn_blocking(move || child.wait());
    let status = loop {
        tokio::select! {
            res = &mut wait => break res,
            _ = winch.recv() => {
                let _ = master.resize(current_size());
            }
        }
    };
    // `winch` drops here with the bridge, unsubscribing the resize listener.

    // Stop relaying input first so keystrokes after the child's exit reach
    // the next prompt instead of the dead PTY.
    input_pump.abort();
    let _ = output_pump.await;
    drop(master);
    drop(raw);

    let status = match status {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => return Err(ExecError::Terminal(format!("wait: {e}"))),
        Err(e) => return Err(ExecError::Terminal(format!("bridge task: {e}"))),
    };
    debug!(command, code = status.exit_code(), "pty bridge ended");

    if status.success() {
        Ok(String::new())
    } else {
        Err(ExecError::Exit {
            status: Some(status.exit_code() as i32),
            output: String::new(),
        })
    }
}
