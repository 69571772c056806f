//! CLI entry point for jib.

mod cli;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use jib::agent::{Agent, OpenAiAgent};
use jib::build_info;
use jib::config::{load_config, Config};
use jib::editor::Editor;
use jib::exec::{Executor, ShellExecutor};
use jib::prompt::error_message;
use jib::repl::{run_from_reader, run_with_editor, Style};
use jib::session::Session;
use std::io::{self, IsTerminal, Write};
use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing();
    debug!(
        version = build_info::VERSION,
        commit = build_info::GIT_COMMIT,
        "starting jib"
    );

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("jib: {e}");
            std::process::exit(1);
        }
    };

    let color = !args.no_color && io::stdout().is_terminal();
    let style = Style {
        color,
        colors: config.colors.clone(),
    };

    let alt_screen =
        args.alt_screen || std::env::var("JIB_ALT_SCREEN").ok().as_deref() == Some("1");
    if alt_screen {
        enter_alt_screen();
        spawn_alt_screen_signal_guard();
    }

    let code = run(args, config, &style).await;

    if alt_screen {
        leave_alt_screen();
        // Leave the caller's shell prompt on a fresh line.
        println!();
    }
    std::process::exit(code);
}

async fn run(args: cli::Args, config: Config, style: &Style) -> i32 {
    let executor = ShellExecutor::new(config.shell.clone());

    // One-shot mode: join argv words into a single shell command line.
    if !args.command.is_empty() {
        let command = match shlex::try_join(args.command.iter().map(String::as_str)) {
            Ok(c) => c,
            Err(e) => {
                eprint!("{}", error_message(&e, &style.colors, style.color));
                return 1;
            }
        };
        let cwd = std::env::current_dir().unwrap_or_default();
        return match executor.run(&command, &cwd).await {
            Ok(output) => {
                print!("{output}");
                let _ = io::stdout().flush();
                0
            }
            Err(e) => {
                print!("{}", e.output());
                let _ = io::stdout().flush();
                eprint!("{}", error_message(&e, &style.colors, style.color));
                1
            }
        };
    }

    // Interactive session.
    let agent: Box<dyn Agent> = Box::new(OpenAiAgent::new(&config.agent));
    let mut session = match Session::new(Box::new(executor), Some(agent)) {
        Ok(s) => s,
        Err(e) => {
            eprint!("{}", error_message(&e, &style.colors, style.color));
            return 1;
        }
    };

    let result = if io::stdin().is_terminal() {
        let mut editor = Editor::new();
        run_with_editor(&mut session, &mut editor, style).await
    } else {
        // Piped input: read plain lines, mirror prompts to stdout.
        let stdin = io::stdin();
        let mut out = io::stdout();
        let mut err_out = io::stderr();
        run_from_reader(&mut session, stdin.lock(), &mut out, &mut err_out, style).await
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprint!("{}", error_message(&e, &style.colors, style.color));
            1
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("JIB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn enter_alt_screen() {
    if io::stdout().is_terminal() {
        let _ = execute!(io::stdout(), EnterAlternateScreen);
    }
}

fn leave_alt_screen() {
    if io::stdout().is_terminal() {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Restore the display on SIGINT/SIGTERM while the alternate screen is up.
///
/// Races with normal shutdown by design; leaving the alternate screen when
/// it is not active is a no-op, so running both paths is safe.
fn spawn_alt_screen_signal_guard() {
    tokio::spawn(async {
        let Ok(mut interrupt) = signal(SignalKind::interrupt()) else {
            return;
        };
        let Ok(mut terminate) = signal(SignalKind::terminate()) else {
            return;
        };
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }
        leave_alt_screen();
        std::process::exit(1);
    });
}
