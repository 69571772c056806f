//! Jib — an AI-assisted interactive shell.
//!
//! Jib reads a line, classifies it (plain, async launcher, or terminal-bound
//! interactive program), runs it against the host OS through the matching
//! strategy, and renders the result. Lines can also be routed to an AI
//! assistant that proposes shell commands; a proposed command only runs after
//! an explicit yes/no confirmation.
//!
//! # Quick start
//!
//! ```no_run
//! use jib::exec::ShellExecutor;
//! use jib::session::Session;
//!
//! # async fn example() {
//! let mut session = Session::new(Box::new(ShellExecutor::default()), None).unwrap();
//! let output = session.run("echo hello").await.unwrap();
//! assert_eq!(output, "hello\n");
//! # }
//! ```

pub mod agent;
pub mod build_info;
pub mod classify;
pub mod config;
pub mod confirm;
pub mod editor;
pub mod error;
pub mod exec;
pub mod git;
pub mod prompt;
pub mod repl;
pub mod session;
