//! Terminal front end that drives the dialogue layer.

pub mod output;
mod shell;
mod shell_context;

pub use shell::{run_cli, CliArgs};
pub use shell_context::{CliMode, ShellContext};

use crate::errors::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Invalid input: {0}")]
    Input(String),
}
