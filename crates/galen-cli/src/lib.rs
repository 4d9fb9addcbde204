//! Galen CLI library.
//!
//! Configuration, on-disk workspace state, command execution, and output
//! formatting for the `galen` binary. Results go to stdout; failures are
//! rendered as `{"error": "<message>"}` with a non-zero exit status.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod workspace;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use workspace::Workspace;
