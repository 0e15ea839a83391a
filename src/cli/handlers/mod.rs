// src/cli/handlers/mod.rs

// One module per built-in command. Each exposes `HELP` and `handle`.

use crate::core::errors::CommandError;
use clap::Parser;

pub mod config;
pub mod help;
pub mod list;
pub mod path;
pub mod purge;

/// Parses a command's positional arguments with its own clap definition.
/// Global flags never reach here; the dispatcher has already taken them.
pub(crate) fn parse_args<T: Parser>(args: &[String]) -> Result<T, CommandError> {
    T::try_parse_from(args).map_err(|e| CommandError::new(e.to_string().trim_end()))
}
