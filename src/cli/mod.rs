// src/cli/mod.rs

use clap::Parser;
use std::ffi::OsString;

pub mod dispatcher;
pub mod handlers;

/// rockport: install and manage Lua rocks in local and system trees.
///
/// Flag semantics belong to the dispatcher, so clap only collects the raw
/// arguments. Help and version are handled as regular global flags.
#[derive(Parser, Debug)]
#[command(
    name = "rockport",
    about,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Every argument after the program name, untouched.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Captures the arguments of the current process.
    pub fn capture() -> Self {
        Self::capture_from(std::env::args_os())
    }

    /// Captures `args`, the first of which is the program name.
    ///
    /// clap strips the first `--` it sees, so one is placed ahead of the user's
    /// arguments and any `--` the user wrote reaches the dispatcher.
    pub fn capture_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let program = args.next().unwrap_or_else(|| OsString::from("rockport"));
        Self::parse_from(
            std::iter::once(program)
                .chain(std::iter::once(OsString::from("--")))
                .chain(args),
        )
    }

    /// Whether `--verbose` appears before any `--` terminator.
    pub fn wants_verbose(&self) -> bool {
        self.args
            .iter()
            .take_while(|arg| *arg != "--")
            .any(|arg| arg == "--verbose")
    }
}
