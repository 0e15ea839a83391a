// src/core/errors.rs

use crate::constants::{HELP_COMMAND, PROGRAM_NAME};
use crate::core::config_loader::ConfigError;
use crate::core::crash::CrashReport;
use crate::models::ErrorCode;
use std::fmt;
use std::io;
use thiserror::Error;

/// Every condition that aborts an invocation.
///
/// All of them travel up the pipeline with `?` to a single terminal routine that
/// prints the message, drains scheduled cleanup and maps [`FatalError::code`]
/// to the process exit code.
#[derive(Error, Debug)]
pub enum FatalError {
    /// Malformed arguments, bad flag values, unknown commands.
    #[error("{message}")]
    Usage {
        /// The message shown to the user.
        message: String,
    },
    /// A configuration value that makes the requested operation impossible.
    #[error("{message}")]
    Configuration {
        /// The message shown to the user, including remediation.
        message: String,
    },
    /// A configuration file could not be read or parsed.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),
    /// The current user cannot write where the command needs to write.
    #[error("{message}")]
    PermissionDenied {
        /// The message shown to the user, including remediation.
        message: String,
    },
    /// A command handler reported a failure.
    #[error("{message}")]
    Command {
        /// The handler's message.
        message: String,
        /// The handler's exit code, `Unspecified` when absent.
        code: Option<ErrorCode>,
    },
    /// An unexpected fault in a handler or in scheduled cleanup.
    #[error("{0}")]
    Crash(CrashReport),
    /// A filesystem operation needed by the pipeline itself failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl FatalError {
    /// A usage error with the message as given.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// A usage error that points the user at the help command.
    pub fn usage_with_hint(message: impl fmt::Display) -> Self {
        Self::Usage {
            message: format!(
                "{}\nSee '{} {}' for usage.",
                message, PROGRAM_NAME, HELP_COMMAND
            ),
        }
    }

    /// A configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The symbolic exit code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Usage { .. } | Self::Configuration { .. } | Self::Io { .. } => {
                ErrorCode::Unspecified
            }
            Self::ConfigFile(_) => ErrorCode::ConfigFile,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::Command { code, .. } => code.unwrap_or(ErrorCode::Unspecified),
            Self::Crash(_) => ErrorCode::Crash,
        }
    }
}

/// A failure reported by a command handler: a message and an optional exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    /// The message shown to the user.
    pub message: String,
    /// The exit code to use. `None` means `Unspecified`.
    pub code: Option<ErrorCode>,
}

impl CommandError {
    /// A failure with the default exit code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Sets an explicit exit code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(format!("{:#}", error))
    }
}

impl From<CommandError> for FatalError {
    fn from(error: CommandError) -> Self {
        Self::Command {
            message: error.message,
            code: error.code,
        }
    }
}

/// What every command handler returns.
pub type CommandResult = Result<(), CommandError>;
