// src/cli/dispatcher.rs

use colored::*;

use crate::{
    cli::handlers,
    constants::{HELP_COMMAND, PROGRAM_DESCRIPTION, PROGRAM_NAME, PROGRAM_VERSION},
    core::{
        arg_parser::{self, Flags, ParsedArgs},
        cleanup::CleanupList,
        crash,
        errors::{CommandResult, FatalError},
        options::{self, Invocation},
        permissions, servers, tree_resolver,
    },
    models::{Config, ErrorCode},
    system::fs::SharedFs,
};

// --- Command Definition and Registry ---

/// Everything a handler may look at. Resolution is complete by the time a
/// handler runs, so all of it is read-only.
pub struct CommandContext<'a> {
    /// The resolved configuration.
    pub config: &'a Config,
    /// The global flags, with aliases folded and `tree` recorded.
    pub flags: &'a Flags,
    /// The filesystem collaborator.
    pub fs: &'a SharedFs,
    /// The registry the command was found in.
    pub registry: &'a [CommandDefinition],
}

/// A command handler: receives the context and the command's positional arguments.
pub type Handler = fn(&CommandContext<'_>, &[String]) -> CommandResult;

/// Defines a command, its help and its handler.
pub struct CommandDefinition {
    /// Normalized name (underscores, never hyphens).
    pub name: &'static str,
    /// One line shown in the command list.
    pub summary: &'static str,
    /// Full help text shown by `help <command>`.
    pub help: &'static str,
    /// Whether the tree must be writable before the handler runs.
    pub check_permissions: bool,
    /// The handler.
    pub handler: Handler,
}

/// The commands this binary ships with.
pub static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "help",
        summary: "Show help for rockport or for one command.",
        help: handlers::help::HELP,
        check_permissions: false,
        handler: handlers::help::handle,
    },
    CommandDefinition {
        name: "config",
        summary: "Show the resolved configuration.",
        help: handlers::config::HELP,
        check_permissions: false,
        handler: handlers::config::handle,
    },
    CommandDefinition {
        name: "path",
        summary: "Print shell commands that put the active tree on the search paths.",
        help: handlers::path::HELP,
        check_permissions: false,
        handler: handlers::path::handle,
    },
    CommandDefinition {
        name: "list",
        summary: "List rocks installed in the active tree.",
        help: handlers::list::HELP,
        check_permissions: false,
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "purge",
        summary: "Remove every rock from a tree.",
        help: handlers::purge::HELP,
        check_permissions: true,
        handler: handlers::purge::handle,
    },
];

/// Finds a command definition by its normalized name.
pub fn find_command<'r>(
    registry: &'r [CommandDefinition],
    name: &str,
) -> Option<&'r CommandDefinition> {
    registry.iter().find(|cmd| cmd.name == name)
}

// --- Pipeline ---

/// Runs one invocation from raw arguments to the handler's result.
///
/// # Steps:
/// 1. Extract `NAME=value` assignments, then split flags from positionals.
/// 2. Resolve global options; `--version` stops here.
/// 3. Look the command up.
/// 4. Resolve the tree and the server list, publish command-line variables.
/// 5. Check cache ownership, then tree permissions if the command asks for it.
/// 6. Run the handler, turning a panic into a crash.
pub fn execute(
    raw_args: Vec<String>,
    config: &mut Config,
    fs: &SharedFs,
    cleanup: &mut CleanupList,
    registry: &[CommandDefinition],
) -> Result<(), FatalError> {
    log::debug!("Dispatching args: {:?}", raw_args);

    // 1. Variables and flags.
    let (args, variables) =
        arg_parser::extract_variables(raw_args).map_err(FatalError::usage_with_hint)?;
    let ParsedArgs {
        mut flags,
        positional,
    } = arg_parser::parse_flags(&args).map_err(FatalError::usage_with_hint)?;

    // 2. Global options.
    let invocation = options::resolve_global_options(&mut flags, positional, config)?;
    let (name, command_args) = match invocation {
        Invocation::Version => {
            print_version();
            return Ok(());
        }
        Invocation::Command { name, args } => (name, args),
    };

    // 3. Command lookup.
    let command = find_command(registry, &name)
        .ok_or_else(|| FatalError::usage_with_hint(format!("Unknown command: {}", name)))?;

    // 4. Tree, servers and variables.
    if fs.current_dir().is_none() {
        return Err(FatalError::configuration(format!(
            "Current directory does not exist. Please run {} from an existing directory.",
            PROGRAM_NAME
        )));
    }
    tree_resolver::resolve_tree(&mut flags, config, fs.as_ref())?;
    servers::apply_server_flags(&flags, config)?;
    if command.name != HELP_COMMAND {
        config.variables.extend(variables);
    }

    // 5. Cache and permissions.
    permissions::check_cache_ownership(config, fs, cleanup)?;
    if command.check_permissions {
        permissions::check_permissions(&flags, config, fs.as_ref())
            .map_err(|e| permissions::denied(e, flags.has("local")))?;
    }

    // 6. Handler.
    log::debug!("Running command '{}' with args {:?}", command.name, command_args);
    let context = CommandContext {
        config: &*config,
        flags: &flags,
        fs,
        registry,
    };
    let label = format!("command '{}'", command.name);
    crash::catch(&label, || (command.handler)(&context, &command_args))
        .map_err(FatalError::Crash)??;
    Ok(())
}

/// Runs one invocation and returns the process exit code.
///
/// Errors are printed to stderr. Scheduled cleanup runs exactly once on every
/// path: normally after the pipeline, or from the guard if something unwinds
/// past this frame. A failing cleanup turns the outcome into a crash.
pub fn run(
    raw_args: Vec<String>,
    mut config: Config,
    fs: SharedFs,
    registry: &[CommandDefinition],
) -> i32 {
    let mut cleanup = scopeguard::guard(CleanupList::new(), |mut pending| {
        if let Err(report) = pending.run() {
            report_error(&FatalError::Crash(report));
        }
    });

    let outcome = execute(raw_args, &mut config, &fs, &mut cleanup, registry);
    let mut code = match &outcome {
        Ok(()) => ErrorCode::Ok,
        Err(e) => {
            report_error(e);
            e.code()
        }
    };

    if let Err(report) = cleanup.run() {
        report_error(&FatalError::Crash(report));
        code = ErrorCode::Crash;
    }

    log::debug!("Exiting with {:?}", code);
    config.exit_codes.code(code)
}

fn print_version() {
    println!("{} {}", PROGRAM_NAME, PROGRAM_VERSION);
    println!("{}", PROGRAM_DESCRIPTION);
}

fn report_error(error: &FatalError) {
    eprintln!("\n{}: {}", "Error".red().bold(), error);
}
