// src/cli/handlers/help.rs

use crate::{
    cli::{
        dispatcher::{CommandContext, CommandDefinition, find_command},
        handlers,
    },
    constants::{PROGRAM_DESCRIPTION, PROGRAM_NAME, PROGRAM_VERSION},
    core::errors::{CommandError, CommandResult},
    models::Config,
};
use clap::Parser;
use colored::*;

/// Help text for `rockport help help`.
pub const HELP: &str = "\
Usage: rockport help [command]

Without arguments, shows the global flags and every available command.
With a command name, shows the help of that command.";

/// Global flags, shown in the overview in this order.
const GLOBAL_FLAGS: &[(&str, &str)] = &[
    ("--tree=<tree>", "Use the tree with this name or root path. Alias: --to."),
    ("--local", "Use the tree in the user's home directory."),
    ("--server=<url>", "Fetch rocks from this server first. Alias: --from."),
    ("--only-server=<url>", "Fetch rocks only from this server. Alias: --only-from."),
    ("--only-sources=<url>", "Restrict source rocks to this origin. Alias: --only-sources-from."),
    ("--dev", "Also use the development variant of every server."),
    ("--deps-mode=<mode>", "How dependencies are looked up: all, one, order or none."),
    ("--nodeps", "Ignore dependencies. Same as --deps-mode=none."),
    ("--branch=<name>", "Source branch used when building from version control."),
    ("--timeout=<secs>", "Network timeout in seconds."),
    ("--verbose", "Show what the resolution steps are doing."),
    ("--version", "Show the version and exit."),
    ("--help", "Show this help."),
];

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Shows help for rockport or for one command.")]
struct HelpArgs {
    /// The command to describe.
    command: Option<String>,
}

/// The handler for the `help` command.
pub fn handle(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let help_args: HelpArgs = handlers::parse_args(args)?;

    let text = match help_args.command {
        None => render_overview(ctx.registry, ctx.config),
        Some(name) => {
            let normalized = name.replace('-', "_");
            let command = find_command(ctx.registry, &normalized)
                .ok_or_else(|| CommandError::new(format!("Unknown command: {}", name)))?;
            render_command(command)
        }
    };
    print!("{}", text);
    Ok(())
}

/// Renders the general usage page.
fn render_overview(registry: &[CommandDefinition], config: &Config) -> String {
    let mut out = format!(
        "{} {}\n{}\n\n{} {} [--flags] [VAR=VALUE]... <command> [args]\n",
        PROGRAM_NAME.bold(),
        PROGRAM_VERSION,
        PROGRAM_DESCRIPTION,
        "Usage:".yellow().bold(),
        PROGRAM_NAME
    );

    out.push_str(&format!("\n{}\n", "Global flags:".yellow().bold()));
    for (flag, description) in GLOBAL_FLAGS {
        out.push_str(&format!("  {:<24}{}\n", flag.cyan(), description));
    }

    out.push_str(&format!("\n{}\n", "Variables:".yellow().bold()));
    out.push_str("  VAR=VALUE arguments are available to commands as configuration variables.\n");

    out.push_str(&format!("\n{}\n", "Commands:".yellow().bold()));
    for command in registry {
        out.push_str(&format!(
            "  {:<12}{}\n",
            command.name.replace('_', "-").cyan(),
            command.summary
        ));
    }

    out.push_str(&format!("\n{}\n", "Configuration:".yellow().bold()));
    out.push_str(&format!("  Lua version: {}\n", config.lua_version));
    out.push_str(&format!("  Active tree: {}\n", config.root_dir.display()));
    if let Some(home) = &config.home_tree {
        out.push_str(&format!("  Home tree:   {}\n", home.display()));
    }
    out.push_str(&format!("  Servers:     {}\n", config.rocks_servers.join(", ")));
    out.push_str(&format!(
        "\nSee '{} help <command>' for more information on a command.\n",
        PROGRAM_NAME
    ));
    out
}

/// Renders one command's help.
fn render_command(command: &CommandDefinition) -> String {
    format!(
        "{} {}\n\n{}\n",
        command.name.replace('_', "-").bold(),
        command.summary,
        command.help
    )
}
