// src/cli/handlers/purge.rs

use crate::{
    cli::{dispatcher::CommandContext, handlers},
    core::errors::{CommandError, CommandResult},
};
use anyhow::Context;
use clap::Parser;
use colored::*;

/// Help text for `rockport help purge`.
pub const HELP: &str = "\
Usage: rockport purge --tree=<tree>

Removes every installed rock from the given tree: the rocks directory and
the Lua and native module directories. The script directory is shared with
other software and is left alone. --tree (or --local) is mandatory.";

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Removes every rock from a tree.")]
struct PurgeArgs {}

/// The handler for the `purge` command.
pub fn handle(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let _purge_args: PurgeArgs = handlers::parse_args(args)?;

    let tree = ctx
        .flags
        .value("tree")
        .ok_or_else(|| CommandError::new("The --tree argument is mandatory, see help."))?;
    println!("Purging rocks from {}...", tree.yellow());

    let config = ctx.config;
    for dir in [
        &config.rocks_dir,
        &config.deploy_lua_dir,
        &config.deploy_lib_dir,
    ] {
        log::debug!("Removing '{}'", dir.display());
        ctx.fs
            .delete(dir)
            .with_context(|| format!("Failed to remove '{}'", dir.display()))?;
    }

    println!("{}", "Tree purged.".green());
    Ok(())
}
