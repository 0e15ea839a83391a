// src/cli/handlers/path.rs

use crate::{
    cli::{dispatcher::CommandContext, handlers},
    core::errors::CommandResult,
    models::Config,
};
use clap::Parser;
use std::env;
use std::path::Path;

/// Help text for `rockport help path`.
pub const HELP: &str = "\
Usage: rockport path [--lr-path | --lr-cpath | --lr-bin] [--append]

Prints shell commands that set LUA_PATH, LUA_CPATH and PATH so that
modules and scripts from the active tree are found. The current values of
those variables are kept, without duplicates.

  --lr-path     Print only the Lua module entries of the tree.
  --lr-cpath    Print only the native module entries of the tree.
  --lr-bin      Print only the script directory of the tree.
  --append      Put the tree's entries after the current ones.";

#[cfg(windows)]
const NATIVE_EXTENSION: &str = "dll";
#[cfg(not(windows))]
const NATIVE_EXTENSION: &str = "so";

#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Prints search path settings for the active tree.")]
struct PathArgs {}

/// The search path entries contributed by one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TreePaths {
    lua_path: String,
    lua_cpath: String,
    bin: String,
}

impl TreePaths {
    fn for_config(config: &Config) -> Self {
        let lua = config.deploy_lua_dir.as_path();
        let lib = config.deploy_lib_dir.as_path();
        Self {
            lua_path: [entry(lua, "?.lua"), entry(lua, "?/init.lua")].join(";"),
            lua_cpath: entry(lib, &format!("?.{}", NATIVE_EXTENSION)),
            bin: config.deploy_bin_dir.display().to_string(),
        }
    }
}

fn entry(dir: &Path, pattern: &str) -> String {
    dir.join(pattern).display().to_string()
}

/// The handler for the `path` command.
pub fn handle(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let _path_args: PathArgs = handlers::parse_args(args)?;
    let tree = TreePaths::for_config(ctx.config);

    if ctx.flags.has("lr-path") {
        println!("{}", tree.lua_path);
        return Ok(());
    }
    if ctx.flags.has("lr-cpath") {
        println!("{}", tree.lua_cpath);
        return Ok(());
    }
    if ctx.flags.has("lr-bin") {
        println!("{}", tree.bin);
        return Ok(());
    }

    let append = ctx.flags.has("append");
    let current = |name: &str| env::var(name).ok();
    print!(
        "{}",
        render_exports(
            &tree,
            current("LUA_PATH").as_deref(),
            current("LUA_CPATH").as_deref(),
            current("PATH").as_deref(),
            append
        )
    );
    Ok(())
}

fn render_exports(
    tree: &TreePaths,
    lua_path: Option<&str>,
    lua_cpath: Option<&str>,
    path: Option<&str>,
    append: bool,
) -> String {
    format!(
        "export LUA_PATH='{}'\nexport LUA_CPATH='{}'\nexport PATH='{}'\n",
        merge(&tree.lua_path, lua_path, ";", append),
        merge(&tree.lua_cpath, lua_cpath, ";", append),
        merge(&tree.bin, path, PATH_SEPARATOR, append),
    )
}

/// Joins the tree's entries with the current ones, keeping the first
/// occurrence of every entry.
fn merge(own: &str, current: Option<&str>, separator: &str, append: bool) -> String {
    let current = current.unwrap_or_default();
    let (first, second) = if append { (current, own) } else { (own, current) };

    let mut seen = Vec::new();
    for part in first.split(separator).chain(second.split(separator)) {
        if !part.is_empty() && !seen.contains(&part) {
            seen.push(part);
        }
    }
    seen.join(separator)
}
