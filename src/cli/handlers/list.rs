// src/cli/handlers/list.rs

use crate::{
    cli::{dispatcher::CommandContext, handlers},
    core::errors::CommandResult,
};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Help text for `rockport help list`.
pub const HELP: &str = "\
Usage: rockport list [filter] [--porcelain]

Lists the rocks installed in the active tree. A rock is a directory
<rocks_dir>/<name>/<version>.

  filter        Only show rocks whose name contains this text.
  --porcelain   One tab-separated line per rock: name, version, status, tree.";

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists installed rocks.")]
struct ListArgs {
    /// Substring the rock name must contain (case-insensitive).
    filter: Option<String>,
}

/// One installed version of a rock.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct InstalledRock {
    name: String,
    version: String,
    location: PathBuf,
}

/// The handler for the `list` command.
pub fn handle(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let list_args: ListArgs = handlers::parse_args(args)?;
    let rocks = scan_rocks(&ctx.config.rocks_dir, list_args.filter.as_deref());
    log::debug!(
        "Found {} rock version(s) in '{}'",
        rocks.len(),
        ctx.config.rocks_dir.display()
    );

    let text = if ctx.flags.has("porcelain") {
        render_porcelain(&rocks, &ctx.config.root_dir)
    } else {
        render_listing(&rocks, &ctx.config.lua_version, &ctx.config.root_dir)
    };
    print!("{}", text);
    Ok(())
}

/// Collects `<rocks_dir>/<name>/<version>` directories, sorted by name then version.
/// A missing rocks directory means nothing is installed.
fn scan_rocks(rocks_dir: &Path, filter: Option<&str>) -> Vec<InstalledRock> {
    let filter = filter.map(str::to_lowercase);
    let mut rocks: Vec<InstalledRock> = WalkDir::new(rocks_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let version = entry.file_name().to_string_lossy().into_owned();
            let name = entry
                .path()
                .parent()?
                .file_name()?
                .to_string_lossy()
                .into_owned();
            Some(InstalledRock {
                name,
                version,
                location: entry.into_path(),
            })
        })
        .filter(|rock| {
            filter
                .as_deref()
                .is_none_or(|wanted| rock.name.to_lowercase().contains(wanted))
        })
        .collect();
    rocks.sort();
    rocks
}

fn render_listing(rocks: &[InstalledRock], lua_version: &str, tree: &Path) -> String {
    let title = format!("Rocks installed for Lua {} in {}", lua_version, tree.display());
    let mut out = format!("\n{}\n{}\n\n", title.yellow().bold(), "-".repeat(title.len()));

    if rocks.is_empty() {
        out.push_str("No rocks installed.\n");
        return out;
    }

    let mut current: Option<&str> = None;
    for rock in rocks {
        if current != Some(rock.name.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{}\n", rock.name.cyan().bold()));
            current = Some(rock.name.as_str());
        }
        out.push_str(&format!(
            "   {} (installed) - {}\n",
            rock.version,
            rock.location.display()
        ));
    }
    out
}

fn render_porcelain(rocks: &[InstalledRock], tree: &Path) -> String {
    rocks
        .iter()
        .map(|rock| format!("{}\t{}\tinstalled\t{}\n", rock.name, rock.version, tree.display()))
        .collect()
}
