// src/core/permissions.rs

use crate::constants::TEMP_CACHE_PREFIX;
use crate::core::arg_parser::Flags;
use crate::core::cleanup::CleanupList;
use crate::core::errors::FatalError;
use crate::models::Config;
use crate::system::fs::{FileSystem, SharedFs};
use anyhow::Context;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How many levels (the cache itself, its parent, its grandparent) are
/// inspected when looking for the owner of the cache.
const CACHE_OWNER_DEPTH: usize = 3;

/// A directory the command needs to write into is off limits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The directory exists but is not writable.
    #[error("Your user does not have write permissions in {}", .dir.display())]
    NotWritable {
        /// The directory.
        dir: PathBuf,
    },
    /// The directory is missing and could not be created.
    #[error(
        "{} does not exist and your user does not have write permissions in {}",
        .dir.display(),
        .ancestor.display()
    )]
    AncestorNotWritable {
        /// The missing directory.
        dir: PathBuf,
        /// Its closest existing ancestor (or the filesystem root).
        ancestor: PathBuf,
    },
}

/// Verifies that the active tree's directories are writable, or creatable.
///
/// Nothing is checked when `--pack-binary-rock` is given. The first failure wins.
pub fn check_permissions(
    flags: &Flags,
    config: &Config,
    fs: &dyn FileSystem,
) -> Result<(), PermissionError> {
    if flags.has("pack-binary-rock") {
        log::debug!("Skipping permission checks for --pack-binary-rock");
        return Ok(());
    }

    for dir in [
        &config.rocks_dir,
        &config.deploy_lua_dir,
        &config.deploy_bin_dir,
        &config.deploy_lua_dir,
    ] {
        check_dir(dir, fs)?;
    }
    Ok(())
}

fn check_dir(dir: &Path, fs: &dyn FileSystem) -> Result<(), PermissionError> {
    if fs.exists(dir) {
        if fs.is_writable(dir) {
            return Ok(());
        }
        return Err(PermissionError::NotWritable {
            dir: dir.to_path_buf(),
        });
    }

    let ancestor = closest_existing_ancestor(dir, fs);
    log::debug!(
        "'{}' is missing; checking '{}' instead",
        dir.display(),
        ancestor.display()
    );
    if fs.is_writable(&ancestor) {
        Ok(())
    } else {
        Err(PermissionError::AncestorNotWritable {
            dir: dir.to_path_buf(),
            ancestor,
        })
    }
}

/// Walks up from `dir` to the first existing ancestor, stopping at the root.
fn closest_existing_ancestor(dir: &Path, fs: &dyn FileSystem) -> PathBuf {
    let root = fs.root_of(dir);
    let mut current = dir.to_path_buf();
    loop {
        current = match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => root.clone(),
        };
        if current == root || fs.exists(&current) {
            return current;
        }
    }
}

/// Turns a permission failure into the fatal error the user sees, with advice
/// that depends on whether the local tree is in use.
pub fn denied(error: PermissionError, local: bool) -> FatalError {
    let advice = if local {
        "-- please check your permissions."
    } else {
        "-- you may want to run as a privileged user or use your local tree with --local."
    };
    FatalError::PermissionDenied {
        message: format!("{} {}", error, advice),
    }
}

/// Makes sure the download cache belongs to the current user.
///
/// The owner is taken from the cache, its parent or its grandparent, whichever
/// is found first. If it is somebody else, a private temporary cache is used
/// for this run and its removal is scheduled.
pub fn check_cache_ownership(
    config: &mut Config,
    fs: &SharedFs,
    cleanup: &mut CleanupList,
) -> Result<(), FatalError> {
    let Some(owner) = config
        .local_cache
        .ancestors()
        .take(CACHE_OWNER_DEPTH)
        .find_map(|level| fs.owner(level))
    else {
        log::debug!(
            "Owner of cache '{}' could not be determined",
            config.local_cache.display()
        );
        return Ok(());
    };

    if owner == fs.current_user() {
        return Ok(());
    }

    let temp = fs
        .make_temp_dir(TEMP_CACHE_PREFIX)
        .map_err(|e| FatalError::Io {
            context: "Failed to create a temporary cache directory".to_string(),
            source: e,
        })?;
    log::warn!(
        "The directory '{}' is not owned by the current user. Using a temporary cache at '{}' for this run.",
        config.local_cache.display(),
        temp.display()
    );
    config.local_cache = temp.clone();

    let fs = fs.clone();
    cleanup.schedule(format!("remove {}", temp.display()), move || {
        fs.delete(&temp)
            .with_context(|| format!("Failed to remove temporary cache '{}'", temp.display()))
    });
    Ok(())
}
