// src/core/paths.rs

use crate::constants::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILENAME, SYSTEM_CONFIG_PATH};
use anyhow::{Result, anyhow};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Returns the user configuration file: `$ROCKPORT_CONFIG` if set, otherwise
/// `<config_dir>/rockport/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

/// Returns the system-wide configuration file.
pub fn system_config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG_PATH)
}

/// Expands `~` and environment variables in a configured path.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| anyhow!("Failed to expand path '{}': {}", raw, e))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Lexically normalizes a path: drops `.` components, resolves `..` against
/// the preceding component, and collapses duplicate and trailing separators.
/// The filesystem is never consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    // Count of `..` that could not be resolved in a relative path.
    let mut leading_parents = 0usize;
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !path.has_root() {
                    leading_parents += 1;
                }
            }
            Component::Normal(name) => {
                normalized.push(name);
                depth += 1;
            }
        }
    }

    if leading_parents > 0 {
        let mut prefixed: PathBuf = std::iter::repeat_n("..", leading_parents).collect();
        if !normalized.as_os_str().is_empty() {
            prefixed.push(normalized);
        }
        return prefixed;
    }
    if normalized.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    normalized
}

/// Removes trailing path separators, leaving a bare root untouched.
pub fn strip_trailing_separators(path: &Path) -> PathBuf {
    let raw = path.as_os_str().to_string_lossy();
    let trimmed = raw.trim_end_matches(std::path::is_separator);
    if trimmed.is_empty() {
        // "/" or "///": keep a single root.
        return if raw.is_empty() {
            PathBuf::new()
        } else {
            PathBuf::from(std::path::MAIN_SEPARATOR_STR)
        };
    }
    if trimmed.len() == raw.len() {
        return path.to_path_buf();
    }
    PathBuf::from(OsString::from(trimmed))
}

/// Appends a sub-path to a server URL, the way `--dev` derives its servers.
pub fn url_join(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment)
}

/// Splits a server URL into protocol and path. Plain paths use `file`.
pub fn split_url(url: &str) -> (&str, &str) {
    match url.split_once("://") {
        Some((protocol, rest)) if !protocol.is_empty() => (protocol, rest),
        _ => ("file", url),
    }
}
