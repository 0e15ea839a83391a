// src/models.rs

use crate::constants::{
    DEFAULT_ROCKS_SERVER, HOME_TREE_DIRNAME, SYSTEM_TREE_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// --- TREE DESCRIPTORS (What `rocks_trees` holds in config.toml) ---

/// A tree entry in `rocks_trees`: either a bare path or a named record.
/// Uses `untagged` so both `"/usr/local"` and `{ name = "user", root = "..." }` parse.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TreeSpec {
    /// A tree given only by its root directory.
    Path(PathBuf),
    /// A tree that can be selected by name with `--tree=<name>`.
    Named(NamedTree),
}

impl TreeSpec {
    /// The name of the tree, if it is a named record.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Named(named) => Some(&named.name),
        }
    }
}

/// A named tree record. Only `name` is mandatory at parse time; a missing
/// `root` is reported when the tree is actually selected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct NamedTree {
    /// The name used to select this tree.
    pub name: String,
    /// The root directory of the tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Overrides `<root>/bin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<PathBuf>,
    /// Overrides `<root>/share/lua/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lua_dir: Option<PathBuf>,
    /// Overrides `<root>/lib/lua/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_dir: Option<PathBuf>,
    /// Overrides `<root>/<rocks_subdir>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rocks_dir: Option<PathBuf>,
}

// --- DEPENDENCY MODES ---

/// How dependencies are looked up across the configured trees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepsMode {
    /// Use dependencies found in any configured tree.
    All,
    /// Only use dependencies found in the active tree.
    #[default]
    One,
    /// Use the active tree and any tree listed after it.
    Order,
    /// Ignore dependencies entirely.
    None,
}

impl DepsMode {
    /// Every accepted spelling, in the order shown to users.
    pub const NAMES: [&'static str; 4] = ["all", "one", "order", "none"];

    /// The canonical spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::One => "one",
            Self::Order => "order",
            Self::None => "none",
        }
    }
}

impl FromStr for DepsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "one" => Ok(Self::One),
            "order" => Ok(Self::Order),
            "none" => Ok(Self::None),
            other => Err(format!(
                "Invalid entry for --deps-mode: '{}'. Expected one of: {}.",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for DepsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- EXIT CODES ---

/// Symbolic process outcome. The numeric value comes from [`ExitCodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Success, including `--version` and help output.
    Ok,
    /// Generic failure.
    Unspecified,
    /// The permission check failed.
    PermissionDenied,
    /// A configuration file could not be loaded.
    ConfigFile,
    /// An unexpected fault in a handler or in scheduled cleanup.
    Crash,
}

/// Mapping from [`ErrorCode`] to numeric process exit codes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ExitCodes {
    /// Code for [`ErrorCode::Ok`].
    pub ok: i32,
    /// Code for [`ErrorCode::Unspecified`].
    pub unspecified: i32,
    /// Code for [`ErrorCode::PermissionDenied`].
    pub permission_denied: i32,
    /// Code for [`ErrorCode::ConfigFile`].
    pub config_file: i32,
    /// Code for [`ErrorCode::Crash`].
    pub crash: i32,
}

impl Default for ExitCodes {
    fn default() -> Self {
        Self {
            ok: 0,
            unspecified: 1,
            permission_denied: 2,
            config_file: 3,
            crash: 99,
        }
    }
}

impl ExitCodes {
    /// Returns the numeric exit code for a symbolic outcome.
    pub fn code(&self, code: ErrorCode) -> i32 {
        match code {
            ErrorCode::Ok => self.ok,
            ErrorCode::Unspecified => self.unspecified,
            ErrorCode::PermissionDenied => self.permission_denied,
            ErrorCode::ConfigFile => self.config_file,
            ErrorCode::Crash => self.crash,
        }
    }
}

// --- RESOLVED CONFIGURATION ---

/// The runtime configuration for one invocation.
///
/// Built once by the config loader, mutated by the resolution pipeline through
/// an explicit `&mut`, then handed to command handlers by shared reference.
/// The directory fields at the bottom are derived from the active tree and are
/// never read from a file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The Lua version trees are laid out for (e.g. `5.4`).
    pub lua_version: String,
    /// The rocks directory relative to a tree root. Defaults to `lib/rockport/rocks-<lua_version>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rocks_subdir: Option<String>,
    /// Candidate trees, least specific first. The last one is the default.
    pub rocks_trees: Vec<TreeSpec>,
    /// The tree selected by `--local`. Absent for the superuser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_tree: Option<PathBuf>,
    /// Behave as if `--local` was always given.
    pub local_by_default: bool,
    /// Servers queried for rocks, in priority order.
    pub rocks_servers: Vec<String>,
    /// Restricts source rocks to a single origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_sources_from: Option<String>,
    /// Directory caching downloaded artifacts.
    pub local_cache: PathBuf,
    /// Network timeout in seconds. Fractions are allowed.
    pub connection_timeout: f64,
    /// Dependency lookup mode.
    pub deps_mode: DepsMode,
    /// Source branch used when building from version control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Platform identifiers, most generic first.
    pub platforms: Vec<String>,
    /// Variables available to command handlers for template expansion.
    pub variables: BTreeMap<String, String>,
    /// Numeric values of the symbolic exit codes.
    pub exit_codes: ExitCodes,
    /// Whether `--verbose` was given.
    pub verbose: bool,

    /// The active tree root.
    #[serde(skip_deserializing)]
    pub root_dir: PathBuf,
    /// Where rock manifests and metadata live in the active tree.
    #[serde(skip_deserializing)]
    pub rocks_dir: PathBuf,
    /// Where executables are deployed.
    #[serde(skip_deserializing)]
    pub deploy_bin_dir: PathBuf,
    /// Where pure Lua modules are deployed.
    #[serde(skip_deserializing)]
    pub deploy_lua_dir: PathBuf,
    /// Where native libraries are deployed.
    #[serde(skip_deserializing)]
    pub deploy_lib_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home_tree = default_home_tree();

        let mut rocks_trees = Vec::new();
        if let Some(home) = &home_tree {
            rocks_trees.push(TreeSpec::Named(NamedTree {
                name: "user".to_string(),
                root: Some(home.clone()),
                ..Default::default()
            }));
        }
        rocks_trees.push(TreeSpec::Named(NamedTree {
            name: "system".to_string(),
            root: Some(PathBuf::from(SYSTEM_TREE_PREFIX)),
            ..Default::default()
        }));

        let local_cache = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join(crate::constants::CONFIG_DIR_NAME);

        Self {
            lua_version: "5.4".to_string(),
            rocks_subdir: None,
            rocks_trees,
            home_tree,
            local_by_default: false,
            rocks_servers: vec![DEFAULT_ROCKS_SERVER.to_string()],
            only_sources_from: None,
            local_cache,
            connection_timeout: 30.0,
            deps_mode: DepsMode::default(),
            branch: None,
            platforms: default_platforms(),
            variables: BTreeMap::new(),
            exit_codes: ExitCodes::default(),
            verbose: false,
            root_dir: PathBuf::new(),
            rocks_dir: PathBuf::new(),
            deploy_bin_dir: PathBuf::new(),
            deploy_lua_dir: PathBuf::new(),
            deploy_lib_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// The rocks directory relative to a tree root.
    pub fn rocks_subdir(&self) -> String {
        self.rocks_subdir
            .clone()
            .unwrap_or_else(|| format!("lib/rockport/rocks-{}", self.lua_version))
    }

    /// Finds a tree record by its configured name.
    pub fn named_tree(&self, name: &str) -> Option<&NamedTree> {
        self.rocks_trees.iter().find_map(|tree| match tree {
            TreeSpec::Named(named) if named.name == name => Some(named),
            _ => None,
        })
    }
}

/// The superuser gets no home tree: `--local` is meant for regular users.
fn default_home_tree() -> Option<PathBuf> {
    if crate::system::fs::is_superuser() {
        return None;
    }
    dirs::home_dir().map(|home| home.join(HOME_TREE_DIRNAME))
}

fn default_platforms() -> Vec<String> {
    let mut platforms = Vec::new();
    if cfg!(unix) {
        platforms.push("unix".to_string());
    }
    if cfg!(windows) {
        platforms.push("windows".to_string());
    }
    if cfg!(target_os = "macos") {
        platforms.push("bsd".to_string());
    }
    platforms.push(std::env::consts::OS.to_string());
    platforms
}
