// src/core/tree_resolver.rs

use crate::core::arg_parser::Flags;
use crate::core::errors::FatalError;
use crate::core::paths;
use crate::models::{Config, NamedTree, TreeSpec};
use crate::system::fs::FileSystem;
use std::path::{Path, PathBuf};

/// The directories a tree is laid out into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    /// The tree root.
    pub root: PathBuf,
    /// Rock manifests and metadata.
    pub rocks_dir: PathBuf,
    /// Executables.
    pub bin_dir: PathBuf,
    /// Pure Lua modules.
    pub lua_dir: PathBuf,
    /// Native libraries.
    pub lib_dir: PathBuf,
}

impl TreeLayout {
    /// The standard layout under `root`, with any overrides from a named record.
    pub fn new(root: &Path, config: &Config, overrides: Option<&NamedTree>) -> Self {
        let pick = |custom: Option<&PathBuf>, standard: PathBuf| match custom {
            Some(dir) => paths::normalize(dir),
            None => standard,
        };
        let lua = &config.lua_version;

        Self {
            root: root.to_path_buf(),
            rocks_dir: pick(
                overrides.and_then(|t| t.rocks_dir.as_ref()),
                root.join(config.rocks_subdir()),
            ),
            bin_dir: pick(overrides.and_then(|t| t.bin_dir.as_ref()), root.join("bin")),
            lua_dir: pick(
                overrides.and_then(|t| t.lua_dir.as_ref()),
                root.join("share").join("lua").join(lua),
            ),
            lib_dir: pick(
                overrides.and_then(|t| t.lib_dir.as_ref()),
                root.join("lib").join("lua").join(lua),
            ),
        }
    }
}

/// Determines the active tree and publishes its layout into `config`.
///
/// # Precedence:
/// 1. `--tree=<name>` selecting a configured record, or `--tree=<path>`.
/// 2. `--local`, which selects the home tree.
/// 3. The last configured tree.
///
/// An explicit tree clears the `local` switch, and the selected path is
/// recorded in `flags` under `tree` for the first two cases.
pub fn resolve_tree(
    flags: &mut Flags,
    config: &mut Config,
    fs: &dyn FileSystem,
) -> Result<(), FatalError> {
    if let Some(requested) = flags.value("tree").map(str::to_string) {
        let (root, record) = match config.named_tree(&requested) {
            Some(named) => (named_root(named)?, Some(named.clone())),
            None => {
                let absolute = fs.absolute_name(Path::new(&requested)).map_err(|e| {
                    FatalError::Io {
                        context: format!("Cannot resolve tree path '{}'", requested),
                        source: e,
                    }
                })?;
                (absolute, None)
            }
        };
        log::debug!("Using tree '{}' from --tree", root.display());
        let root = use_tree(&root, config, record.as_ref());
        flags.set_value("tree", root.to_string_lossy());
        if flags.remove("local").is_some() {
            log::debug!("Ignoring --local in favour of --tree");
        }
    } else if flags.has("local") {
        let home = config.home_tree.clone().ok_or_else(|| {
            FatalError::configuration(
                "The --local flag is meant for operating in a user's home directory.\n\
                 You are running as a superuser, which is intended for system-wide operation.\n\
                 To force using the superuser's home, use --tree explicitly.",
            )
        })?;
        log::debug!("Using home tree '{}' from --local", home.display());
        let root = use_tree(&home, config, None);
        flags.set_value("tree", root.to_string_lossy());
    } else {
        let last = config.rocks_trees.last().cloned().ok_or_else(|| {
            FatalError::configuration(
                "Configuration error: no rocks trees are configured (rocks_trees is empty).",
            )
        })?;
        let (root, record) = match last {
            TreeSpec::Path(path) => (path, None),
            TreeSpec::Named(named) => (named_root(&named)?, Some(named)),
        };
        log::debug!("Using default tree '{}'", root.display());
        use_tree(&root, config, record.as_ref());
    }

    strip_layout_separators(config);
    config.variables.insert(
        "ROCKS_TREE".to_string(),
        config.rocks_dir.to_string_lossy().into_owned(),
    );
    config.variables.insert(
        "SCRIPTS_DIR".to_string(),
        config.deploy_bin_dir.to_string_lossy().into_owned(),
    );
    Ok(())
}

fn named_root(named: &NamedTree) -> Result<PathBuf, FatalError> {
    named
        .root
        .clone()
        .filter(|root| !root.as_os_str().is_empty())
        .ok_or_else(|| {
            FatalError::configuration(format!(
                "Configuration error: tree '{}' has no 'root' field.",
                named.name
            ))
        })
}

/// Normalizes `root`, makes it the active tree and returns the normalized path.
fn use_tree(root: &Path, config: &mut Config, record: Option<&NamedTree>) -> PathBuf {
    let root = paths::normalize(root);
    let layout = TreeLayout::new(&root, config, record);

    config.root_dir = layout.root;
    config.rocks_dir = layout.rocks_dir;
    config.deploy_bin_dir = layout.bin_dir;
    config.deploy_lua_dir = layout.lua_dir;
    config.deploy_lib_dir = layout.lib_dir;
    root
}

fn strip_layout_separators(config: &mut Config) {
    for dir in [
        &mut config.root_dir,
        &mut config.rocks_dir,
        &mut config.deploy_bin_dir,
        &mut config.deploy_lua_dir,
        &mut config.deploy_lib_dir,
    ] {
        *dir = paths::strip_trailing_separators(dir);
    }
}
