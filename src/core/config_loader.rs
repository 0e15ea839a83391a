//! # Config Loader
//!
//! Builds the [`Config`] for one invocation from up to two TOML layers: the
//! system-wide file and the user's file. Both are optional. Layers are merged
//! table-by-table (the user layer wins on conflicts) before being deserialized,
//! so a user file only needs to mention the settings it changes. Anything not
//! mentioned by either layer falls back to `Config::default()`.
use crate::core::paths;
use crate::models::{Config, TreeSpec};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Error loading configuration file '{path}': {source}")]
    Read {
        /// The offending file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML.
    #[error("Error parsing configuration file '{path}': {message}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The parser's message.
        message: String,
    },
    /// The merged layers do not describe a valid configuration.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where configuration layers are read from, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// The system-wide file.
    pub system: Option<PathBuf>,
    /// The user's file.
    pub user: Option<PathBuf>,
}

impl ConfigSources {
    /// The standard locations for this host.
    pub fn discover() -> Self {
        Self {
            system: Some(paths::system_config_path()),
            user: paths::user_config_path(),
        }
    }
}

/// Loads, merges and expands the configuration layers.
pub fn load(sources: &ConfigSources) -> Result<Config, ConfigError> {
    let mut merged = toml::Table::new();

    for path in [sources.system.as_deref(), sources.user.as_deref()]
        .into_iter()
        .flatten()
    {
        if let Some(layer) = read_layer(path)? {
            log::debug!("Loaded configuration layer '{}'", path.display());
            merge_tables(&mut merged, layer);
        }
    }

    let mut config: Config = toml::Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Invalid(e.message().to_string()))?;

    expand_config_paths(&mut config)?;
    Ok(config)
}

/// Reads one layer. A missing file is not an error.
fn read_layer(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    toml::from_str::<toml::Table>(&content)
        .map(Some)
        .map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
}

/// Merges `overlay` into `base`. Nested tables merge recursively; any other
/// value in `overlay` replaces the one in `base`.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let toml::Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, toml::Value::Table(incoming));
    }
}

/// Expands `~` and environment variables in every path-valued setting.
fn expand_config_paths(config: &mut Config) -> Result<(), ConfigError> {
    let expand = |path: &Path| -> Result<PathBuf, ConfigError> {
        paths::expand_path(path).map_err(|e| ConfigError::Invalid(e.to_string()))
    };

    config.local_cache = expand(config.local_cache.as_path())?;
    if let Some(home) = &config.home_tree {
        config.home_tree = Some(expand(home.as_path())?);
    }

    for tree in &mut config.rocks_trees {
        match tree {
            TreeSpec::Path(root) => *root = expand(root.as_path())?,
            TreeSpec::Named(named) => {
                for dir in [
                    &mut named.root,
                    &mut named.bin_dir,
                    &mut named.lua_dir,
                    &mut named.lib_dir,
                    &mut named.rocks_dir,
                ] {
                    if let Some(path) = dir {
                        *path = expand(path.as_path())?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DepsMode;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let dir = TempDir::new().unwrap();
        let sources = ConfigSources {
            system: Some(dir.path().join("absent-system.toml")),
            user: Some(dir.path().join("absent-user.toml")),
        };
        let config = load(&sources).unwrap();
        assert_eq!(config.lua_version, "5.4");
        assert_eq!(config.connection_timeout, 30.0);
        assert!(!config.rocks_trees.is_empty());
    }

    #[test]
    fn test_user_layer_overrides_system_layer() {
        let dir = TempDir::new().unwrap();
        let system = write(
            &dir,
            "system.toml",
            r#"
                connection_timeout = 10
                deps_mode = "all"
                rocks_trees = ["/usr"]
                [variables]
                CC = "gcc"
                LD = "ld"
            "#,
        );
        let user = write(
            &dir,
            "user.toml",
            r#"
                connection_timeout = 60
                [variables]
                CC = "clang"
            "#,
        );

        let config = load(&ConfigSources {
            system: Some(system),
            user: Some(user),
        })
        .unwrap();

        assert_eq!(config.connection_timeout, 60.0);
        assert_eq!(config.deps_mode, DepsMode::All);
        assert_eq!(config.rocks_trees, vec![TreeSpec::Path(PathBuf::from("/usr"))]);
        assert_eq!(config.variables.get("CC").map(String::as_str), Some("clang"));
        assert_eq!(config.variables.get("LD").map(String::as_str), Some("ld"));
    }

    #[test]
    fn test_syntax_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        let user = write(&dir, "broken.toml", "connection_timeout = = 3");
        let err = load(&ConfigSources {
            system: None,
            user: Some(user.clone()),
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if *path == user));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_type_error_is_invalid_configuration() {
        let dir = TempDir::new().unwrap();
        let user = write(&dir, "user.toml", r#"connection_timeout = "soon""#);
        let err = load(&ConfigSources {
            system: None,
            user: Some(user),
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_merge_replaces_non_tables() {
        let mut base: toml::Table = toml::from_str("a = [1, 2]\n[t]\nx = 1").unwrap();
        let overlay: toml::Table = toml::from_str("a = [3]\n[t]\ny = 2").unwrap();
        merge_tables(&mut base, overlay);
        assert_eq!(base["a"].as_array().unwrap().len(), 1);
        assert_eq!(base["t"].as_table().unwrap().len(), 2);
    }
}
