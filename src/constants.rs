// src/constants.rs

/// The program name, as shown by `--version` and in help output.
pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// The program version.
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-line description printed under the version banner.
pub const PROGRAM_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Where crash reports should be filed.
pub const BUG_REPORT_URL: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "/issues");

/// The name of the configuration directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "rockport";

/// The name of the configuration file, both system-wide and per user.
pub const CONFIG_FILENAME: &str = "config.toml";

/// The system-wide configuration file, loaded before the user's file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/rockport/config.toml";

/// Environment variable that points at an alternative user configuration file.
pub const CONFIG_ENV_VAR: &str = "ROCKPORT_CONFIG";

/// The name of the per-user tree directory inside the home directory.
pub const HOME_TREE_DIRNAME: &str = ".rockport";

/// The prefix of the default system-wide tree.
pub const SYSTEM_TREE_PREFIX: &str = "/usr/local";

/// The server queried when no configuration overrides the list.
pub const DEFAULT_ROCKS_SERVER: &str = "https://luarocks.org";

/// The name of the pseudo-command that renders help.
pub const HELP_COMMAND: &str = "help";

/// Prefix used for the temporary cache created when the configured one is not trusted.
pub const TEMP_CACHE_PREFIX: &str = "local_cache";
