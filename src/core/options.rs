// src/core/options.rs

use crate::constants::HELP_COMMAND;
use crate::core::arg_parser::Flags;
use crate::core::errors::FatalError;
use crate::models::{Config, DepsMode};

/// Aliases folded into their canonical flag before anything reads the flags.
const FLAG_ALIASES: &[(&str, &str)] = &[
    ("from", "server"),
    ("only-from", "only-server"),
    ("only-sources-from", "only-sources"),
    ("to", "tree"),
];

/// What the invocation asks for once global options are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `--version` was given; nothing else runs.
    Version,
    /// Run a command with the given arguments.
    Command {
        /// The normalized command name (hyphens replaced by underscores).
        name: String,
        /// The positional arguments that follow the command name.
        args: Vec<String>,
    },
}

/// Applies the order-sensitive global options to `flags` and `config`.
///
/// # Order:
/// 1. `--version` short-circuits everything else.
/// 2. Aliases are folded; `--nodeps` forces `deps-mode=none`.
/// 3. `--timeout` overrides the connection timeout.
/// 4. The command is picked (`help` when absent or `--help` is given).
/// 5. `local_by_default` switches `--local` on.
/// 6. `--deps-mode` is validated and stored.
/// 7. `--branch` overrides the source branch.
pub fn resolve_global_options(
    flags: &mut Flags,
    mut positional: Vec<String>,
    config: &mut Config,
) -> Result<Invocation, FatalError> {
    if flags.has("version") {
        return Ok(Invocation::Version);
    }

    for (alias, canonical) in FLAG_ALIASES {
        flags.fold_alias(alias, canonical);
    }
    if flags.has("nodeps") {
        flags.set_value("deps-mode", DepsMode::None.as_str());
    }

    if flags.has("timeout") {
        config.connection_timeout = flags
            .value("timeout")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .ok_or_else(|| {
                FatalError::usage("Argument error: --timeout expects a numeric argument.")
            })?;
        log::debug!("Connection timeout set to {}s", config.connection_timeout);
    }

    let (name, args) = if flags.has("help") || positional.is_empty() {
        (HELP_COMMAND.to_string(), positional)
    } else {
        let command = positional.remove(0);
        (command.replace('-', "_"), positional)
    };

    if config.local_by_default {
        flags.set_switch("local");
    }

    if flags.has("deps-mode") {
        let raw = flags.value("deps-mode").unwrap_or_default();
        config.deps_mode = raw.parse::<DepsMode>().map_err(FatalError::usage)?;
    }

    if let Some(branch) = flags.value("branch") {
        config.branch = Some(branch.to_string());
    }

    if flags.has("verbose") {
        config.verbose = true;
    }

    log::debug!("Resolved command '{}' with args {:?}", name, args);
    Ok(Invocation::Command { name, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arg_parser::parse_flags;
    use crate::test_support::config_with_trees;

    fn resolve(list: &[&str], config: &mut Config) -> (Flags, Result<Invocation, FatalError>) {
        let raw: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        let parsed = parse_flags(&raw).unwrap();
        let mut flags = parsed.flags;
        let result = resolve_global_options(&mut flags, parsed.positional, config);
        (flags, result)
    }

    fn command(name: &str, args: &[&str]) -> Invocation {
        Invocation::Command {
            name: name.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_version_short_circuits() {
        let mut config = config_with_trees(&["/usr/local"]);
        let (flags, result) = resolve(&["--version", "--timeout=abc", "list"], &mut config);
        assert_eq!(result.unwrap(), Invocation::Version);
        // Nothing after the version check ran.
        assert_eq!(flags.value("timeout"), Some("abc"));
    }

    #[test]
    fn test_aliases_are_folded() {
        let mut config = config_with_trees(&["/usr/local"]);
        let (flags, result) = resolve(
            &["--from=a", "--only-from=b", "--only-sources-from=c", "--to=/t", "list"],
            &mut config,
        );
        result.unwrap();
        assert_eq!(flags.value("server"), Some("a"));
        assert_eq!(flags.value("only-server"), Some("b"));
        assert_eq!(flags.value("only-sources"), Some("c"));
        assert_eq!(flags.value("tree"), Some("/t"));
        assert!(!flags.has("from") && !flags.has("to"));
    }

    #[test]
    fn test_nodeps_forces_none() {
        let mut config = config_with_trees(&["/usr/local"]);
        let (_, result) = resolve(&["--nodeps", "--deps-mode=all", "list"], &mut config);
        result.unwrap();
        assert_eq!(config.deps_mode, DepsMode::None);
    }

    #[test]
    fn test_invalid_deps_mode_is_usage_error() {
        let mut config = config_with_trees(&["/usr/local"]);
        let (_, result) = resolve(&["--deps-mode=most", "list"], &mut config);
        let err = result.unwrap_err();
        assert!(matches!(err, FatalError::Usage { .. }));
        assert!(err.to_string().contains("--deps-mode"));
    }

    #[test]
    fn test_timeout_parsing() {
        let mut config = config_with_trees(&["/usr/local"]);
        let (_, result) = resolve(&["--timeout=5", "list"], &mut config);
        result.unwrap();
        assert_eq!(config.connection_timeout, 5.0);

        let (_, result) = resolve(&["--timeout=2.5", "list"], &mut config);
        result.unwrap();
        assert_eq!(config.connection_timeout, 2.5);

        let (_, result) = resolve(&["--timeout=1e1", "list"], &mut config);
        result.unwrap();
        assert_eq!(config.connection_timeout, 10.0);

        let (_, result) = resolve(&["--timeout=soon", "list"], &mut config);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Argument error: --timeout expects a numeric argument."
        );
    }

    #[test]
    fn test_timeout_rejects_values_that_are_not_durations() {
        for raw in ["--timeout=NaN", "--timeout=inf", "--timeout=-1"] {
            let mut config = config_with_trees(&["/usr/local"]);
            let (_, result) = resolve(&[raw, "list"], &mut config);
            assert!(matches!(result, Err(FatalError::Usage { .. })), "{}", raw);
            assert_eq!(config.connection_timeout, 30.0);
        }
    }

    #[test]
    fn test_command_selection() {
        let mut config = config_with_trees(&["/usr/local"]);
        let (_, result) = resolve(&["show-config", "a", "b"], &mut config);
        assert_eq!(result.unwrap(), command("show_config", &["a", "b"]));

        let (_, result) = resolve(&[], &mut config);
        assert_eq!(result.unwrap(), command("help", &[]));

        let (_, result) = resolve(&["purge", "--help"], &mut config);
        assert_eq!(result.unwrap(), command("help", &["purge"]));
    }

    #[test]
    fn test_local_by_default_and_branch() {
        let mut config = config_with_trees(&["/usr/local"]);
        config.local_by_default = true;
        let (flags, result) = resolve(&["--branch=next", "list"], &mut config);
        result.unwrap();
        assert!(flags.has("local"));
        assert_eq!(config.branch.as_deref(), Some("next"));
    }
}
