// src/cli/handlers/config.rs

use crate::{
    cli::{dispatcher::CommandContext, handlers},
    core::errors::CommandResult,
    models::Config,
};
use anyhow::{Result, anyhow};
use clap::Parser;
use serde_json::Value;

/// Help text for `rockport help config`.
pub const HELP: &str = "\
Usage: rockport config [key] [--json]

Shows the configuration in effect for this invocation, after the
configuration files, the flags and the tree selection were applied.

  key       A dotted path such as 'deps_mode' or 'variables.ROCKS_TREE'.
  --json    Print JSON instead of TOML.";

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Shows the resolved configuration.")]
struct ConfigArgs {
    /// Dotted path of a single setting.
    key: Option<String>,
}

/// The handler for the `config` command.
pub fn handle(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let config_args: ConfigArgs = handlers::parse_args(args)?;
    let text = render(ctx.config, config_args.key.as_deref(), ctx.flags.has("json"))?;
    print!("{}", text);
    Ok(())
}

/// Renders the whole configuration or the value under `key`.
fn render(config: &Config, key: Option<&str>, json: bool) -> Result<String> {
    let document = serde_json::to_value(config)?;
    let selected = match key {
        None => &document,
        Some(key) => lookup(&document, key)
            .ok_or_else(|| anyhow!("Unknown configuration key: {}", key))?,
    };

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(selected)?));
    }

    let text = match selected {
        Value::Object(_) => toml::to_string_pretty(selected)?,
        Value::Array(items) => items.iter().map(|item| format!("{}\n", scalar(item))).collect(),
        other => format!("{}\n", scalar(other)),
    };
    Ok(text)
}

/// Follows a dotted path through nested objects. Numeric segments index arrays.
fn lookup<'v>(document: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(document, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DepsMode;
    use crate::test_support::config_with_trees;

    fn sample() -> Config {
        let mut config = config_with_trees(&["/usr/local"]);
        config.deps_mode = DepsMode::Order;
        config
            .variables
            .insert("ROCKS_TREE".to_string(), "/usr/local/lib/rockport/rocks-5.4".to_string());
        config
    }

    #[test]
    fn test_single_values() {
        let config = sample();
        assert_eq!(render(&config, Some("deps_mode"), false).unwrap(), "order\n");
        assert_eq!(render(&config, Some("connection_timeout"), false).unwrap(), "30.0\n");
        assert_eq!(
            render(&config, Some("variables.ROCKS_TREE"), false).unwrap(),
            "/usr/local/lib/rockport/rocks-5.4\n"
        );
        assert_eq!(render(&config, Some("rocks_trees.0"), false).unwrap(), "/usr/local\n");
    }

    #[test]
    fn test_unknown_key_fails() {
        let err = render(&sample(), Some("nope.deeper"), false).unwrap_err();
        assert_eq!(err.to_string(), "Unknown configuration key: nope.deeper");
    }

    #[test]
    fn test_whole_config_as_toml_reparses() {
        let text = render(&sample(), None, false).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.deps_mode, DepsMode::Order);
        assert_eq!(parsed.rocks_trees, sample().rocks_trees);
    }

    #[test]
    fn test_json_output() {
        let text = render(&sample(), Some("exit_codes"), true).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["crash"], 99);
    }
}
