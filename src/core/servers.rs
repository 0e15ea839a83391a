// src/core/servers.rs

use crate::core::arg_parser::Flags;
use crate::core::errors::FatalError;
use crate::core::paths;
use crate::models::Config;

/// Adjusts the server list from `--server`, `--dev`, `--only-server` and
/// records `--only-sources`.
///
/// # Logic:
/// 1. `--server=URL` is prepended as `protocol://path`.
/// 2. `--dev` prepends a `/dev` variant of every server already listed.
/// 3. `--only-server=URL` replaces the list, and conflicts with both of the above.
pub fn apply_server_flags(flags: &Flags, config: &mut Config) -> Result<(), FatalError> {
    if let Some(server) = flags.value("server") {
        let (protocol, path) = paths::split_url(server);
        let url = format!("{}://{}", protocol, path);
        log::debug!("Prepending server '{}'", url);
        config.rocks_servers.insert(0, url);
    }

    if flags.has("dev") {
        let mut servers: Vec<String> = config
            .rocks_servers
            .iter()
            .map(|server| paths::url_join(server, "dev"))
            .collect();
        servers.append(&mut config.rocks_servers);
        log::debug!("Development servers enabled: {:?}", servers);
        config.rocks_servers = servers;
    }

    if let Some(only) = flags.value("only-server") {
        if flags.has("dev") {
            return Err(FatalError::usage("--only-server cannot be used with --dev"));
        }
        if flags.has("server") {
            return Err(FatalError::usage("--only-server cannot be used with --server"));
        }
        config.rocks_servers = vec![only.to_string()];
    }

    if let Some(origin) = flags.value("only-sources") {
        config.only_sources_from = Some(origin.to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arg_parser::parse_flags;
    use crate::test_support::config_with_trees;

    fn apply(list: &[&str], servers: &[&str]) -> Result<Config, FatalError> {
        let raw: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        let flags = parse_flags(&raw).unwrap().flags;
        let mut config = config_with_trees(&["/usr/local"]);
        config.rocks_servers = servers.iter().map(|s| s.to_string()).collect();
        apply_server_flags(&flags, &mut config).map(|()| config)
    }

    #[test]
    fn test_server_is_prepended_with_protocol() {
        let config = apply(&["--server=/srv/mirror"], &["https://a.org"]).unwrap();
        assert_eq!(config.rocks_servers, vec!["file:///srv/mirror", "https://a.org"]);

        let config = apply(&["--server", "http://b.org/x"], &["https://a.org"]).unwrap();
        assert_eq!(config.rocks_servers[0], "http://b.org/x");
    }

    #[test]
    fn test_dev_prepends_dev_variants() {
        let config = apply(&["--dev"], &["https://a.org", "https://b.org/"]).unwrap();
        assert_eq!(
            config.rocks_servers,
            vec![
                "https://a.org/dev",
                "https://b.org/dev",
                "https://a.org",
                "https://b.org/"
            ]
        );
    }

    #[test]
    fn test_only_server_replaces_list() {
        let config = apply(&["--only-server=https://c.org"], &["https://a.org"]).unwrap();
        assert_eq!(config.rocks_servers, vec!["https://c.org"]);
    }

    #[test]
    fn test_only_server_conflicts() {
        let err = apply(&["--only-server=x", "--dev"], &["https://a.org"]).unwrap_err();
        assert_eq!(err.to_string(), "--only-server cannot be used with --dev");

        let err = apply(&["--only-server=x", "--server=y"], &["https://a.org"]).unwrap_err();
        assert_eq!(err.to_string(), "--only-server cannot be used with --server");
    }

    #[test]
    fn test_only_sources_is_recorded() {
        let config = apply(&["--only-sources=https://src.org"], &[]).unwrap();
        assert_eq!(config.only_sources_from.as_deref(), Some("https://src.org"));
    }
}
