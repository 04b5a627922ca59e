use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::ServerConfig;

/// Layer an optional YAML document and environment overrides over the defaults
///
/// Priority order (highest to lowest): environment, YAML, defaults.
pub(super) fn merge(yaml: Option<YamlConfig>, env: EnvConfig) -> ServerConfig {
    let mut config = ServerConfig::defaults();

    if let Some(yaml) = yaml {
        if let Some(host) = yaml.host {
            config.host = host;
        }
        if let Some(port) = yaml.port {
            config.port = port;
        }
        if let Some(store_path) = yaml.store_path {
            config.store_path = store_path;
        }
        if let Some(timeout) = yaml.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        if let Some(update) = yaml.update {
            if let Some(owner) = update.owner {
                config.update_owner = owner;
            }
            if let Some(repo) = update.repo {
                config.update_repo = repo;
            }
        }
        if let Some(version) = yaml.app_version {
            config.app_version = version;
        }
    }

    if let Some(host) = env.host {
        config.host = host;
    }
    if let Some(port) = env.port {
        config.port = port;
    }
    if let Some(store_path) = env.store_path {
        config.store_path = store_path;
    }
    if let Some(timeout) = env.request_timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(owner) = env.update_owner {
        config.update_owner = owner;
    }
    if let Some(repo) = env.update_repo {
        config.update_repo = repo;
    }
    if let Some(version) = env.app_version {
        config.app_version = version;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yaml::YamlUpdateConfig;
    use std::path::PathBuf;

    #[test]
    fn defaults_survive_empty_layers() {
        let config = merge(None, EnvConfig::default());
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = YamlConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            update: Some(YamlUpdateConfig {
                owner: Some("acme".to_string()),
                repo: None,
            }),
            ..YamlConfig::default()
        };
        let config = merge(Some(yaml), EnvConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.update_owner, "acme");
        // Untouched fields keep their defaults
        assert_eq!(config.update_repo, "parlance");
    }

    #[test]
    fn env_overrides_yaml() {
        let yaml = YamlConfig {
            port: Some(9000),
            store_path: Some(PathBuf::from("/from/yaml.json")),
            ..YamlConfig::default()
        };
        let env = EnvConfig {
            port: Some(4242),
            ..EnvConfig::default()
        };
        let config = merge(Some(yaml), env);
        assert_eq!(config.port, 4242);
        assert_eq!(config.store_path, PathBuf::from("/from/yaml.json"));
    }
}
