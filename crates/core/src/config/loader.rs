//! Configuration file loader for `.agent-host/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.agent-host/` directory, including:
//! - `config.toml`: Host settings
//! - `tenants/<tenant>/agent-<n>.{toml,yaml,yml,json}`: Agent configuration

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::HostConfig;
use ah_protocol::agent_models::AgentConfig;
use ah_protocol::config_models::HostSettings;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".agent-host";

/// Loads all configuration from the `.agent-host/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.agent-host/` folder
///
/// # Returns
///
/// A `HostConfig` containing all loaded configuration. If directories or files
/// are missing (but the root exists), returns an empty/default configuration
/// rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML or JSON)
/// - An agent configuration file is not a key/value map
pub async fn load_config(root: &Path) -> ConfigResult<HostConfig> {
    let host_dir = root.join(CONFIG_DIR);

    if !host_dir.exists() {
        return Ok(HostConfig::default());
    }

    let settings = load_settings(&host_dir)?;
    let agent_configs = load_agent_configs(&host_dir)?;

    Ok(HostConfig {
        settings,
        agent_configs,
    })
}

/// Loads host settings from `config.toml`.
fn load_settings(host_dir: &Path) -> ConfigResult<HostSettings> {
    let config_path = host_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(HostSettings::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let settings: HostSettings =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    if settings.event_capacity == 0 {
        return Err(ConfigError::InvalidConfig {
            path: config_path,
            reason: "event_capacity must be greater than zero".to_string(),
        });
    }

    Ok(settings)
}

/// Loads every `tenants/<tenant>/agent-<n>.<ext>` file.
fn load_agent_configs(host_dir: &Path) -> ConfigResult<HashMap<(String, u32), AgentConfig>> {
    let tenants_dir = host_dir.join("tenants");

    if !tenants_dir.exists() {
        return Ok(HashMap::new());
    }

    let mut configs = HashMap::new();

    for entry in WalkDir::new(&tenants_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: tenants_dir.clone(),
            source,
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(agent_number) = parse_agent_file_name(path) else {
            continue;
        };

        let Some(tenant_id) = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
        else {
            continue;
        };

        let config = parse_agent_config_file(path)?;
        configs.insert((tenant_id.to_string(), agent_number), config);
    }

    Ok(configs)
}

/// Extract `n` from `agent-<n>.{toml,yaml,yml,json}`.
fn parse_agent_file_name(path: &Path) -> Option<u32> {
    let ext = path.extension().and_then(|s| s.to_str())?;
    if !matches!(ext, "toml" | "yaml" | "yml" | "json") {
        return None;
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.strip_prefix("agent-"))
        .and_then(|number| number.parse().ok())
        .filter(|number| *number > 0)
}

/// Parse one agent configuration file according to its extension.
pub fn parse_agent_config_file(path: &Path) -> ConfigResult<AgentConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        }),
        Some("yaml") | Some("yml") => {
            // An empty YAML document is an empty configuration
            if content.trim().is_empty() {
                return Ok(AgentConfig::new());
            }
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })
        }
        Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::JsonParse {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "Unsupported configuration file extension".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_protocol::config_models::LogFormat;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    /// We create a complete `.agent-host/` structure with all supported
    /// files and verify that `load_config` parses and loads everything.
    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let host_dir = root.join(CONFIG_DIR);

        fs::create_dir_all(host_dir.join("tenants/alice")).expect("Failed to create tenant dir");
        fs::create_dir_all(host_dir.join("tenants/bob")).expect("Failed to create tenant dir");

        let config_toml = r#"
event_capacity = 64
log_level = "debug"
log_format = "json"
"#;
        fs::write(host_dir.join("config.toml"), config_toml).expect("Failed to write config.toml");

        fs::write(
            host_dir.join("tenants/alice/agent-1.toml"),
            "currency_symbol = \"€\"\ncache_ttl_secs = 30\n",
        )
        .expect("Failed to write toml agent config");
        fs::write(
            host_dir.join("tenants/bob/agent-31.yaml"),
            "message_log_limit: 50\n",
        )
        .expect("Failed to write yaml agent config");
        fs::write(host_dir.join("tenants/bob/agent-1.json"), r#"{"currency_symbol": "£"}"#)
            .expect("Failed to write json agent config");
        fs::write(host_dir.join("tenants/bob/notes.md"), "ignored")
            .expect("Failed to write unrelated file");

        let config = load_config(root).await.expect("Failed to load config");

        assert_eq!(config.settings.event_capacity, 64);
        assert_eq!(config.settings.log_level, "debug");
        assert_eq!(config.settings.log_format, LogFormat::Json);
        assert_eq!(config.settings.message_log_limit, 1000);

        assert_eq!(config.agent_configs.len(), 3, "Should load 3 agent configs");
        let alice = &config.agent_configs[&("alice".to_string(), 1)];
        assert_eq!(alice.get("currency_symbol"), Some(&json!("€")));
        assert_eq!(alice.get("cache_ttl_secs"), Some(&json!(30)));

        let bob_sa = &config.agent_configs[&("bob".to_string(), 31)];
        assert_eq!(bob_sa.get("message_log_limit"), Some(&json!(50)));

        let bob_bi = &config.agent_configs[&("bob".to_string(), 1)];
        assert_eq!(bob_bi.get("currency_symbol"), Some(&json!("£")));
    }

    /// Loading from a directory without `.agent-host` returns defaults, not an error.
    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should handle missing .agent-host");

        assert_eq!(config.settings, HostSettings::default());
        assert!(config.agent_configs.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        let host_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&host_dir).expect("Failed to create .agent-host");
        fs::write(host_dir.join("config.toml"), "message_log_limit = 10")
            .expect("Failed to write config.toml");

        let config = load_config(dir.path())
            .await
            .expect("Should handle partial config");

        assert_eq!(config.settings.message_log_limit, 10);
        assert_eq!(config.settings.event_capacity, 1024);
        assert!(config.agent_configs.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let host_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&host_dir).expect("Failed to create .agent-host");
        fs::write(host_dir.join("config.toml"), "event_capacity = [").expect("Failed to write");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_rejects_zero_capacity() {
        let dir = tempdir().expect("Failed to create temp dir");
        let host_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&host_dir).expect("Failed to create .agent-host");
        fs::write(host_dir.join("config.toml"), "event_capacity = 0").expect("Failed to write");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_load_config_invalid_agent_yaml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let tenant_dir = dir.path().join(CONFIG_DIR).join("tenants/alice");
        fs::create_dir_all(&tenant_dir).expect("Failed to create tenant dir");
        fs::write(tenant_dir.join("agent-1.yaml"), "- not\n- a map\n").expect("Failed to write");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::YamlParse { .. })));
    }

    #[test]
    fn test_parse_agent_file_name() {
        assert_eq!(parse_agent_file_name(Path::new("t/agent-1.toml")), Some(1));
        assert_eq!(parse_agent_file_name(Path::new("t/agent-31.yml")), Some(31));
        assert_eq!(parse_agent_file_name(Path::new("t/agent-0.toml")), None);
        assert_eq!(parse_agent_file_name(Path::new("t/agent-x.toml")), None);
        assert_eq!(parse_agent_file_name(Path::new("t/agent-1.md")), None);
        assert_eq!(parse_agent_file_name(Path::new("t/settings.toml")), None);
    }

    #[test]
    fn test_empty_yaml_is_empty_config() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("agent-1.yaml");
        fs::write(&path, "").expect("Failed to write");

        let config = parse_agent_config_file(&path).expect("empty yaml should parse");
        assert!(config.is_empty());
    }
}
