use std::collections::HashMap;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// A known archive deployment the client can talk to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Base URL of the REST API, e.g. "https://api.dandiarchive.org/api"
    pub api: String,
    /// Base URL of the web frontend, if the instance has one
    pub gui: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown archive instance: {0:?}")]
    UnknownInstance(String),
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

/// Client configuration, loaded from `dandi.toml` and `DANDI__`-prefixed
/// environment variables over built-in defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// API key used to authenticate against the archive
    pub api_key: Option<String>,
    /// Registry of archive instances addressable by name via `-i`
    pub instances: HashMap<String, InstanceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let mut instances = HashMap::new();
        instances.insert(
            "dandi".to_string(),
            InstanceConfig {
                api: "https://api.dandiarchive.org/api".to_string(),
                gui: Some("https://dandiarchive.org".to_string()),
            },
        );
        instances.insert(
            "dandi-staging".to_string(),
            InstanceConfig {
                api: "https://api-staging.dandiarchive.org/api".to_string(),
                gui: Some("https://gui-staging.dandiarchive.org".to_string()),
            },
        );
        Self {
            api_key: None,
            instances,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("dandi.toml"))
            .merge(Env::prefixed("DANDI__").split("__"))
            .extract()
            .map_err(Box::new)?;
        Ok(config)
    }

    pub fn get_instance(&self, name: &str) -> Result<&InstanceConfig, ConfigError> {
        self.instances
            .get(name)
            .ok_or_else(|| ConfigError::UnknownInstance(name.to_string()))
    }

    /// The API key, with `DANDI_API_KEY` taking precedence over file config.
    pub fn api_key(&self) -> Option<String> {
        std::env::var("DANDI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_knows_public_instances() {
        let config = Config::default();
        assert_eq!(
            config.get_instance("dandi").unwrap().api,
            "https://api.dandiarchive.org/api"
        );
        assert!(config.get_instance("dandi-staging").is_ok());
    }

    #[test]
    fn unknown_instance_is_an_error() {
        let config = Config::default();
        let err = config.get_instance("nonexistent").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInstance(_)));
    }
}
