use inventory_core::models::SESSION_MAX_AGE_SECS;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "inventory.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid listen address `{0}`")]
    ListenAddr(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteApiConfig {
    /// Base address of the inventory service, without a trailing slash.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_age_secs: u64,
    pub secure: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub server: ServerConfig,
    pub api: RemoteApiConfig,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "0.0.0.0:3000".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Default for RemoteApiConfig {
    fn default() -> Self {
        RemoteApiConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_age_secs: SESSION_MAX_AGE_SECS,
            secure: false,
        }
    }
}

impl InventoryConfig {
    /// Loads configuration with environment variable overrides.
    ///
    /// An explicit `path` must exist. Without one, `inventory.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_file(default_path)?
                } else {
                    warn!("⚠️ {} not found, using defaults", DEFAULT_CONFIG_FILE);
                    InventoryConfig::default()
                }
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("📁 Loading configuration from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: InventoryConfig = toml::from_str(content)?;
        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("INVENTORY_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(dir) = lookup("INVENTORY_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("INVENTORY_API_URL") {
            self.api.base_url = normalize_base_url(&url);
        }
        if let Some(max_age) = lookup("INVENTORY_SESSION_MAX_AGE") {
            match max_age.parse::<u64>() {
                Ok(secs) => self.session.max_age_secs = secs,
                Err(_) => warn!("⚠️ Ignoring INVENTORY_SESSION_MAX_AGE={}", max_age),
            }
        }
        if let Some(secure) = lookup("INVENTORY_SECURE_COOKIES") {
            self.session.secure = secure.to_lowercase() == "true" || secure == "1";
        }
    }

    /// CLI flags win over file and environment.
    pub fn apply_cli(&mut self, listen: Option<String>, api_url: Option<String>) {
        if let Some(addr) = listen {
            self.server.listen_addr = addr;
        }
        if let Some(url) = api_url {
            self.api.base_url = normalize_base_url(&url);
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .listen_addr
            .parse()
            .map_err(|_| ConfigError::ListenAddr(self.server.listen_addr.clone()))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = InventoryConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.session.max_age_secs, 28_800);
        assert!(!config.session.secure);
        assert_eq!(config.listen_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = InventoryConfig::from_toml(
            r#"
            [api]
            base_url = "http://inventory.internal:8000/"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://inventory.internal:8000");
        assert_eq!(config.server.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.session.max_age_secs, 28_800);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("INVENTORY_LISTEN_ADDR", "127.0.0.1:4000"),
            ("INVENTORY_API_URL", "http://10.0.0.5:8000/"),
            ("INVENTORY_SESSION_MAX_AGE", "not-a-number"),
            ("INVENTORY_SECURE_COOKIES", "TRUE"),
        ]
        .into_iter()
        .collect();

        let mut config = InventoryConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.listen_addr, "127.0.0.1:4000");
        assert_eq!(config.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.session.max_age_secs, 28_800);
        assert!(config.session.secure);
    }

    #[test]
    fn test_cli_wins() {
        let mut config = InventoryConfig::default();
        config.apply_cli(Some("127.0.0.1:9999".to_string()), None);
        assert_eq!(config.listen_addr().unwrap().port(), 9999);
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_bad_listen_addr() {
        let mut config = InventoryConfig::default();
        config.server.listen_addr = "nowhere".to_string();
        assert!(matches!(config.listen_addr(), Err(ConfigError::ListenAddr(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = InventoryConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
