use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sqlchat_agents::config::SqlAgentSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "SQLCHAT";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: SqlAgentSettings,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Idle seconds before a page session and its agent are dropped
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_ttl_secs: 3600,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// The one database every session asks about
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Chinook.db"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
    /// Daily rolling log files are written here when set
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

const DEFAULT_CONFIG: &str = r#"[server]
host = "127.0.0.1"
port = 8080
# Sessions untouched this long are dropped
session_ttl_secs = 3600

[database]
# Relative paths resolve against the working directory
path = "Chinook.db"

[llm]
model = "gpt-4.1"
temperature = 0.0
# base_url = "https://api.openai.com"
# max_iterations = 15

[logging]
level = "info"
# directory = "~/.local/state/sqlchat/logs"

[cors]
allowed_origins = ["http://localhost:3000"]
"#;

impl ApiConfig {
    /// Load the config file, writing the default one first if it does not exist.
    ///
    /// `SQLCHAT_<SECTION>__<KEY>` environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        if !config_path.exists() {
            if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigError::Message(format!("Failed to create config directory: {e}"))
                })?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: ApiConfig = builder.try_deserialize()?;

        config.database.path = expand_tilde(&config.database.path);
        config.logging.directory = config.logging.directory.as_deref().map(expand_tilde);

        Ok((config, config_path))
    }
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("sqlchat/api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if !path.starts_with("~") {
        return path.to_path_buf();
    }

    match home::home_dir() {
        Some(home) => {
            let path_str = path.to_string_lossy();
            PathBuf::from(path_str.replacen('~', &home.to_string_lossy(), 1))
        }
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_file_is_written_and_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/api.toml");

        let (config, loaded_from) = ApiConfig::load(Some(&path)).unwrap();

        assert_eq!(loaded_from, path);
        assert!(path.exists());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_ttl(), Duration::from_secs(3600));
        assert_eq!(config.database.path, PathBuf::from("Chinook.db"));
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.llm.max_iterations, 15);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/srv/data/music.db\"\n\n[llm]\nmodel = \"gpt-4.1-mini\"\n",
        )
        .unwrap();

        let (config, _) = ApiConfig::load(Some(&path)).unwrap();

        assert_eq!(config.database.path, PathBuf::from("/srv/data/music.db"));
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.server.session_ttl_secs, 3600);
    }

    #[test]
    fn test_session_ttl_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(&path, "[server]\nsession_ttl_secs = 900\n").unwrap();

        let (config, _) = ApiConfig::load(Some(&path)).unwrap();

        assert_eq!(config.server.session_ttl(), Duration::from_secs(900));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_expand_tilde() {
        let plain = PathBuf::from("data/Chinook.db");
        assert_eq!(expand_tilde(&plain), plain);

        if let Some(home) = home::home_dir() {
            assert_eq!(
                expand_tilde(Path::new("~/Chinook.db")),
                home.join("Chinook.db")
            );
        }
    }

    #[test]
    fn test_credential_is_not_a_config_key() {
        let rendered = serde_json::to_string(&ApiConfig::default()).unwrap();
        assert!(!rendered.contains("api_key"));
    }
}
