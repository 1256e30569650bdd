use bookshelf_sync::SyncConfig;
use bookshelf_types::{ReadingStatus, UserId};
use directories::ProjectDirs;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Overrides `api.token` when set.
pub const TOKEN_ENV: &str = "BOOKSHELF_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            token: None,
            user_id: None,
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    /// Load the config at `path`, writing the defaults there on first run.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save(path).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub async fn reset(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save(path).await?;
        Ok(config)
    }

    /// The bearer token, preferring the environment over the file.
    pub fn token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| self.api.token.clone())
    }

    pub fn user_id(&self) -> Result<UserId> {
        self.api.user_id.map(UserId).ok_or_else(|| {
            eyre::eyre!("api.user_id is not set; run `bookshelf config set api.user_id <id>`")
        })
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "base_url"] => {
                url::Url::parse(value)
                    .map_err(|e| eyre::eyre!("Invalid URL '{}': {}", value, e))?;
                self.api.base_url = value.to_string();
            }
            ["api", "token"] => {
                self.api.token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["api", "user_id"] => {
                self.api.user_id = if value.is_empty() {
                    None
                } else {
                    Some(parse(value)?)
                };
            }
            ["sync", "recommendation_attempts"] => {
                self.sync.recommendation_attempts = parse(value)?;
            }
            ["sync", "direct_add_attempts"] => {
                self.sync.direct_add_attempts = parse(value)?;
            }
            ["sync", "base_delay_ms"] => {
                self.sync.base_delay_ms = parse(value)?;
            }
            ["sync", "feed_page_size"] => {
                self.sync.feed_page_size = parse(value)?;
            }
            ["sync", "default_status"] => {
                self.sync.default_status = value
                    .parse::<ReadingStatus>()
                    .map_err(|e| eyre::eyre!(e))?;
            }
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["api", "base_url"] => self.api.base_url.clone(),
            ["api", "token"] => mask(self.api.token.as_deref()),
            ["api", "user_id"] => self
                .api
                .user_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            ["sync", "recommendation_attempts"] => self.sync.recommendation_attempts.to_string(),
            ["sync", "direct_add_attempts"] => self.sync.direct_add_attempts.to_string(),
            ["sync", "base_delay_ms"] => self.sync.base_delay_ms.to_string(),
            ["sync", "feed_page_size"] => self.sync.feed_page_size.to_string(),
            ["sync", "default_status"] => self.sync.default_status.to_string(),
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        format!(
            "Configuration:\n\
             API:\n\
             ├─ base_url: {}\n\
             ├─ token: {}\n\
             └─ user_id: {}\n\
             Sync:\n\
             ├─ recommendation_attempts: {}\n\
             ├─ direct_add_attempts: {}\n\
             ├─ base_delay_ms: {}\n\
             ├─ feed_page_size: {}\n\
             └─ default_status: {}",
            self.api.base_url,
            mask(self.api.token.as_deref()),
            self.api
                .user_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "(not set)".to_string()),
            self.sync.recommendation_attempts,
            self.sync.direct_add_attempts,
            self.sync.base_delay_ms,
            self.sync.feed_page_size,
            self.sync.default_status,
        )
    }
}

fn parse<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| eyre::eyre!("Invalid numeric value: {}", value))
}

fn mask(token: Option<&str>) -> String {
    match token {
        Some(_) => "********".to_string(),
        None => "(not set)".to_string(),
    }
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "bookshelf", "bookshelf") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        // Fallback to current directory if we can't determine project dirs
        PathBuf::from(".bookshelf").join("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load(&path).await.unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn values_survive_a_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::load(&path).await.unwrap();
        config.set_value("api.user_id", "42").unwrap();
        config.set_value("sync.default_status", "currently_reading").unwrap();
        config.set_value("sync.feed_page_size", "50").unwrap();
        config.save(&path).await.unwrap();

        let reloaded = Config::load(&path).await.unwrap();
        assert_eq!(reloaded.get_value("api.user_id").unwrap(), "42");
        assert_eq!(
            reloaded.get_value("sync.default_status").unwrap(),
            "currently_reading"
        );
        assert_eq!(reloaded.sync.feed_page_size, 50);
        assert_eq!(reloaded.user_id().unwrap(), UserId(42));
    }

    #[tokio::test]
    async fn partial_files_fill_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{ "api": { "base_url": "https://books.example/" } }"#)
            .await
            .unwrap();

        let config = Config::load(&path).await.unwrap();

        assert_eq!(config.api.base_url, "https://books.example/");
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set_value("api.base_url", "not a url").is_err());
        assert!(config.set_value("sync.feed_page_size", "many").is_err());
        assert!(config.set_value("sync.default_status", "abandoned").is_err());
        assert!(config.set_value("storage.path", "/tmp").is_err());
        assert!(config.get_value("api.secret").is_err());
    }

    #[test]
    fn token_is_never_shown() {
        let mut config = Config::default();
        config.set_value("api.token", "abc123").unwrap();
        assert_eq!(config.get_value("api.token").unwrap(), "********");
        assert!(!config.show_all().contains("abc123"));
        assert!(Config::default().user_id().is_err());
    }
}
