use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

pub const TOKEN_ENV: &str = "TELEGRAM_API_TOKEN";
pub const SECRET_ENV: &str = "TELEGRAM_SECRET";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Shared secret Telegram echoes back in `X-Telegram-Bot-Api-Secret-Token`
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            webhook_secret: String::new(),
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Externally reachable base URL, e.g. "https://bot.example.com".
    /// When unset, /registerWebhook derives it from the request headers.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            public_url: None,
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8787))
}

impl Config {
    /// Load from `path` (optional if both secrets are in the environment),
    /// apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = if path.exists() {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?
        } else {
            String::new()
        };

        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(secret) = lookup(SECRET_ENV).filter(|v| !v.is_empty()) {
            self.telegram.webhook_secret = secret;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            anyhow::bail!(
                "Missing bot token: set [telegram] bot_token or {}",
                TOKEN_ENV
            );
        }

        let secret = &self.telegram.webhook_secret;
        if secret.is_empty() {
            anyhow::bail!(
                "Missing webhook secret: set [telegram] webhook_secret or {}",
                SECRET_ENV
            );
        }
        // Telegram only accepts 1-256 characters from this set.
        if secret.len() > 256
            || !secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!("Webhook secret must be 1-256 characters of A-Z, a-z, 0-9, _ and -");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_file_parses() {
        let config = Config::from_toml_str(
            r#"
[telegram]
bot_token = "123:abc"
webhook_secret = "s3cret"
api_url = "http://localhost:8081"

[server]
listen_addr = "127.0.0.1:9000"
public_url = "https://bot.example.com"
"#,
        )
        .unwrap();

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.webhook_secret, "s3cret");
        assert_eq!(config.telegram.api_url, "http://localhost:8081");
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert_eq!(
            config.server.public_url.as_deref(),
            Some("https://bot.example.com")
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.server.listen_addr, default_listen_addr());
        assert!(config.server.public_url.is_none());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml_str(
            r#"
[telegram]
bot_token = "from-file"
webhook_secret = "file_secret"
"#,
        )
        .unwrap();

        config.apply_env_overrides(env(&[(TOKEN_ENV, "from-env"), (SECRET_ENV, "env_secret")]));

        assert_eq!(config.telegram.bot_token, "from-env");
        assert_eq!(config.telegram.webhook_secret, "env_secret");
    }

    #[test]
    fn test_empty_env_value_does_not_override() {
        let mut config = Config::from_toml_str("[telegram]\nbot_token = \"keep\"\n").unwrap();
        config.apply_env_overrides(env(&[(TOKEN_ENV, "")]));
        assert_eq!(config.telegram.bot_token, "keep");
    }

    #[test]
    fn test_missing_token_is_error() {
        let mut config = Config::default();
        config.telegram.webhook_secret = "abc".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bot token"));
    }

    #[test]
    fn test_missing_secret_is_error() {
        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("webhook secret"));
    }

    #[test]
    fn test_secret_charset_enforced() {
        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".to_string();

        config.telegram.webhook_secret = "has space".to_string();
        assert!(config.validate().is_err());

        config.telegram.webhook_secret = "a".repeat(257);
        assert!(config.validate().is_err());

        config.telegram.webhook_secret = "Ok_secret-42".to_string();
        assert!(config.validate().is_ok());
    }
}
