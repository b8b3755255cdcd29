use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One monitored search: a results URL plus the currency its prices are
/// quoted in. The URL should sort newest-first (eBay `_sop=10`) — the scan
/// stops at the first already-seen link and assumes everything below it is
/// older.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSpec {
    pub url: String,
    pub currency: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub searches: Vec<SearchSpec>,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    #[serde(default)]
    pub track_scraped_urls: bool,
    #[serde(default)]
    pub web_server: bool,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_scraped_file")]
    pub scraped_file: PathBuf,
    /// Tera template rendered per listing, e.g.
    /// `"{{ title }}\n{{ price }} {{ currency }}\n{{ url }}"`.
    pub message: String,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_delay_secs() -> u64 {
    60
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_scraped_file() -> PathBuf {
    PathBuf::from("scraped.json")
}

impl Config {
    /// Load and validate configuration. `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID`
    /// from the environment (usually via `.env`) override file values.
    /// Any problem here is fatal at startup.
    pub fn load(path: &str) -> Result<Config> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {path}"))?;
        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("could not parse config file {path}"))?;

        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            config.telegram.token = token;
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            config.telegram.chat_id = chat_id;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.searches.is_empty() {
            bail!("no searches configured");
        }
        if self.delay_secs == 0 {
            bail!("delay_secs must be at least 1");
        }
        if self.telegram.token.is_empty() {
            bail!("telegram token missing (set TELEGRAM_TOKEN or telegram.token)");
        }
        if self.telegram.chat_id.is_empty() {
            bail!("telegram chat id missing (set TELEGRAM_CHAT_ID or telegram.chat_id)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "searches": [{"url": "https://www.ebay.co.uk/sch/i.html?_nkw=x&_sop=10", "currency": "GBP"}],
                "message": "{{ title }} — {{ price }} {{ currency }}"
            }"#,
        )
        .unwrap();

        assert_eq!(config.delay_secs, 60);
        assert!(!config.track_scraped_urls);
        assert!(!config.web_server);
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.scraped_file, PathBuf::from("scraped.json"));
        assert_eq!(config.searches.len(), 1);
        assert_eq!(config.searches[0].currency, "GBP");
    }

    #[test]
    fn empty_searches_fail_validation() {
        let config: Config = serde_json::from_str(
            r#"{"searches": [], "message": "{{ url }}",
                "telegram": {"token": "t", "chat_id": "c"}}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let config: Config = serde_json::from_str(
            r#"{"searches": [{"url": "u", "currency": "GBP"}], "message": "{{ url }}"}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
