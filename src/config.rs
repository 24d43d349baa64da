use std::path::PathBuf;

use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::structure::DEFAULT_TARGET_READ_TIME;
use crate::summarize::DEFAULT_MAX_SUMMARY_LENGTH;

pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_MAX_VIDEOS: usize = 3;
pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const DEFAULT_DAYS_BACK: i64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_lang: Option<String>,
    pub default_format: Option<String>,
    pub max_videos_per_topic: Option<usize>,
    pub max_results: Option<u32>,
    pub days_back: Option<i64>,
    pub max_summary_length: Option<usize>,
    pub target_read_time: Option<u32>,
    pub cache_transcripts: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/ytpress/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            Self::parse(&content)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(minutes) = self.target_read_time {
            if minutes < 3 {
                bail!("target_read_time must be at least 3 minutes (got {minutes})");
            }
        }
        if self.max_videos_per_topic == Some(0) {
            bail!("max_videos_per_topic must be at least 1");
        }
        if let Some(n) = self.max_results {
            if !(1..=50).contains(&n) {
                bail!("max_results must be between 1 and 50 (got {n})");
            }
        }
        if let Some(days) = self.days_back {
            if days < 1 {
                bail!("days_back must be positive (got {days})");
            }
        }
        Ok(())
    }

    pub fn lang(&self) -> &str {
        self.default_lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn max_videos(&self) -> usize {
        self.max_videos_per_topic.unwrap_or(DEFAULT_MAX_VIDEOS)
    }

    pub fn max_results(&self) -> u32 {
        self.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }

    pub fn days_back(&self) -> i64 {
        self.days_back.unwrap_or(DEFAULT_DAYS_BACK)
    }

    pub fn max_summary_length(&self) -> usize {
        self.max_summary_length.unwrap_or(DEFAULT_MAX_SUMMARY_LENGTH)
    }

    pub fn target_read_time(&self) -> u32 {
        self.target_read_time.unwrap_or(DEFAULT_TARGET_READ_TIME)
    }

    pub fn cache_transcripts(&self) -> bool {
        self.cache_transcripts.unwrap_or(true)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytpress")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
default_lang = "es"
default_format = "json"
max_videos_per_topic = 5
max_results = 25
days_back = 14
max_summary_length = 800
target_read_time = 10
cache_transcripts = false
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.lang(), "es");
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert_eq!(config.max_videos(), 5);
        assert_eq!(config.max_results(), 25);
        assert_eq!(config.days_back(), 14);
        assert_eq!(config.max_summary_length(), 800);
        assert_eq!(config.target_read_time(), 10);
        assert!(!config.cache_transcripts());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.lang(), "en");
        assert_eq!(config.max_videos(), 3);
        assert_eq!(config.max_results(), 10);
        assert_eq!(config.days_back(), 30);
        assert_eq!(config.max_summary_length(), 1000);
        assert_eq!(config.target_read_time(), 8);
        assert!(config.cache_transcripts());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::parse("target_read_time = 2").is_err());
        assert!(Config::parse("max_videos_per_topic = 0").is_err());
        assert!(Config::parse("max_results = 51").is_err());
        assert!(Config::parse("days_back = 0").is_err());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(Config::parse("max_results = \"many\"").is_err());
    }
}
