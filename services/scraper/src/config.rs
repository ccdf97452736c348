//! services/scraper/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use news_scraper_core::SentimentBounds;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    pub fixtures_path: PathBuf,
    pub max_articles_per_source: usize,
    pub max_concurrent_sources: usize,
    pub required_source_config: Vec<String>,
    pub sentiment_bounds: SentimentBounds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            fixtures_path: PathBuf::from("./fixtures/articles.json"),
            max_articles_per_source: 50,
            max_concurrent_sources: 4,
            required_source_config: Vec::new(),
            sentiment_bounds: SentimentBounds::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let fixtures_path = lookup("FIXTURES_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.fixtures_path);

        let max_articles_per_source = parse_or(
            &lookup,
            "MAX_ARTICLES_PER_SOURCE",
            defaults.max_articles_per_source,
        )?;
        let max_concurrent_sources = parse_or(
            &lookup,
            "MAX_CONCURRENT_SOURCES",
            defaults.max_concurrent_sources,
        )?;
        if max_concurrent_sources == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_CONCURRENT_SOURCES".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let required_source_config = lookup("REQUIRED_SOURCE_CONFIG")
            .map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        // --- Sentiment bounds ---
        let base = defaults.sentiment_bounds;
        let sentiment_bounds = SentimentBounds {
            min_score: parse_or(&lookup, "SENTIMENT_MIN_SCORE", base.min_score)?,
            max_score: parse_or(&lookup, "SENTIMENT_MAX_SCORE", base.max_score)?,
            min_confidence: parse_or(&lookup, "SENTIMENT_MIN_CONFIDENCE", base.min_confidence)?,
            max_confidence: parse_or(&lookup, "SENTIMENT_MAX_CONFIDENCE", base.max_confidence)?,
        };
        if sentiment_bounds.min_score > sentiment_bounds.max_score {
            return Err(ConfigError::InvalidValue(
                "SENTIMENT_MIN_SCORE".to_string(),
                "must not exceed SENTIMENT_MAX_SCORE".to_string(),
            ));
        }
        if sentiment_bounds.min_confidence > sentiment_bounds.max_confidence {
            return Err(ConfigError::InvalidValue(
                "SENTIMENT_MIN_CONFIDENCE".to_string(),
                "must not exceed SENTIMENT_MAX_CONFIDENCE".to_string(),
            ));
        }

        Ok(Self {
            log_level,
            fixtures_path,
            max_articles_per_source,
            max_concurrent_sources,
            required_source_config,
            sentiment_bounds,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.max_articles_per_source, 50);
        assert_eq!(config.max_concurrent_sources, 4);
        assert!(config.required_source_config.is_empty());
        assert_eq!(config.sentiment_bounds, SentimentBounds::default());
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("RUST_LOG", "debug"),
            ("FIXTURES_PATH", "/tmp/feed.json"),
            ("MAX_ARTICLES_PER_SOURCE", "5"),
            ("REQUIRED_SOURCE_CONFIG", "article_selector, title_selector,,"),
            ("SENTIMENT_MAX_SCORE", "0.2"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.fixtures_path, PathBuf::from("/tmp/feed.json"));
        assert_eq!(config.max_articles_per_source, 5);
        assert_eq!(
            config.required_source_config,
            ["article_selector", "title_selector"]
        );
        assert_eq!(config.sentiment_bounds.max_score, 0.2);
    }

    #[test]
    fn invalid_values_are_reported_by_key() {
        let err = Config::from_lookup(lookup_from(&[("MAX_ARTICLES_PER_SOURCE", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "MAX_ARTICLES_PER_SOURCE"));

        let err = Config::from_lookup(lookup_from(&[("MAX_CONCURRENT_SOURCES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "MAX_CONCURRENT_SOURCES"));

        let err = Config::from_lookup(lookup_from(&[
            ("SENTIMENT_MIN_SCORE", "0.5"),
            ("SENTIMENT_MAX_SCORE", "0.1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "SENTIMENT_MIN_SCORE"));

        assert!(Config::from_lookup(lookup_from(&[("RUST_LOG", "chatty")])).is_err());
    }
}
