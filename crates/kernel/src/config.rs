//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default site fixture for the CLI (from TRELLIS_SITE_FILE).
    pub site_file: Option<PathBuf>,

    /// Whether page URLs end with a slash (default: true).
    pub append_slash: bool,

    /// Language code used when a request does not name one (default: "en").
    pub default_language: String,

    /// Default depth bound for rendered menus (default: 100).
    pub to_level: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_file: None,
            append_slash: true,
            default_language: "en".to_string(),
            to_level: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Used by [`Config::from_env`]; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_file = lookup("TRELLIS_SITE_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let append_slash = match lookup("TRELLIS_APPEND_SLASH") {
            Some(v) => parse_bool(&v).context("TRELLIS_APPEND_SLASH must be a boolean")?,
            None => true,
        };

        let default_language = lookup("TRELLIS_DEFAULT_LANGUAGE")
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "en".to_string());

        let to_level = lookup("TRELLIS_TO_LEVEL")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .context("TRELLIS_TO_LEVEL must be a valid usize")?;

        Ok(Self {
            site_file,
            append_slash,
            default_language,
            to_level,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("invalid boolean: {other:?}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(config.site_file.is_none());
        assert!(config.append_slash);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.to_level, 100);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TRELLIS_SITE_FILE", "site.yaml"),
            ("TRELLIS_APPEND_SLASH", "off"),
            ("TRELLIS_DEFAULT_LANGUAGE", " DE "),
            ("TRELLIS_TO_LEVEL", "3"),
        ]))
        .unwrap();

        assert_eq!(config.site_file, Some(PathBuf::from("site.yaml")));
        assert!(!config.append_slash);
        assert_eq!(config.default_language, "de");
        assert_eq!(config.to_level, 3);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup_from(&[("TRELLIS_TO_LEVEL", "deep")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("TRELLIS_APPEND_SLASH", "maybe")])).is_err());
    }
}
