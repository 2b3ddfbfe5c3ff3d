// Resolver configuration
//
// Lookup order: explicit path, $MEDIA_RESOLVER_CONFIG,
// <config dir>/media-resolver/config.json, built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::links::{DownloadLinkBuilder, DEFAULT_DOWNLOAD_BASE_URL};
use crate::resolver::{BackendPlan, ExtractorConfig};

pub const CONFIG_ENV: &str = "MEDIA_RESOLVER_CONFIG";
const APP_DIR: &str = "media-resolver";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "media_resolver_lib=debug"
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Streaming endpoint the download links point at
    pub download_base_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub extractor: ExtractorConfig,
    pub backends: BackendPlan,
    pub links: LinksConfig,
    pub logging: LoggingConfig,
}

impl ResolverConfig {
    /// Load from the first file found in lookup order, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var(CONFIG_ENV).ok().filter(|v| !v.trim().is_empty());
        let Some(path) = config_path(explicit, env.as_deref()) else {
            debug!("no config file, using defaults");
            return Ok(Self::default());
        };

        // Only the default location may be missing
        if explicit.is_none() && env.is_none() && !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let config = Self::from_file(&path)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backends.validate().map_err(ConfigError::Invalid)?;
        if self.extractor.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "extractor.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        self.link_builder()?;
        Ok(())
    }

    pub fn link_builder(&self) -> Result<DownloadLinkBuilder, ConfigError> {
        DownloadLinkBuilder::new(&self.links.download_base_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "links.download_base_url {:?}: {}",
                self.links.download_base_url, e
            ))
        })
    }
}

/// Config file location for the given overrides.
pub fn config_path(explicit: Option<&Path>, env: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{BackendId, ProviderId};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extractor.timeout_seconds, 30);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(
            config.backends.for_provider(ProviderId::Youtube),
            &[BackendId::YtDlp, BackendId::RustyYtdl]
        );
    }

    #[test]
    fn test_config_path_precedence() {
        let explicit = PathBuf::from("/tmp/explicit.json");
        assert_eq!(
            config_path(Some(explicit.as_path()), Some("/tmp/env.json")),
            Some(explicit)
        );
        assert_eq!(
            config_path(None, Some("/tmp/env.json")),
            Some(PathBuf::from("/tmp/env.json"))
        );
        if let Some(path) = config_path(None, None) {
            assert!(path.ends_with("media-resolver/config.json"));
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "extractor": {{"proxy": "socks5://127.0.0.1:1080", "timeout_seconds": 45}},
                "backends": {{"default": ["yt-dlp"], "overrides": {{"youtube": ["rusty-ytdl", "yt-dlp"]}}}},
                "logging": {{"format": "json"}}
            }}"#
        )
        .unwrap();

        let config = ResolverConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.extractor.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(config.extractor.timeout_seconds, 45);
        assert_eq!(
            config.backends.for_provider(ProviderId::Youtube),
            &[BackendId::RustyYtdl, BackendId::YtDlp]
        );
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.links.download_base_url, DEFAULT_DOWNLOAD_BASE_URL);
    }

    #[test]
    fn test_invalid_files_are_rejected() {
        let mut empty_plan = tempfile::NamedTempFile::new().unwrap();
        write!(empty_plan, r#"{{"backends": {{"default": []}}}}"#).unwrap();
        assert!(matches!(
            ResolverConfig::from_file(empty_plan.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut bad_link = tempfile::NamedTempFile::new().unwrap();
        write!(bad_link, r#"{{"links": {{"download_base_url": "relative/path"}}}}"#).unwrap();
        assert!(matches!(
            ResolverConfig::from_file(bad_link.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        write!(garbage, "not json").unwrap();
        assert!(matches!(
            ResolverConfig::from_file(garbage.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            ResolverConfig::load(Some(missing.as_path())),
            Err(ConfigError::Io { .. })
        ));
    }
}
