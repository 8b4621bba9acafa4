use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "roster.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {value:?}: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url {0:?} must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to read settings file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {} is not valid TOML: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Defaults, then the TOML file, then the environment. An explicit
/// `config_path` must be readable; the implicit `roster.toml` may be absent.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?,
        Err(err) if config_path.is_none() && err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    }
    settings.apply_env(|key| std::env::var(key).ok());

    Ok(settings)
}

impl Settings {
    fn apply_file(&mut self, raw: &str) -> Result<(), toml::de::Error> {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
        if let Some(v) = file_cfg.get("base_url") {
            self.base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("log_filter") {
            self.log_filter = v.clone();
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("ROSTER_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("APP__BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }

    /// Base URL without a trailing slash, checked to be absolute http(s).
    pub fn validated_base_url(&self) -> Result<String, ConfigError> {
        let raw = self.base_url.trim();
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw.to_string()));
        }
        Ok(raw.trim_end_matches('/').to_string())
    }
}
