use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::domain::{FeatureFlags, Namespace};
use thiserror::Error;
use url::Url;

pub const SETTINGS_FILE: &str = "dashboard.toml";
const SETTINGS_DIR: &str = "catalog-dashboard";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub default_namespace: Namespace,
    pub request_timeout_secs: u64,
    pub feature_flags: FeatureFlags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8001".into(),
            token: None,
            default_namespace: Namespace::from("default"),
            request_timeout_secs: 30,
            feature_flags: FeatureFlags::default(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.api_url).map_err(|source| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        if self.default_namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api url '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported api url scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("default namespace must not be empty")]
    EmptyNamespace,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    token: Option<String>,
    default_namespace: Option<String>,
    request_timeout_secs: Option<u64>,
    features: Option<FeatureFlags>,
}

/// `./dashboard.toml` wins over the per-user config directory.
pub fn settings_path() -> Option<PathBuf> {
    let local = PathBuf::from(SETTINGS_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
        .filter(|path| path.exists())
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(settings_path().as_deref(), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    if let Some(path) = path {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_cfg: FileSettings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        apply_file(&mut settings, file_cfg);
    }

    apply_env(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.token {
        settings.token = Some(v);
    }
    if let Some(v) = file_cfg.default_namespace {
        settings.default_namespace = Namespace(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.features {
        settings.feature_flags = v;
    }
}

fn first_of(env: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().rev().find_map(|key| env(key))
}

/// Later keys in each list take precedence, so the `APP__` names override the
/// conventional ones.
fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = first_of(&env, &["KUBE_API_URL", "APP__API_URL"]) {
        settings.api_url = v;
    }
    if let Some(v) = first_of(&env, &["KUBE_TOKEN", "APP__TOKEN"]) {
        settings.token = Some(v);
    }
    if let Some(v) = env("APP__DEFAULT_NAMESPACE") {
        settings.default_namespace = Namespace(v);
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = env("APP__FEATURE_OPERATORS") {
        settings.feature_flags.operators = matches!(v.as_str(), "1" | "true" | "yes");
    }
    if let Some(v) = env("APP__FEATURE_UI") {
        settings.feature_flags.ui = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
