use learnflow_csrf::{CsrfConfig, CsrfError, SecretKey};
use serde::{Deserialize, Serialize};
use serde_default::DefaultFromSerde;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use once_cell::sync::Lazy;

// Lazily-resolved data directory shared across the application.
// Priority: env var LEARNFLOW_DATA_DIR, else "./data" relative to current working dir.
// The directory is created on first access.
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    let base = std::env::var("LEARNFLOW_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("data")
        });
    if let Err(e) = std::fs::create_dir_all(&base) {
        eprintln!("Failed to create data directory {base:?}: {e}");
    }
    base
});

pub const ENV_PREFIX: &str = "LEARNFLOW";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_csrf_path_prefix() -> UrlSegment {
    UrlSegment("api".to_string())
}

fn default_csrf_max_age_secs() -> u64 {
    60 * 60 * 24
}

/// Deployment environment; production turns on the `Secure` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnvironment::Production)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, DefaultFromSerde)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Never written back to disk
    #[serde(default, skip_serializing)]
    pub csrf_secret: Option<SecretKey>,

    #[serde(default = "default_csrf_path_prefix")]
    pub csrf_path_prefix: UrlSegment,

    #[serde(default = "default_csrf_max_age_secs")]
    pub csrf_max_age_secs: u64, // in seconds
}

impl AppConfig {
    /// Settings for the CSRF middleware. Fails when no secret is configured.
    pub fn csrf_config(&self) -> Result<CsrfConfig, CsrfError> {
        let secret = self.csrf_secret.clone().ok_or(CsrfError::MissingSecret)?;
        let max_age = i64::try_from(self.csrf_max_age_secs).unwrap_or(i64::MAX);

        Ok(CsrfConfig::new(secret)
            .with_path_prefix(format!("/{}", self.csrf_path_prefix))
            .with_secure_cookie(self.environment.is_production())
            .with_max_age(time::Duration::seconds(max_age)))
    }
}

pub const DEFAULT_CONFIG_FILENAME: &str = "learnflow.toml";
const DEV_CONFIG_FILENAME: &str = "learnflow.dev.toml";

fn config_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILENAME)
}

fn dev_config_path(dir: &Path) -> PathBuf {
    dir.join(DEV_CONFIG_FILENAME)
}

/// Load configuration from known files and environment.
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    load_config_from(&DATA_DIR, config::Environment::with_prefix(ENV_PREFIX))
}

/// Load configuration from `dir`, overlaid by `env`.
///
/// Writes a default config file when none exists yet.
pub fn load_config_from(
    dir: &Path,
    env: config::Environment,
) -> Result<AppConfig, config::ConfigError> {
    let path = config_path(dir);
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name(path.to_string_lossy().as_ref()).required(false));

    if cfg!(debug_assertions) {
        // In debug mode, also load a dev-specific config file if it exists.
        let dev_path = dev_config_path(dir);
        info!("Loading config from {path:?} and dev config from {dev_path:?}");
        builder = builder
            .add_source(config::File::with_name(dev_path.to_string_lossy().as_ref()).required(false));
    } else {
        info!("Loading config from {path:?}");
    }

    let config: AppConfig = builder.add_source(env).build()?.try_deserialize()?;

    if !path.exists() {
        if let Err(e) = save_config_to(&path, &config) {
            eprintln!("Failed to save default config to {path:?}: {e}");
        }
    }

    Ok(config)
}

fn save_config_to(path: &Path, cfg: &AppConfig) -> std::io::Result<()> {
    let toml_str = toml::to_string_pretty(cfg).map_err(std::io::Error::other)?;
    fs::write(path, toml_str)
}

// A normalized URL path segment (no leading/trailing slashes, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlSegment(String);

impl UrlSegment {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, &'static str> {
        let t = s
            .into()
            .trim_start_matches('/')
            .trim_end_matches('/')
            .to_string();
        if t.is_empty() {
            Err("empty UrlSegment")
        } else {
            Ok(UrlSegment(t))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for UrlSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for UrlSegment {
    fn deserialize<D>(deserializer: D) -> Result<UrlSegment, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UrlSegment::new(s).map_err(|_| serde::de::Error::custom("url segment must not be empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path(), env(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, RuntimeEnvironment::Development);
        assert!(config.csrf_secret.is_none());
        assert_eq!(config.csrf_path_prefix.as_str(), "api");
        assert_eq!(config.csrf_max_age_secs, 86400);
    }

    #[test]
    fn test_missing_secret_fails_csrf_config() {
        let config = AppConfig::default();
        assert!(matches!(
            config.csrf_config(),
            Err(CsrfError::MissingSecret)
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(
            dir.path(),
            env(&[
                ("LEARNFLOW_CSRF_SECRET", "from-environment"),
                ("LEARNFLOW_ENVIRONMENT", "production"),
                ("LEARNFLOW_PORT", "8080"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.environment.is_production());

        let csrf = config.csrf_config().unwrap();
        assert!(csrf.secure_cookie);
        assert_eq!(csrf.path_prefix, "/api");
        assert_eq!(csrf.max_age.whole_seconds(), 86400);
    }

    #[test]
    fn test_file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILENAME),
            "port = 4000\ncsrf_path_prefix = \"/v1/\"\ncsrf_max_age_secs = 600\ncsrf_secret = \"file-secret\"\n",
        )
        .unwrap();

        let config = load_config_from(dir.path(), env(&[])).unwrap();
        assert_eq!(config.port, 4000);

        let csrf = config.csrf_config().unwrap();
        assert!(!csrf.secure_cookie);
        assert_eq!(csrf.path_prefix, "/v1");
        assert_eq!(csrf.max_age.whole_seconds(), 600);
    }

    #[test]
    fn test_default_file_never_contains_secret() {
        let dir = tempfile::tempdir().unwrap();
        load_config_from(
            dir.path(),
            env(&[("LEARNFLOW_CSRF_SECRET", "do-not-persist")]),
        )
        .unwrap();

        let written = fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILENAME)).unwrap();
        assert!(written.contains("port = 3000"));
        assert!(!written.contains("do-not-persist"));
        assert!(!written.contains("csrf_secret"));
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(dir.path(), env(&[("LEARNFLOW_CSRF_SECRET", "  ")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let config = AppConfig {
            csrf_secret: Some(SecretKey::new("hunter2-hunter2").unwrap()),
            ..AppConfig::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_url_segment_normalization() {
        assert_eq!(UrlSegment::new("/api/").unwrap().as_str(), "api");
        assert!(UrlSegment::new("/").is_err());
    }
}
