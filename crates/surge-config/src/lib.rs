//! Shared configuration for Surge tools.
//!
//! TOML instances, API-key resolution (env + keyring + plaintext), and
//! translation to `surge_core::ConnectionConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use surge_core::ConnectionConfig;
use surge_core::config::{
    DEFAULT_FEATURES, DEFAULT_MAC_FEATURES, DEFAULT_POLL_INTERVAL, DEFAULT_PORT, DEFAULT_TIMEOUT,
};

/// Keyring service name; entries are keyed `{instance}/api-key`.
pub const KEYRING_SERVICE: &str = "surge-sync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for instance '{instance}'")]
    NoCredentials { instance: String },

    #[error("instance '{instance}' not found in config")]
    UnknownInstance { instance: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Instance used when none is named on the command line.
    pub default_instance: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Surge endpoints.
    #[serde(default)]
    pub instances: HashMap<String, Instance>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_instance: Some("default".into()),
            defaults: Defaults::default(),
            instances: HashMap::new(),
        }
    }
}

impl Config {
    /// The instance name to use: the explicit one, else the configured
    /// default, else `"default"`.
    pub fn instance_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_instance.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn instance(&self, name: &str) -> Result<&Instance, ConfigError> {
        self.instances
            .get(name)
            .ok_or_else(|| ConfigError::UnknownInstance {
                instance: name.into(),
            })
    }
}

/// Fallbacks for instances that leave a setting unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named Surge instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Instance {
    /// Host name or IP of the Mac/iOS device running Surge.
    pub host: String,

    /// HTTP API port (Surge default 6171).
    pub port: Option<u16>,

    #[serde(default)]
    pub https: bool,

    /// Skip certificate verification (self-signed HTTPS API).
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Override poll interval (seconds).
    pub poll_interval: Option<u64>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Feature toggles to track instead of the built-in list.
    pub features: Option<Vec<String>>,

    /// Mac-only feature toggles to track instead of the built-in list.
    pub mac_features: Option<Vec<String>>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "surge-sync", "surgectl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("surgectl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) layered under `SURGE_`
/// environment variables. Nested keys use `__`, e.g.
/// `SURGE_DEFAULTS__POLL_INTERVAL=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SURGE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(instance: &Instance, name: &str) -> Result<SecretString, ConfigError> {
    // 1. Instance's api_key_env → env var lookup
    if let Some(val) = instance
        .api_key_env
        .as_deref()
        .and_then(|env_name| std::env::var(env_name).ok())
    {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(secret) = keyring_entry(name)
        .ok()
        .and_then(|entry| entry.get_password().ok())
    {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref key) = instance.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        instance: name.into(),
    })
}

/// Store an API key for `name` in the system keyring.
pub fn store_api_key(name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(name)?.set_password(key)?;
    Ok(())
}

fn keyring_entry(name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{name}/api-key"))
}

/// Build a `ConnectionConfig` from an instance, no CLI flag overrides.
///
/// Instance fields win over `defaults`, which win over the built-in
/// Surge defaults.
pub fn instance_to_connection_config(
    instance: &Instance,
    name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    validate_instance(instance, name, defaults)?;
    let api_key = resolve_api_key(instance, name)?;
    build_connection_config(instance, name, defaults, api_key)
}

/// Same layering as [`instance_to_connection_config`] with an API key
/// the caller already resolved (e.g. from a command-line flag).
pub fn build_connection_config(
    instance: &Instance,
    name: &str,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<ConnectionConfig, ConfigError> {
    let poll_secs = validate_instance(instance, name, defaults)?;

    let mut config = ConnectionConfig::new(instance.host.trim(), api_key);
    config.port = instance.port.unwrap_or(DEFAULT_PORT);
    config.use_https = instance.https;
    config.verify_ssl = !instance.insecure.unwrap_or(false);
    config.ca_cert.clone_from(&instance.ca_cert);
    config.poll_interval = Duration::from_secs(poll_secs);
    config.timeout = Duration::from_secs(instance.timeout.unwrap_or(defaults.timeout));
    config.features = instance
        .features
        .clone()
        .unwrap_or_else(|| to_strings(DEFAULT_FEATURES));
    config.mac_features = instance
        .mac_features
        .clone()
        .unwrap_or_else(|| to_strings(DEFAULT_MAC_FEATURES));
    Ok(config)
}

/// Check host and poll interval; returns the effective interval.
fn validate_instance(instance: &Instance, name: &str, defaults: &Defaults) -> Result<u64, ConfigError> {
    if instance.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("instance '{name}' has no host"),
        });
    }
    if instance.port == Some(0) {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        });
    }
    let poll_secs = instance.poll_interval.unwrap_or(defaults.poll_interval);
    if poll_secs == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(poll_secs)
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn instance(host: &str) -> Instance {
        Instance {
            host: host.into(),
            api_key: Some("plain-key".into()),
            ..Instance::default()
        }
    }

    #[test]
    fn loads_instances_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_instance = "mac"

[defaults]
poll_interval = 15

[instances.mac]
host = "192.168.1.20"
port = 6170
api_key = "abc"
features = ["mitm"]
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.instance_name(None), "mac");
        assert_eq!(cfg.instance_name(Some("other")), "other");
        assert_eq!(cfg.defaults.poll_interval, 15);
        assert_eq!(cfg.defaults.timeout, 10);

        let mac = cfg.instance("mac").unwrap();
        assert_eq!(mac.port, Some(6170));
        assert!(matches!(
            cfg.instance("nope"),
            Err(ConfigError::UnknownInstance { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.poll_interval, 30);
        assert!(cfg.instances.is_empty());
    }

    #[test]
    fn connection_config_applies_layering() {
        let mut inst = instance(" 10.0.0.2 ");
        inst.insecure = Some(true);
        inst.https = true;
        inst.timeout = Some(3);
        let defaults = Defaults {
            poll_interval: 20,
            ..Defaults::default()
        };

        let config = instance_to_connection_config(&inst, "test-layering", &defaults).unwrap();
        assert_eq!(config.host, "10.0.0.2");
        assert_eq!(config.port, 6171);
        assert!(config.use_https);
        assert!(!config.verify_ssl);
        assert_eq!(config.poll_interval, Duration::from_secs(20));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.features.len(), 4);
        assert_eq!(config.api_key.expose_secret(), "plain-key");
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut inst = instance("10.0.0.2");
        inst.poll_interval = Some(0);
        let err = instance_to_connection_config(&inst, "test-zero", &Defaults::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "poll_interval"));
    }

    #[test]
    fn rejects_empty_host() {
        let err = instance_to_connection_config(&instance(""), "test-host", &Defaults::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }
}
