// ── Runtime connection configuration ──
//
// Describes how to reach one Surge instance and what to track on it.
// Carries the API key but never touches disk; `surge-config` (or any
// other host) builds a `ConnectionConfig` and hands it to `Session`.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use surge_api::{SurgeClient, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_PORT: u16 = 6171;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FEATURES: &[&str] = &["mitm", "capture", "rewrite", "scripting"];
pub const DEFAULT_MAC_FEATURES: &[&str] = &["system_proxy", "enhanced_mode"];

/// Everything needed to connect to a single Surge instance.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub api_key: SecretString,
    pub use_https: bool,
    /// Only meaningful with `use_https`.
    pub verify_ssl: bool,
    /// Extra CA to trust when verifying.
    pub ca_cert: Option<PathBuf>,
    /// Interval applied to every tracked resource.
    pub poll_interval: Duration,
    /// Upper bound for each HTTP request.
    pub timeout: Duration,
    /// Feature toggles present on every Surge build.
    pub features: Vec<String>,
    /// Feature toggles only present on Surge for Mac.
    pub mac_features: Vec<String>,
}

impl ConnectionConfig {
    /// Defaults for everything except where and how to authenticate.
    pub fn new(host: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            api_key,
            use_https: false,
            verify_ssl: true,
            ca_cert: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            features: DEFAULT_FEATURES.iter().map(|s| (*s).to_owned()).collect(),
            mac_features: DEFAULT_MAC_FEATURES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// `scheme://host:port/v1`
    pub fn base_url(&self) -> Result<Url, CoreError> {
        Ok(SurgeClient::base_url_for(
            &self.host,
            self.port,
            self.use_https,
        )?)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match (&self.ca_cert, self.verify_ssl) {
            (_, false) => TlsMode::DangerAcceptInvalid,
            (Some(path), true) => TlsMode::CustomCa(path.clone()),
            (None, true) => TlsMode::System,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config {
                message: "host must not be empty".into(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("192.168.1.10", SecretString::from("key".to_string()))
    }

    #[test]
    fn defaults_match_surge() {
        let config = config();
        assert_eq!(config.port, 6171);
        assert!(!config.use_https);
        assert!(config.verify_ssl);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.features, ["mitm", "capture", "rewrite", "scripting"]);
        assert_eq!(config.mac_features, ["system_proxy", "enhanced_mode"]);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://192.168.1.10:6171/v1"
        );
    }

    #[test]
    fn tls_mode_follows_flags() {
        let mut config = config();
        assert_eq!(config.transport().tls, TlsMode::System);

        config.ca_cert = Some(PathBuf::from("/etc/surge/ca.pem"));
        assert_eq!(
            config.transport().tls,
            TlsMode::CustomCa(PathBuf::from("/etc/surge/ca.pem"))
        );

        config.verify_ssl = false;
        assert_eq!(config.transport().tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = config();
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
