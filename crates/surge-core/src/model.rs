// ── Domain model ──
//
// Handles identify what is tracked; states are the cached snapshots the
// coordinator publishes for each handle.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ErrorKind;

/// Fixed keys of the singleton resources.
pub const PROFILE_KEY: &str = "profile";
pub const OUTBOUND_MODE_KEY: &str = "outbound_mode";
pub const TRAFFIC_KEY: &str = "traffic";

// ── Kinds ───────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Profile,
    OutboundMode,
    FeatureToggle,
    PolicyGroup,
    Traffic,
}

impl ResourceKind {
    /// Whether commands can target this kind.
    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Traffic)
    }
}

/// Global routing strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OutboundMode {
    Direct,
    Proxy,
    Rule,
}

impl OutboundMode {
    /// Wire names in display order.
    pub fn options() -> Vec<String> {
        use strum::IntoEnumIterator;
        Self::iter().map(|m| m.to_string()).collect()
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// The `(kind, key)` pair every lookup goes through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub key: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    pub fn profile() -> Self {
        Self::new(ResourceKind::Profile, PROFILE_KEY)
    }

    pub fn outbound_mode() -> Self {
        Self::new(ResourceKind::OutboundMode, OUTBOUND_MODE_KEY)
    }

    pub fn traffic() -> Self {
        Self::new(ResourceKind::Traffic, TRAFFIC_KEY)
    }

    pub fn feature(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::FeatureToggle, name)
    }

    pub fn policy_group(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::PolicyGroup, name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// One trackable unit of remote state. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub key: String,
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,
    /// Feature only present on the macOS build of Surge.
    pub mac_only: bool,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind, key: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            kind,
            key: key.into(),
            poll_interval,
            mac_only: false,
        }
    }

    #[must_use]
    pub fn mac_only(mut self) -> Self {
        self.mac_only = true;
        self
    }

    pub fn id(&self) -> ResourceId {
        ResourceId::new(self.kind, self.key.clone())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

// ── State ───────────────────────────────────────────────────────────

/// Kind-specific payload of a cached state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceValue {
    /// Profile, outbound mode and policy groups: one active option.
    Selection {
        options: Vec<String>,
        current: Option<String>,
    },
    Toggle {
        enabled: bool,
    },
    /// Cumulative traffic in MB (`bytes / 1024`, two decimals).
    Traffic {
        upload: f64,
        download: f64,
        total: f64,
    },
}

impl ResourceValue {
    /// The value a slot holds before its first successful refresh.
    pub fn empty_for(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Profile | ResourceKind::OutboundMode | ResourceKind::PolicyGroup => {
                Self::Selection {
                    options: Vec::new(),
                    current: None,
                }
            }
            ResourceKind::FeatureToggle => Self::Toggle { enabled: false },
            ResourceKind::Traffic => Self::Traffic {
                upload: 0.0,
                download: 0.0,
                total: 0.0,
            },
        }
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            Self::Selection { current, .. } => current.as_deref(),
            _ => None,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Self::Selection { options, .. } => options,
            _ => &[],
        }
    }

    pub fn enabled(&self) -> Option<bool> {
        match self {
            Self::Toggle { enabled } => Some(*enabled),
            _ => None,
        }
    }
}

impl From<surge_api::TrafficStats> for ResourceValue {
    fn from(t: surge_api::TrafficStats) -> Self {
        Self::Traffic {
            upload: t.upload,
            download: t.download,
            total: t.total,
        }
    }
}

/// Refresh lifecycle of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefreshPhase {
    Uninitialized,
    Refreshing,
    Available,
    Unavailable,
}

/// The failure recorded by the last refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&crate::CoreError> for ResourceError {
    fn from(err: &crate::CoreError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Cached snapshot of one resource.
///
/// When `available` is false, `value` still holds the last value that was
/// fetched successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub value: ResourceValue,
    pub available: bool,
    pub last_error: Option<ResourceError>,
    pub last_updated: Option<DateTime<Utc>>,
    pub phase: RefreshPhase,
}

impl ResourceState {
    pub fn uninitialized(kind: ResourceKind) -> Self {
        Self {
            value: ResourceValue::empty_for(kind),
            available: false,
            last_error: None,
            last_updated: None,
            phase: RefreshPhase::Uninitialized,
        }
    }

    pub(crate) fn refreshing(&self) -> Self {
        Self {
            phase: RefreshPhase::Refreshing,
            ..self.clone()
        }
    }

    pub(crate) fn succeeded(value: ResourceValue) -> Self {
        Self {
            value,
            available: true,
            last_error: None,
            last_updated: Some(Utc::now()),
            phase: RefreshPhase::Available,
        }
    }

    pub(crate) fn failed(&self, error: ResourceError) -> Self {
        Self {
            value: self.value.clone(),
            available: false,
            last_error: Some(error),
            last_updated: self.last_updated,
            phase: RefreshPhase::Unavailable,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn outbound_mode_parses_wire_names() {
        assert_eq!("proxy".parse::<OutboundMode>().unwrap(), OutboundMode::Proxy);
        assert_eq!("RULE".parse::<OutboundMode>().unwrap(), OutboundMode::Rule);
        assert!("vpn".parse::<OutboundMode>().is_err());
        assert_eq!(OutboundMode::options(), vec!["direct", "proxy", "rule"]);
    }

    #[test]
    fn resource_id_display() {
        assert_eq!(ResourceId::policy_group("Proxy").to_string(), "policy_group:Proxy");
        assert_eq!(ResourceId::profile().to_string(), "profile:profile");
    }

    #[test]
    fn failure_keeps_last_value() {
        let ok = ResourceState::succeeded(ResourceValue::Toggle { enabled: true });
        let failed = ok.failed(ResourceError {
            kind: ErrorKind::Server,
            message: "boom".into(),
        });
        assert!(!failed.available);
        assert_eq!(failed.value, ResourceValue::Toggle { enabled: true });
        assert_eq!(failed.last_updated, ok.last_updated);
        assert_eq!(failed.phase, RefreshPhase::Unavailable);
    }

    #[test]
    fn uninitialized_state_is_empty() {
        let state = ResourceState::uninitialized(ResourceKind::PolicyGroup);
        assert!(!state.available);
        assert_eq!(state.value.current(), None);
        assert!(state.value.options().is_empty());
        assert_eq!(state.phase, RefreshPhase::Uninitialized);
    }
}
