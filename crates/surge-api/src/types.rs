// Wire types for Surge HTTP API responses.
//
// Missing fields fall back to the same placeholders the Surge dashboard
// shows, so a sparse answer still decodes. A body of the wrong JSON type
// (array instead of object, string instead of bool) is a format error.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_PROFILE: &str = "Unknown Profile";
pub const UNKNOWN_MODE: &str = "unknown";
pub const UNKNOWN_POLICY: &str = "Unknown Policy";

/// `GET profiles`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProfileList {
    #[serde(default)]
    pub profiles: Vec<String>,
}

/// `GET profiles/current`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CurrentProfile {
    #[serde(default)]
    pub profile_name: Option<String>,
}

/// `GET features/{feature}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FeatureState {
    #[serde(default)]
    pub enabled: bool,
}

/// `GET outbound`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OutboundState {
    #[serde(default)]
    pub mode: Option<String>,
}

/// `GET policy_groups`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PolicyGroupList {
    #[serde(default)]
    pub groups: Vec<String>,
}

/// `GET traffic`, raw byte counters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct TrafficCounters {
    #[serde(default)]
    pub upload: f64,
    #[serde(default)]
    pub download: f64,
}

/// `GET policy_groups/{name}`: the active member and all candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGroupDetail {
    #[serde(default = "unknown_policy")]
    pub current: String,
    #[serde(default)]
    pub policies: Vec<String>,
}

fn unknown_policy() -> String {
    UNKNOWN_POLICY.into()
}

/// Cumulative traffic, converted from bytes.
///
/// Each figure is `bytes / 1024` rounded to two decimals. `total` is
/// computed from the summed byte counts, not from the rounded figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficStats {
    pub upload: f64,
    pub download: f64,
    pub total: f64,
}

impl TrafficStats {
    pub fn from_bytes(upload_bytes: f64, download_bytes: f64) -> Self {
        Self {
            upload: round2(upload_bytes / 1024.0),
            download: round2(download_bytes / 1024.0),
            total: round2((upload_bytes + download_bytes) / 1024.0),
        }
    }
}

impl From<TrafficCounters> for TrafficStats {
    fn from(raw: TrafficCounters) -> Self {
        Self::from_bytes(raw.upload, raw.download)
    }
}

/// Round half away from zero to two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
