// ── Command API ──
//
// Typed write intents. The dispatcher validates each one locally before
// anything touches the network.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{OutboundMode, ResourceId};

/// A write to remote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SwitchProfile { name: String },
    ReloadProfile,
    /// Mode as given by the caller; it must parse as an [`OutboundMode`].
    SetOutboundMode { mode: String },
    SetFeature { feature: String, enabled: bool },
    SelectPolicy { group: String, policy: String },
}

impl Command {
    /// The resource whose state this command changes.
    pub fn target(&self) -> ResourceId {
        match self {
            Self::SwitchProfile { .. } | Self::ReloadProfile => ResourceId::profile(),
            Self::SetOutboundMode { .. } => ResourceId::outbound_mode(),
            Self::SetFeature { feature, .. } => ResourceId::feature(feature.clone()),
            Self::SelectPolicy { group, .. } => ResourceId::policy_group(group.clone()),
        }
    }

    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwitchProfile { .. } => "switch_profile",
            Self::ReloadProfile => "reload_profile",
            Self::SetOutboundMode { .. } => "set_outbound_mode",
            Self::SetFeature { .. } => "set_feature",
            Self::SelectPolicy { .. } => "select_policy",
        }
    }

    /// Shape checks that need no remote state.
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::SwitchProfile { name } => non_empty("profile name", name),
            Self::ReloadProfile => Ok(()),
            Self::SetOutboundMode { mode } => parse_outbound_mode(mode).map(|_| ()),
            Self::SetFeature { feature, .. } => non_empty("feature name", feature),
            Self::SelectPolicy { group, policy } => {
                non_empty("policy group", group)?;
                non_empty("policy", policy)
            }
        }
    }
}

pub(crate) fn parse_outbound_mode(mode: &str) -> Result<OutboundMode, CoreError> {
    mode.trim().parse::<OutboundMode>().map_err(|_| {
        CoreError::validation(format!(
            "invalid outbound mode '{mode}' (expected one of: direct, proxy, rule)"
        ))
    })
}

fn non_empty(what: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::validation(format!("{what} must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::ResourceKind;

    #[test]
    fn targets() {
        assert_eq!(
            Command::ReloadProfile.target(),
            ResourceId::new(ResourceKind::Profile, "profile")
        );
        let cmd = Command::SelectPolicy {
            group: "Proxy".into(),
            policy: "HK".into(),
        };
        assert_eq!(cmd.target(), ResourceId::policy_group("Proxy"));
    }

    #[test]
    fn rejects_unknown_outbound_mode() {
        let err = Command::SetOutboundMode { mode: "vpn".into() }
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(
            Command::SetOutboundMode {
                mode: "direct".into()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn rejects_blank_names() {
        let cmd = Command::SelectPolicy {
            group: "Proxy".into(),
            policy: "  ".into(),
        };
        assert_eq!(cmd.validate().unwrap_err().kind(), ErrorKind::Validation);
        let cmd = Command::SwitchProfile { name: String::new() };
        assert!(cmd.validate().is_err());
    }
}
