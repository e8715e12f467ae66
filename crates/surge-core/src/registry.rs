// ── Resource registry ──
//
// Builds the ordered set of trackable handles: the static kinds first,
// then policy groups as the server lists them. Groups are only ever
// added; one that disappears remotely stays tracked (and goes
// unavailable) until the session is rebuilt.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use surge_api::SurgeClient;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::model::{
    OUTBOUND_MODE_KEY, PROFILE_KEY, ResourceHandle, ResourceKind, TRAFFIC_KEY,
};

/// Enumerates the resources of one Surge instance.
///
/// Cheaply cloneable; clones share the known-group set and warnings.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    client: Arc<SurgeClient>,
    poll_interval: Duration,
    features: Vec<String>,
    mac_features: Vec<String>,
    groups: Mutex<IndexMap<String, ResourceHandle>>,
    warnings: Mutex<Vec<String>>,
}

impl Registry {
    pub fn new(client: Arc<SurgeClient>, config: &ConnectionConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                client,
                poll_interval: config.poll_interval,
                features: config.features.clone(),
                mac_features: config.mac_features.clone(),
                groups: Mutex::new(IndexMap::new()),
                warnings: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Handles that exist regardless of what the server reports, in
    /// tracking order: profile, outbound mode, traffic, features, then
    /// Mac-only features. A feature named in both lists is tracked once,
    /// as Mac-only.
    pub fn static_handles(&self) -> Vec<ResourceHandle> {
        let interval = self.inner.poll_interval;
        let mut handles = vec![
            ResourceHandle::new(ResourceKind::Profile, PROFILE_KEY, interval),
            ResourceHandle::new(ResourceKind::OutboundMode, OUTBOUND_MODE_KEY, interval),
            ResourceHandle::new(ResourceKind::Traffic, TRAFFIC_KEY, interval),
        ];
        let mut seen: HashSet<&str> = HashSet::new();
        handles.extend(
            self.inner
                .features
                .iter()
                .filter(|f| !self.inner.mac_features.contains(f) && seen.insert(f.as_str()))
                .map(|f| ResourceHandle::new(ResourceKind::FeatureToggle, f.as_str(), interval)),
        );
        handles.extend(
            self.inner
                .mac_features
                .iter()
                .filter(|f| seen.insert(f.as_str()))
                .map(|f| {
                    ResourceHandle::new(ResourceKind::FeatureToggle, f.as_str(), interval).mac_only()
                }),
        );
        handles
    }

    /// Build the full handle set.
    ///
    /// A failed group enumeration is not fatal: it is logged, recorded
    /// for [`take_warnings`](Self::take_warnings), and the static set plus
    /// any previously known groups is returned.
    pub async fn discover(&self) -> Vec<ResourceHandle> {
        if let Err(e) = self.refresh_dynamic().await {
            warn!(error = %e, "failed to enumerate policy groups");
            self.inner
                .warnings
                .lock()
                .await
                .push(format!("Policy groups unavailable: {e}"));
        }
        self.handles().await
    }

    /// Ask the server for policy groups, merge in any not seen before,
    /// and return every known group in discovery order.
    ///
    /// Repeated calls against an unchanged server return the same handles.
    pub async fn refresh_dynamic(&self) -> Result<Vec<ResourceHandle>, CoreError> {
        let names = self.inner.client.get_policy_groups().await?;
        let mut groups = self.inner.groups.lock().await;
        let mut added = 0_usize;

        for name in names {
            if name.is_empty() || groups.contains_key(&name) {
                continue;
            }
            let handle =
                ResourceHandle::new(ResourceKind::PolicyGroup, name.clone(), self.inner.poll_interval);
            groups.insert(name, handle);
            added += 1;
        }

        if added == 0 {
            debug!(known = groups.len(), "no new policy groups");
        } else {
            info!(added, known = groups.len(), "discovered policy groups");
        }
        Ok(groups.values().cloned().collect())
    }

    /// Every known handle: static ones, then groups in discovery order.
    pub async fn handles(&self) -> Vec<ResourceHandle> {
        let mut handles = self.static_handles();
        handles.extend(self.policy_groups().await);
        handles
    }

    pub async fn policy_groups(&self) -> Vec<ResourceHandle> {
        self.inner.groups.lock().await.values().cloned().collect()
    }

    /// Drain non-fatal problems recorded since the last call.
    pub async fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.warnings.lock().await)
    }
}
