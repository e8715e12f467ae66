// ── Session ──
//
// Explicit context object for one Surge instance: the shared client, the
// registry, the coordinator, and the dispatcher, wired together by
// `setup`. Dropping a session cancels its timers.

use std::sync::Arc;

use futures_util::future::join_all;
use surge_api::SurgeClient;
use tracing::{info, warn};

use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::coordinator::Coordinator;
use crate::dispatcher::Dispatcher;
use crate::error::CoreError;
use crate::model::{ResourceHandle, ResourceId, ResourceState};
use crate::registry::Registry;
use crate::resource::Resource;

pub struct Session {
    config: ConnectionConfig,
    client: Arc<SurgeClient>,
    registry: Registry,
    coordinator: Coordinator,
    dispatcher: Dispatcher,
}

impl Session {
    /// Connect, probe, discover, and start tracking everything.
    ///
    /// Fails with [`CoreError::Setup`] if the client cannot be built or
    /// the probe (`GET profiles`) fails; nothing is polled in that case.
    pub async fn setup(config: ConnectionConfig) -> Result<Self, CoreError> {
        config.validate().map_err(CoreError::setup)?;
        let base_url = config.base_url().map_err(CoreError::setup)?;
        let client = SurgeClient::new(base_url, &config.api_key, &config.transport())
            .map_err(|e| CoreError::setup(e.into()))?;
        let client = Arc::new(client);

        let profiles = client.get_profiles().await.map_err(|e| {
            warn!(host = %config.host, error = %e, "connection probe failed");
            CoreError::setup(e.into())
        })?;
        info!(
            url = %client.base_url(),
            profiles = profiles.len(),
            "connected to Surge"
        );

        let registry = Registry::new(Arc::clone(&client), &config);
        let coordinator = Coordinator::new(Arc::clone(&client));
        let dispatcher = Dispatcher::new(Arc::clone(&client), coordinator.clone());
        let session = Self {
            config,
            client,
            registry,
            coordinator,
            dispatcher,
        };

        let handles = session.registry.discover().await;
        session.start_all(handles).await;
        Ok(session)
    }

    async fn start_all(&self, handles: Vec<ResourceHandle>) {
        let results = join_all(handles.into_iter().map(|h| self.coordinator.start(h))).await;
        let available = results
            .iter()
            .filter(|r| matches!(r, Ok(state) if state.available))
            .count();
        info!(resources = results.len(), available, "resources tracked");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<SurgeClient> {
        &self.client
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Every tracked resource in registry order.
    pub async fn resources(&self) -> Vec<Resource> {
        self.registry
            .handles()
            .await
            .into_iter()
            .filter(|h| self.coordinator.is_tracked(&h.id()))
            .map(|h| self.make_resource(h))
            .collect()
    }

    pub async fn resource(&self, id: &ResourceId) -> Result<Resource, CoreError> {
        self.registry
            .handles()
            .await
            .into_iter()
            .find(|h| h.id() == *id && self.coordinator.is_tracked(id))
            .map(|h| self.make_resource(h))
            .ok_or_else(|| CoreError::UnknownResource { id: id.clone() })
    }

    fn make_resource(&self, handle: ResourceHandle) -> Resource {
        Resource::new(handle, self.coordinator.clone(), self.dispatcher.clone())
    }

    // ── Operations ───────────────────────────────────────────────────

    pub async fn execute(&self, cmd: Command) -> Result<Arc<ResourceState>, CoreError> {
        self.dispatcher.execute(cmd).await
    }

    /// Re-enumerate policy groups, start tracking any new ones, and
    /// return every known group.
    pub async fn refresh_dynamic(&self) -> Result<Vec<ResourceHandle>, CoreError> {
        let groups = self.registry.refresh_dynamic().await?;
        let untracked: Vec<ResourceHandle> = groups
            .iter()
            .filter(|h| !self.coordinator.is_tracked(&h.id()))
            .cloned()
            .collect();
        if !untracked.is_empty() {
            self.start_all(untracked).await;
        }
        Ok(groups)
    }

    pub async fn take_warnings(&self) -> Vec<String> {
        self.registry.take_warnings().await
    }

    /// Stop every timer and wait for them to finish.
    pub async fn shutdown(&self) {
        self.coordinator.stop().await;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.coordinator.cancel();
    }
}
