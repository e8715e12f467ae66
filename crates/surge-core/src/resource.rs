// ── Resource facade ──
//
// A cloneable view over one tracked handle. Hosts adapt these to their
// own entity model instead of reaching into the coordinator.

use std::sync::Arc;

use crate::command::Command;
use crate::coordinator::Coordinator;
use crate::dispatcher::Dispatcher;
use crate::error::CoreError;
use crate::model::{ResourceHandle, ResourceId, ResourceKind, ResourceState};
use crate::stream::ResourceStream;

#[derive(Clone)]
pub struct Resource {
    handle: ResourceHandle,
    coordinator: Coordinator,
    dispatcher: Dispatcher,
}

impl Resource {
    pub(crate) fn new(handle: ResourceHandle, coordinator: Coordinator, dispatcher: Dispatcher) -> Self {
        Self {
            handle,
            coordinator,
            dispatcher,
        }
    }

    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    pub fn id(&self) -> ResourceId {
        self.handle.id()
    }

    pub fn kind(&self) -> ResourceKind {
        self.handle.kind
    }

    pub fn is_writable(&self) -> bool {
        self.handle.kind.is_writable()
    }

    pub fn read_state(&self) -> Result<Arc<ResourceState>, CoreError> {
        self.coordinator.current_state(&self.id())
    }

    pub fn subscribe(&self) -> Result<ResourceStream, CoreError> {
        self.coordinator.subscribe(&self.id())
    }

    pub async fn refresh(&self) -> Result<Arc<ResourceState>, CoreError> {
        self.coordinator.refresh_now(&self.id()).await
    }

    /// Make `option` the active choice of a selection resource.
    pub async fn select(&self, option: &str) -> Result<Arc<ResourceState>, CoreError> {
        let cmd = match self.handle.kind {
            ResourceKind::Profile => Command::SwitchProfile {
                name: option.to_owned(),
            },
            ResourceKind::OutboundMode => Command::SetOutboundMode {
                mode: option.to_owned(),
            },
            ResourceKind::PolicyGroup => Command::SelectPolicy {
                group: self.handle.key.clone(),
                policy: option.to_owned(),
            },
            ResourceKind::FeatureToggle | ResourceKind::Traffic => {
                return Err(self.not_supported("select"));
            }
        };
        self.dispatcher.execute(cmd).await
    }

    /// Turn a feature toggle on or off.
    pub async fn set_enabled(&self, enabled: bool) -> Result<Arc<ResourceState>, CoreError> {
        if self.handle.kind != ResourceKind::FeatureToggle {
            return Err(self.not_supported("set_enabled"));
        }
        self.dispatcher
            .execute(Command::SetFeature {
                feature: self.handle.key.clone(),
                enabled,
            })
            .await
    }

    fn not_supported(&self, op: &str) -> CoreError {
        CoreError::validation(format!("{} does not support {op}", self.id()))
    }
}
