// ── Command dispatch ──
//
// Validate, send, then refresh the affected resource so the returned
// state is what Surge reports after the write.

use std::sync::Arc;

use surge_api::SurgeClient;
use tracing::{info, warn};

use crate::command::{Command, parse_outbound_mode};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::ResourceState;

#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<SurgeClient>,
    coordinator: Coordinator,
}

impl Dispatcher {
    pub fn new(client: Arc<SurgeClient>, coordinator: Coordinator) -> Self {
        Self {
            client,
            coordinator,
        }
    }

    /// Execute `cmd` and return the refreshed state of its target.
    ///
    /// Invalid commands and commands aimed at untracked resources fail
    /// before any request is made. A failed send leaves the cache as it
    /// was.
    pub async fn execute(&self, cmd: Command) -> Result<Arc<ResourceState>, CoreError> {
        cmd.validate()?;
        let target = cmd.target();
        if self.coordinator.is_stopped() {
            return Err(CoreError::Stopped);
        }
        if !self.coordinator.is_tracked(&target) {
            return Err(CoreError::UnknownResource { id: target });
        }

        if let Err(e) = self.send(&cmd).await {
            warn!(command = cmd.name(), resource = %target, error = %e, "command failed");
            return Err(e);
        }
        info!(command = cmd.name(), resource = %target, "command applied");

        self.coordinator.refresh_now(&target).await
    }

    async fn send(&self, cmd: &Command) -> Result<(), CoreError> {
        let client = &self.client;
        match cmd {
            Command::SwitchProfile { name } => client.switch_profile(name).await?,
            Command::ReloadProfile => client.reload_profile().await?,
            Command::SetOutboundMode { mode } => {
                let mode = parse_outbound_mode(mode)?;
                client.set_outbound_mode(&mode.to_string()).await?;
            }
            Command::SetFeature { feature, enabled } => {
                client.set_feature(feature, *enabled).await?;
            }
            Command::SelectPolicy { group, policy } => client.select_policy(group, policy).await?,
        }
        Ok(())
    }
}
