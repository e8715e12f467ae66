//! Shared helpers for command handlers.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use surge_core::{
    ErrorKind, RefreshPhase, Resource, ResourceKind, ResourceState, ResourceValue, Session,
};

use crate::error::CliError;
use crate::output::Styles;

/// Serializable snapshot of one resource, shared by every output format.
#[derive(Debug, Serialize)]
pub struct ResourceView {
    pub id: String,
    pub kind: ResourceKind,
    pub key: String,
    pub available: bool,
    pub phase: RefreshPhase,
    pub value: ResourceValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated: Option<DateTime<Utc>>,
}

impl ResourceView {
    pub fn new(resource: &Resource, state: &ResourceState) -> Self {
        Self {
            id: resource.id().to_string(),
            kind: resource.kind(),
            key: resource.handle().key.clone(),
            available: state.available,
            phase: state.phase,
            value: state.value.clone(),
            error: state.last_error.as_ref().map(|e| e.message.clone()),
            updated: state.last_updated,
        }
    }

    pub fn summary(&self) -> String {
        summarize(&self.value)
    }

    /// Availability word, with the last error appended when down.
    pub fn state_label(&self, styles: &Styles) -> String {
        match self.error {
            Some(ref err) if !self.available => {
                format!("{} {}", styles.availability(false), styles.dim(err))
            }
            _ => styles.availability(self.available),
        }
    }
}

/// Views of every tracked resource of one kind, in registry order.
pub async fn views_of(session: &Session, kind: ResourceKind) -> Result<Vec<ResourceView>, CliError> {
    let mut views = Vec::new();
    for resource in session.resources().await {
        if resource.kind() == kind {
            let state = resource.read_state()?;
            views.push(ResourceView::new(&resource, &state));
        }
    }
    Ok(views)
}

/// One-line rendering of a value.
pub fn summarize(value: &ResourceValue) -> String {
    match value {
        ResourceValue::Selection { current, .. } => current.clone().unwrap_or_else(|| "-".into()),
        ResourceValue::Toggle { enabled } => on_off(*enabled).into(),
        ResourceValue::Traffic {
            upload, download, ..
        } => format!("↑ {}  ↓ {}", format_mb(*upload), format_mb(*download)),
    }
}

pub fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Human-readable size from a megabyte count.
pub fn format_mb(mb: f64) -> String {
    const UNITS: [&str; 4] = ["MB", "GB", "TB", "PB"];
    let mut value = mb;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

pub fn format_updated(updated: Option<DateTime<Utc>>) -> String {
    updated.map_or_else(
        || "never".into(),
        |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

/// The resource's state, or an error carrying its last failure.
pub fn require_available(resource: &Resource) -> Result<Arc<ResourceState>, CliError> {
    let state = resource.read_state()?;
    if state.available {
        return Ok(state);
    }
    let (kind, message) = state.last_error.as_ref().map_or_else(
        || (ErrorKind::Connectivity, "no successful refresh yet".to_owned()),
        |e| (e.kind, e.message.clone()),
    );
    Err(CliError::Unavailable {
        resource: resource.id().to_string(),
        kind,
        message,
    })
}

/// Reject `option` locally when the resource already knows its options.
pub fn ensure_option(
    state: &ResourceState,
    option: &str,
    not_found: impl FnOnce() -> CliError,
) -> Result<(), CliError> {
    let options = state.value.options();
    if state.available && !options.is_empty() && !options.iter().any(|o| o == option) {
        return Err(not_found());
    }
    Ok(())
}
