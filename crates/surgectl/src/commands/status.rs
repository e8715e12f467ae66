//! `status` and `watch` handlers.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{BoxStream, select_all};
use tabled::Tabled;

use surge_core::{RefreshPhase, Resource, ResourceId, ResourceState, ResourceValue, Session};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util::{self, ResourceView};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Resource")]
    id: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn status_row(v: &ResourceView, styles: &Styles) -> StatusRow {
    StatusRow {
        id: v.id.clone(),
        value: v.summary(),
        state: v.state_label(styles),
        updated: util::format_updated(v.updated),
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let styles = Styles::new(&global.color);

    let mut views = Vec::new();
    for resource in session.resources().await {
        let state = resource.read_state()?;
        views.push(ResourceView::new(&resource, &state));
    }

    let out = output::render_list(
        &global.output,
        &views,
        |v| status_row(v, &styles),
        |v| format!("{}\t{}", v.id, v.summary()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Watch ────────────────────────────────────────────────────────────

/// Print one line per observed change until Ctrl-C.
///
/// In-progress refreshes and refreshes that left the value and availability
/// unchanged are skipped.
pub async fn watch(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let styles = Styles::new(&global.color);

    let mut streams: Vec<BoxStream<'static, (Resource, Arc<ResourceState>)>> = Vec::new();
    for resource in session.resources().await {
        let tagged = resource.clone();
        let stream = resource
            .subscribe()?
            .into_stream()
            .map(move |state| (tagged.clone(), state));
        streams.push(stream.boxed());
    }
    if streams.is_empty() {
        return Ok(());
    }

    let mut changes = select_all(streams);
    let mut last_seen: HashMap<ResourceId, (bool, ResourceValue)> = HashMap::new();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break,
            next = changes.next() => {
                let Some((resource, state)) = next else { break };
                if matches!(state.phase, RefreshPhase::Refreshing | RefreshPhase::Uninitialized) {
                    continue;
                }
                let seen = (state.available, state.value.clone());
                if last_seen.get(&resource.id()) == Some(&seen) {
                    continue;
                }
                last_seen.insert(resource.id(), seen);

                let view = ResourceView::new(&resource, &state);
                let line = match global.output {
                    OutputFormat::Json | OutputFormat::JsonCompact => {
                        serde_json::to_string(&view).map_err(|e| CliError::Io(std::io::Error::other(e)))?
                    }
                    OutputFormat::Plain => format!("{}\t{}", view.id, view.summary()),
                    OutputFormat::Table | OutputFormat::Yaml => format!(
                        "{}  {:<28} {:<24} {}",
                        styles.dim(&util::format_updated(view.updated)),
                        view.id,
                        view.summary(),
                        view.state_label(&styles),
                    ),
                };
                output::print_output(&line, global.quiet);
            }
        }
    }
    Ok(())
}
