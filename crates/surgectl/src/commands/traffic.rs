//! Traffic command handler.

use surge_core::{ResourceId, ResourceValue, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::{self, ResourceView};

fn detail(v: &ResourceView) -> String {
    match v.value {
        ResourceValue::Traffic {
            upload,
            download,
            total,
        } => output::detail_block(&[
            ("Upload", util::format_mb(upload)),
            ("Download", util::format_mb(download)),
            ("Total", util::format_mb(total)),
            ("Updated", util::format_updated(v.updated)),
        ]),
        _ => v.summary(),
    }
}

/// Raw MB counters, tab-separated, for scripts.
fn plain(v: &ResourceView) -> String {
    match v.value {
        ResourceValue::Traffic {
            upload,
            download,
            total,
        } => format!("{upload}\t{download}\t{total}"),
        _ => v.summary(),
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let resource = session.resource(&ResourceId::traffic()).await?;
    let state = util::require_available(&resource)?;
    let view = ResourceView::new(&resource, &state);

    let out = output::render_single(&global.output, &view, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
