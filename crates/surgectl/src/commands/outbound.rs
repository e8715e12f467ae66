//! Outbound mode command handlers.

use surge_core::{ResourceId, Session};

use crate::cli::{GlobalOpts, OutboundArgs, OutboundCommand};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util::{self, ResourceView};

fn detail(v: &ResourceView, styles: &Styles) -> String {
    let options = v
        .value
        .options()
        .iter()
        .map(|o| {
            if Some(o.as_str()) == v.value.current() {
                styles.active(o)
            } else {
                o.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");

    output::detail_block(&[
        ("Mode", v.summary()),
        ("Options", options),
        ("State", v.state_label(styles)),
        ("Updated", util::format_updated(v.updated)),
    ])
}

pub async fn handle(session: &Session, args: OutboundArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resource = session.resource(&ResourceId::outbound_mode()).await?;
    let styles = Styles::new(&global.color);

    match args.command {
        OutboundCommand::Get => {
            let state = util::require_available(&resource)?;
            let view = ResourceView::new(&resource, &state);
            let out = output::render_single(
                &global.output,
                &view,
                |v| detail(v, &styles),
                ResourceView::summary,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OutboundCommand::Set { mode } => {
            let state = resource.select(&mode).await?;
            if !global.quiet {
                eprintln!("Outbound mode is now {}", util::summarize(&state.value));
            }
            Ok(())
        }
    }
}
