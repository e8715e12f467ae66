//! Feature toggle command handlers.

use tabled::Tabled;

use surge_core::{ResourceId, ResourceKind, Session};

use crate::cli::{FeatureArgs, FeatureCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util::{self, ResourceView};

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn feature_row(v: &ResourceView, styles: &Styles) -> FeatureRow {
    let enabled = v.value.enabled().unwrap_or(false);
    FeatureRow {
        name: v.key.clone(),
        enabled: if enabled {
            styles.active(util::on_off(true))
        } else {
            util::on_off(false).into()
        },
        state: v.state_label(styles),
        updated: util::format_updated(v.updated),
    }
}

pub async fn handle(session: &Session, args: FeatureArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let styles = Styles::new(&global.color);

    match args.command {
        FeatureCommand::List => {
            let views = util::views_of(session, ResourceKind::FeatureToggle).await?;
            let out = output::render_list(
                &global.output,
                &views,
                |v| feature_row(v, &styles),
                |v| format!("{}\t{}", v.key, v.summary()),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FeatureCommand::On { name } => set(session, &name, true, global).await,
        FeatureCommand::Off { name } => set(session, &name, false, global).await,
    }
}

async fn set(session: &Session, name: &str, enabled: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let resource = session.resource(&ResourceId::feature(name)).await?;
    let state = resource.set_enabled(enabled).await?;
    if !global.quiet {
        eprintln!("{name} is now {}", util::summarize(&state.value));
    }
    Ok(())
}
