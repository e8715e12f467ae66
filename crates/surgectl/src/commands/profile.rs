//! Profile command handlers.

use serde::Serialize;
use tabled::Tabled;

use surge_core::{Command, ResourceId, ResourceKind, Session};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util;

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    active: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Profile")]
    name: String,
}

pub async fn handle(session: &Session, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resource = session.resource(&ResourceId::profile()).await?;
    let styles = Styles::new(&global.color);

    match args.command {
        ProfileCommand::List => {
            let state = util::require_available(&resource)?;
            let current = state.value.current();
            let entries: Vec<ProfileEntry> = state
                .value
                .options()
                .iter()
                .map(|name| ProfileEntry {
                    name: name.clone(),
                    active: Some(name.as_str()) == current,
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &entries,
                |e| ProfileRow {
                    marker: if e.active { styles.active("*") } else { String::new() },
                    name: if e.active { styles.active(&e.name) } else { e.name.clone() },
                },
                |e| e.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Current => {
            let state = util::require_available(&resource)?;
            let view = util::ResourceView::new(&resource, &state);
            let out = output::render_single(
                &global.output,
                &view,
                util::ResourceView::summary,
                util::ResourceView::summary,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Switch { name } => {
            let before = resource.read_state()?;
            util::ensure_option(&before, &name, || CliError::not_found(ResourceKind::Profile, &name))?;

            let state = resource.select(&name).await?;
            if !global.quiet {
                eprintln!("Switched to profile '{}'", util::summarize(&state.value));
            }
            Ok(())
        }

        ProfileCommand::Reload => {
            let state = session.execute(Command::ReloadProfile).await?;
            if !global.quiet {
                eprintln!("Reloaded profile '{}'", util::summarize(&state.value));
            }
            Ok(())
        }
    }
}
