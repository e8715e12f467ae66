//! Policy group command handlers.

use serde::Serialize;
use tabled::Tabled;

use surge_core::{ResourceId, ResourceKind, Session};

use crate::cli::{GlobalOpts, GroupArgs, GroupCommand};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util::{self, ResourceView};

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    name: String,
    #[tabled(rename = "Selected")]
    selected: String,
    #[tabled(rename = "Policies")]
    policies: usize,
    #[tabled(rename = "State")]
    state: String,
}

fn group_row(v: &ResourceView, styles: &Styles) -> GroupRow {
    GroupRow {
        name: v.key.clone(),
        selected: styles.active(&v.summary()),
        policies: v.value.options().len(),
        state: v.state_label(styles),
    }
}

#[derive(Serialize)]
struct PolicyEntry {
    name: String,
    selected: bool,
}

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Policy")]
    name: String,
}

pub async fn handle(session: &Session, args: GroupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let styles = Styles::new(&global.color);

    match args.command {
        GroupCommand::List => {
            let views = util::views_of(session, ResourceKind::PolicyGroup).await?;
            let out = output::render_list(
                &global.output,
                &views,
                |v| group_row(v, &styles),
                |v| v.key.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupCommand::Show { name } => {
            let resource = session.resource(&ResourceId::policy_group(&name)).await?;
            let state = util::require_available(&resource)?;
            let current = state.value.current();
            let entries: Vec<PolicyEntry> = state
                .value
                .options()
                .iter()
                .map(|p| PolicyEntry {
                    name: p.clone(),
                    selected: Some(p.as_str()) == current,
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &entries,
                |e| PolicyRow {
                    marker: if e.selected { styles.active("*") } else { String::new() },
                    name: if e.selected { styles.active(&e.name) } else { e.name.clone() },
                },
                |e| e.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupCommand::Select { group, policy } => {
            let resource = session.resource(&ResourceId::policy_group(&group)).await?;
            let before = resource.read_state()?;
            util::ensure_option(&before, &policy, || CliError::NotFound {
                resource_type: "policy".into(),
                identifier: policy.clone(),
                list_command: format!("group show {group}"),
            })?;

            let state = resource.select(&policy).await?;
            if !global.quiet {
                eprintln!("{group} now uses {}", util::summarize(&state.value));
            }
            Ok(())
        }
    }
}
