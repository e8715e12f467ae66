//! Command dispatch: bridges CLI args -> session resources -> output formatting.

pub mod config_cmd;
pub mod feature;
pub mod group;
pub mod outbound;
pub mod profile;
pub mod status;
pub mod traffic;
pub mod util;

use surge_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(session, global).await,
        Command::Watch(_) => status::watch(session, global).await,
        Command::Profile(args) => profile::handle(session, args, global).await,
        Command::Outbound(args) => outbound::handle(session, args, global).await,
        Command::Feature(args) => feature::handle(session, args, global).await,
        Command::Group(args) => group::handle(session, args, global).await,
        Command::Traffic => traffic::handle(session, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
