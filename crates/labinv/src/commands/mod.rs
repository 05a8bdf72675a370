//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod ai;
pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod items;
pub mod profile;
pub mod route;
pub mod scan;
pub mod types;
pub mod util;
pub mod vendors;

use labinv_core::Lab;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, lab: &Lab, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Items(args) => items::handle(lab, args, global).await,
        Command::Vendors(args) => vendors::handle(lab, args, global).await,
        Command::Types(args) => types::handle(lab, args, global).await,
        Command::Dashboard => dashboard::handle(lab, global),
        Command::Profile(args) => profile::handle(lab, args, global).await,
        Command::Ai(args) => ai::handle(lab, args, global).await,
        Command::Scan(args) => scan::handle(lab, args, global).await,
        // Handled before a session is opened
        Command::Auth(_) | Command::Route(_) | Command::Config(_) | Command::Completions(_) => {
            Ok(())
        }
    }
}
