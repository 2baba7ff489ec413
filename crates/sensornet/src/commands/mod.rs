//! Command dispatch: bridges CLI args -> core engine -> output formatting.

pub mod actions;
pub mod config_cmd;
pub mod devices;
pub mod profile;
pub mod sensors;
pub mod util;
pub mod watch;

use sensornet_core::DashboardConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sensors(args) => sensors::handle(&config, args, global).await,
        Command::Actions(args) => actions::handle(&config, args, global).await,
        Command::Status => devices::status(config, global).await,
        Command::Toggle(args) => devices::toggle(config, args, global).await,
        Command::Watch(args) => watch::handle(&config, args, global).await,
        // Local commands are handled before dispatch
        Command::Config(_) | Command::Profile(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "not a server command".into(),
            })
        }
    }
}
