//! Status command implementation
//!
//! Implements `packgate status` to report whether generate-package is
//! supported and enabled for a selection.

use anyhow::Result;
use serde::Serialize;

use super::{CommandSession, SelectionArgs};
use crate::cli::output::{status, OutputConfig};
use crate::core::command::CommandId;
use crate::core::state::CommandStatus;

/// JSON status report
#[derive(Debug, Serialize)]
struct StatusReport {
    command: CommandId,
    command_id: u32,
    #[serde(flatten)]
    status: CommandStatus,
}

/// Execute the status command
pub fn execute(args: &SelectionArgs) -> Result<()> {
    let output = OutputConfig::global();
    let project_dir = args.project_dir()?;
    let target = args.target(&project_dir)?;
    let id = CommandId::from(args.command);

    let session = CommandSession::open(&project_dir, id)?;
    let command_status = session.command.get_status(&target, id.value());
    tracing::info!("Status for {}: {command_status:?}", project_dir.display());

    if output.json {
        let report = StatusReport {
            command: id,
            command_id: id.value(),
            status: command_status,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if output.quiet {
        return Ok(());
    }

    if !command_status.handled {
        println!("{} generate-package does not apply to this selection", status::INFO);
    } else if command_status.flags.enabled {
        println!(
            "{} generate-package is available ({})",
            status::SUCCESS,
            command_status.flags
        );
    } else {
        println!(
            "{} generate-package is disabled while a build is in progress",
            status::WARNING
        );
    }

    Ok(())
}
