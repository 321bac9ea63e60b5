//! Pack command implementation
//!
//! Implements `packgate pack` to build the selected project with package
//! generation forced on. Ctrl-C cancels the running build.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::{CommandSession, SelectionArgs};
use crate::cli::output::{create_spinner, status, OutputConfig};
use crate::core::command::CommandId;
use crate::core::state::{InvocationOutcome, InvocationResult};
use crate::infra::build_manager::BuildManager;

/// JSON invocation report
#[derive(Debug, Serialize)]
struct PackReport {
    command: CommandId,
    command_id: u32,
    #[serde(flatten)]
    result: InvocationResult,
}

/// Execute the pack command
pub async fn execute(args: &SelectionArgs) -> Result<()> {
    let output = OutputConfig::global();
    let project_dir = args.project_dir()?;
    let target = args.target(&project_dir)?;
    let id = CommandId::from(args.command);

    let session = CommandSession::open(&project_dir, id)?;

    let spinner = output
        .shows_text()
        .then(|| create_spinner(&format!("Building {}...", project_dir.display())));

    let manager = Arc::clone(&session.manager);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling build");
            manager.cancel();
        }
    });

    let result = session.command.invoke(&target, id.value()).await;
    interrupt.abort();
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result.context("generate-package failed")?;

    if output.json {
        let report = PackReport {
            command: id,
            command_id: id.value(),
            result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !result.handled {
        bail!("generate-package does not apply to this selection; select the project itself");
    }

    match result.outcome {
        InvocationOutcome::Succeeded => {
            if output.shows_text() {
                println!("{} Build finished", status::SUCCESS);
            }
            Ok(())
        }
        InvocationOutcome::NotStarted => {
            if output.shows_text() {
                println!(
                    "{} A build is already in progress, nothing started",
                    status::WARNING
                );
            }
            Ok(())
        }
        InvocationOutcome::Cancelled => bail!("Build cancelled"),
    }
}
