//! Command status resolution
//!
//! Answers "is the command supported and enabled right now" for the UI
//! polling path. Never suspends and never requests anything from the build
//! manager.

use super::gate;
use super::state::CommandStatus;
use super::target::CommandTarget;
use super::tracker::BuildLifecycleTracker;

/// Resolves command status from the tracker's current state
///
/// The tracker should hold a live subscription (as [`GeneratePackageCommand`]
/// does) so that resolving reads notification-driven state only. An
/// unsubscribed tracker falls back to the manager's busy query.
///
/// [`GeneratePackageCommand`]: super::command::GeneratePackageCommand
#[derive(Debug, Clone)]
pub struct CommandStatusResolver {
    tracker: BuildLifecycleTracker,
}

impl CommandStatusResolver {
    pub fn new(tracker: BuildLifecycleTracker) -> Self {
        Self { tracker }
    }

    /// Status of the command for `target`
    pub fn resolve(&self, target: &CommandTarget) -> CommandStatus {
        if let Err(e) = target.project_root() {
            tracing::trace!("Command not applicable: {e}");
            return CommandStatus::unhandled();
        }
        gate::status_for(&self.tracker.current_state())
    }
}
