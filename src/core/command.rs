//! Generate-package command
//!
//! The host-facing command. It is exposed twice, from the project context
//! menu and from the top-level build menu; each instance answers to one of
//! the two command ids.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::invoker::BuildCommandInvoker;
use super::properties::PackageOnBuildProperty;
use super::resolver::CommandStatusResolver;
use super::state::{CommandStatus, InvocationResult};
use super::target::CommandTarget;
use super::tracker::{BuildLifecycleTracker, Subscription};
use crate::config::defaults::{
    CMD_GENERATE_PACKAGE_PROJECT_CONTEXT_MENU, CMD_GENERATE_PACKAGE_TOP_LEVEL_BUILD,
};
use crate::error::{InvokeError, LifecycleError};
use crate::infra::build_manager::BuildManager;

/// Where the command is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandId {
    /// Project node context menu
    ProjectContextMenu,
    /// Top-level build menu
    TopLevelBuild,
}

impl CommandId {
    /// Numeric id the host dispatches on
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::ProjectContextMenu => CMD_GENERATE_PACKAGE_PROJECT_CONTEXT_MENU,
            Self::TopLevelBuild => CMD_GENERATE_PACKAGE_TOP_LEVEL_BUILD,
        }
    }

    /// Look up a command by its numeric id
    #[must_use]
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            CMD_GENERATE_PACKAGE_PROJECT_CONTEXT_MENU => Some(Self::ProjectContextMenu),
            CMD_GENERATE_PACKAGE_TOP_LEVEL_BUILD => Some(Self::TopLevelBuild),
            _ => None,
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.value())
    }
}

/// Generate-package command bound to one build manager
pub struct GeneratePackageCommand {
    id: CommandId,
    invoker: BuildCommandInvoker,
    resolver: CommandStatusResolver,
    // Keeps the tracker registered so status queries never reach the manager.
    _status_subscription: Subscription,
}

impl GeneratePackageCommand {
    /// Create the command and register with `manager`
    ///
    /// Fails if the manager refuses the registration or cannot report whether
    /// a build is already running.
    pub fn new(
        id: CommandId,
        manager: Arc<dyn BuildManager>,
        property: Arc<dyn PackageOnBuildProperty>,
    ) -> Result<Self, LifecycleError> {
        let tracker = BuildLifecycleTracker::new(Arc::clone(&manager));
        let status_subscription = tracker.subscribe()?;

        tracing::debug!("Registered generate-package command {id}");

        Ok(Self {
            id,
            invoker: BuildCommandInvoker::new(tracker.clone(), manager, property),
            resolver: CommandStatusResolver::new(tracker),
            _status_subscription: status_subscription,
        })
    }

    /// The id this command answers to
    #[must_use]
    pub fn command_id(&self) -> CommandId {
        self.id
    }

    /// Invoke the command if `command_id` is this command's
    pub async fn invoke(
        &self,
        target: &CommandTarget,
        command_id: u32,
    ) -> Result<InvocationResult, InvokeError> {
        if command_id != self.id.value() {
            return Ok(InvocationResult::unhandled());
        }
        self.invoker.invoke(target).await
    }

    /// Host dispatch entry point; `true` when the command handled the call
    pub async fn try_handle(
        &self,
        target: &CommandTarget,
        command_id: u32,
    ) -> Result<bool, InvokeError> {
        Ok(self.invoke(target, command_id).await?.handled)
    }

    /// Host status query
    pub fn get_status(&self, target: &CommandTarget, command_id: u32) -> CommandStatus {
        if command_id != self.id.value() {
            return CommandStatus::unhandled();
        }
        self.resolver.resolve(target)
    }
}

impl fmt::Debug for GeneratePackageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratePackageCommand")
            .field("id", &self.id)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
