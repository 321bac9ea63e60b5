//! Build command invocation
//!
//! Runs one generate-package invocation end to end: validate the target,
//! consult the gate, request the build, wait for its terminal notification
//! and report the outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::gate;
use super::properties::PackageOnBuildProperty;
use super::state::InvocationResult;
use super::target::CommandTarget;
use super::tracker::BuildLifecycleTracker;
use crate::error::{BuildRequestError, InvokeError};
use crate::infra::build_manager::BuildManager;

/// Marks an invocation as suspended on this invoker until dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Forces the package-on-build property until dropped
struct PropertyOverride<'a>(&'a dyn PackageOnBuildProperty);

impl<'a> PropertyOverride<'a> {
    fn force(property: &'a dyn PackageOnBuildProperty, value: bool) -> Self {
        property.override_generate_on_build(Some(value));
        Self(property)
    }
}

impl Drop for PropertyOverride<'_> {
    fn drop(&mut self) {
        self.0.override_generate_on_build(None);
    }
}

/// Starts builds and waits for their outcome
pub struct BuildCommandInvoker {
    tracker: BuildLifecycleTracker,
    manager: Arc<dyn BuildManager>,
    property: Arc<dyn PackageOnBuildProperty>,
    in_flight: AtomicBool,
}

impl BuildCommandInvoker {
    /// Create an invoker sharing `tracker`'s view of the build manager
    pub fn new(
        tracker: BuildLifecycleTracker,
        manager: Arc<dyn BuildManager>,
        property: Arc<dyn PackageOnBuildProperty>,
    ) -> Self {
        Self {
            tracker,
            manager,
            property,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Invoke the command against `target`
    ///
    /// An invalid target yields `handled = false`. A running build yields a
    /// handled no-op, including one the manager reports as busy before its
    /// begin notification arrived. Otherwise exactly one build is requested and the call
    /// suspends until the manager reports it cancelled or done; there is no
    /// timeout. The transient subscription and the property override are
    /// released on every exit path, including the future being dropped.
    pub async fn invoke(&self, target: &CommandTarget) -> Result<InvocationResult, InvokeError> {
        if let Err(e) = target.project_root() {
            tracing::debug!("Ignoring invocation: {e}");
            return Ok(InvocationResult::unhandled());
        }

        if !gate::can_start(&self.tracker.current_state()) {
            tracing::info!("Build already in progress, not starting another");
            return Ok(InvocationResult::not_started());
        }

        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::info!("Invocation already waiting for a build, not starting another");
            return Ok(InvocationResult::not_started());
        };

        let mut subscription = self.tracker.subscribe()?;
        let _override = PropertyOverride::force(self.property.as_ref(), true);

        match self.manager.request_build(target) {
            Ok(()) => tracing::info!("Build requested, waiting for it to finish"),
            // Another client started a build whose begin has not reached us yet
            Err(BuildRequestError::Busy) => {
                tracing::info!("Build manager is busy, not starting another");
                return Ok(InvocationResult::not_started());
            }
            Err(e) => return Err(e.into()),
        }

        let outcome = subscription.wait_terminal().await?;
        self.tracker.unsubscribe(subscription);

        tracing::info!("Build finished: {outcome:?}");
        Ok(InvocationResult::finished(outcome))
    }
}
