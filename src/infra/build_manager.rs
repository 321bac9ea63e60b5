//! Build manager boundary
//!
//! The build manager runs builds on its own execution context and reports
//! their lifecycle to registered listeners. For one build session `Begin` is
//! always delivered before exactly one of `Cancel` or `Done`.

use std::fmt;
use std::sync::Arc;

use crate::core::target::CommandTarget;
use crate::error::{BuildManagerError, BuildRequestError};

/// Lifecycle notification emitted by a build manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEvent {
    /// A build session started
    Begin,
    /// The running session was cancelled
    Cancel,
    /// The running session finished
    Done,
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Begin => "begin",
            Self::Cancel => "cancel",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Receiver of build lifecycle notifications
///
/// Notifications may be delivered from any thread.
pub trait BuildEventListener: Send + Sync {
    /// Handle one notification
    fn on_event(&self, event: BuildEvent);
}

/// Identifier of a listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External build subsystem
pub trait BuildManager: Send + Sync {
    /// Register a listener for lifecycle notifications
    fn register(
        &self,
        listener: Arc<dyn BuildEventListener>,
    ) -> Result<RegistrationId, BuildManagerError>;

    /// Remove a listener registration
    fn unregister(&self, id: RegistrationId) -> Result<(), BuildManagerError>;

    /// Whether a build is currently running
    fn is_building(&self) -> Result<bool, BuildManagerError>;

    /// Ask the manager to build the target
    ///
    /// Returns once the request is accepted; the outcome arrives as
    /// notifications.
    fn request_build(&self, target: &CommandTarget) -> Result<(), BuildRequestError>;

    /// Cancel the running build, returning whether one was running
    fn cancel(&self) -> bool;
}
