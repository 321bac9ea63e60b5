//! Build lifecycle tracking
//!
//! [`BuildLifecycleTracker`] turns the build manager's begin/cancel/done
//! notifications into one shared [`BuildState`] and fans terminal
//! notifications out to every live [`Subscription`].
//!
//! The tracker holds a listener registration with the manager only while it
//! has at least one subscriber. The first subscription registers, the last
//! release unregisters.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::oneshot;

use super::state::{BuildState, TerminalOutcome};
use crate::error::LifecycleError;
use crate::infra::build_manager::{BuildEvent, BuildEventListener, BuildManager, RegistrationId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identifier of a tracker subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State written by the notification handlers
#[derive(Default)]
struct TrackerInner {
    state: BuildState,
    next_subscription: u64,
    /// One slot per live subscription; emptied once its signal fired
    waiters: HashMap<SubscriptionId, Option<oneshot::Sender<TerminalOutcome>>>,
}

#[derive(Default)]
struct TrackerShared {
    inner: Mutex<TrackerInner>,
    /// Serialises register/unregister transitions with the manager
    registration: Mutex<Option<RegistrationId>>,
}

impl TrackerShared {
    fn handle(&self, event: BuildEvent) {
        let mut inner = lock(&self.inner);
        match event {
            BuildEvent::Begin => {
                if inner.state.in_progress {
                    tracing::warn!("Received build begin while a build is already in progress");
                }
                inner.state.in_progress = true;
            }
            BuildEvent::Cancel => Self::finish(&mut inner, TerminalOutcome::Cancelled),
            BuildEvent::Done => Self::finish(&mut inner, TerminalOutcome::Succeeded),
        }
        tracing::debug!("Build {event}: {:?}", inner.state);
    }

    fn finish(inner: &mut TrackerInner, outcome: TerminalOutcome) {
        inner.state.in_progress = false;
        inner.state.last_outcome = outcome.into();

        for slot in inner.waiters.values_mut() {
            if let Some(sender) = slot.take() {
                // The receiver may already be gone if its owner stopped waiting
                let _ = sender.send(outcome);
            }
        }
    }
}

/// Listener handed to the build manager
///
/// Holds the tracker weakly so a manager that outlives the tracker does not
/// keep it alive.
struct TrackerListener {
    shared: Weak<TrackerShared>,
}

impl BuildEventListener for TrackerListener {
    fn on_event(&self, event: BuildEvent) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle(event);
        }
    }
}

/// Shared build lifecycle state fed by a build manager
#[derive(Clone)]
pub struct BuildLifecycleTracker {
    manager: Arc<dyn BuildManager>,
    shared: Arc<TrackerShared>,
}

impl BuildLifecycleTracker {
    /// Create a tracker for `manager`
    ///
    /// No registration happens until the first [`subscribe`](Self::subscribe).
    pub fn new(manager: Arc<dyn BuildManager>) -> Self {
        Self {
            manager,
            shared: Arc::new(TrackerShared::default()),
        }
    }

    /// Current build state snapshot
    ///
    /// While registered this is the notification-driven state and never
    /// calls the manager. Without a registration notifications are not being
    /// observed, so the snapshot takes its in-progress flag from the
    /// manager's busy query instead. That answer is returned only; the
    /// shared state stays owned by the notification handlers.
    pub fn current_state(&self) -> BuildState {
        let registered = lock(&self.shared.registration).is_some();
        let mut state = lock(&self.shared.inner).state;
        if !registered {
            match self.manager.is_building() {
                Ok(building) => state.in_progress = building,
                Err(e) => tracing::debug!("Busy query failed, using last known state: {e}"),
            }
        }
        state
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.inner).waiters.len()
    }

    /// Whether a listener is registered with the build manager
    pub fn is_registered(&self) -> bool {
        lock(&self.shared.registration).is_some()
    }

    /// Subscribe to build lifecycle notifications
    ///
    /// The first subscriber registers with the build manager and seeds the
    /// in-progress flag from the manager's busy query. On failure nothing is
    /// left registered.
    pub fn subscribe(&self) -> Result<Subscription, LifecycleError> {
        let mut registration = lock(&self.shared.registration);

        if registration.is_none() {
            *registration = Some(self.register()?);
        }

        let (sender, receiver) = oneshot::channel();
        let id = {
            let mut inner = lock(&self.shared.inner);
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;
            inner.waiters.insert(id, Some(sender));
            id
        };
        tracing::debug!("Added build lifecycle subscription {id}");

        Ok(Subscription {
            id,
            tracker: self.clone(),
            receiver: Some(receiver),
            released: false,
        })
    }

    /// Release a subscription
    ///
    /// Equivalent to dropping it.
    pub fn unsubscribe(&self, mut subscription: Subscription) {
        subscription.release();
    }

    fn register(&self) -> Result<RegistrationId, LifecycleError> {
        let listener: Arc<dyn BuildEventListener> = Arc::new(TrackerListener {
            shared: Arc::downgrade(&self.shared),
        });
        let id = self.manager.register(listener)?;

        match self.manager.is_building() {
            Ok(building) => {
                lock(&self.shared.inner).state.in_progress = building;
                tracing::debug!("Registered build listener {id} (building: {building})");
                Ok(id)
            }
            Err(e) => {
                if let Err(unregister_err) = self.manager.unregister(id) {
                    tracing::warn!("Failed to unregister build listener {id}: {unregister_err}");
                }
                Err(e.into())
            }
        }
    }

    fn release(&self, id: SubscriptionId) {
        let mut registration = lock(&self.shared.registration);

        let remaining = {
            let mut inner = lock(&self.shared.inner);
            inner.waiters.remove(&id);
            inner.waiters.len()
        };
        tracing::debug!("Released build lifecycle subscription {id}");

        if remaining > 0 {
            return;
        }

        if let Some(registration_id) = registration.take() {
            match self.manager.unregister(registration_id) {
                Ok(()) => tracing::debug!("Unregistered build listener {registration_id}"),
                Err(e) => {
                    tracing::warn!("Failed to unregister build listener {registration_id}: {e}");
                }
            }
        }
    }
}

impl fmt::Debug for BuildLifecycleTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildLifecycleTracker")
            .field("state", &self.current_state())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// A live subscription to build lifecycle notifications
///
/// Carries a one-shot signal fulfilled by the first cancel or done
/// notification after it was created. Released exactly once, either through
/// [`BuildLifecycleTracker::unsubscribe`] or on drop.
pub struct Subscription {
    id: SubscriptionId,
    tracker: BuildLifecycleTracker,
    receiver: Option<oneshot::Receiver<TerminalOutcome>>,
    released: bool,
}

impl Subscription {
    /// Wait for the next terminal notification
    ///
    /// Suspends without blocking the thread. There is no timeout.
    pub async fn wait_terminal(&mut self) -> Result<TerminalOutcome, LifecycleError> {
        let receiver = self.receiver.take().ok_or(LifecycleError::Detached)?;
        receiver.await.map_err(|_| LifecycleError::Detached)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.tracker.release(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}
