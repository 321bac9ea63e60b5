//! Test utilities
//!
//! A scripted in-memory build manager, a recording property provider and
//! proptest generators.

#[cfg(test)]
pub use scripted::{RecordingProperty, ScriptedBuildManager};

#[cfg(test)]
mod scripted {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::core::properties::PackageOnBuildProperty;
    use crate::core::target::CommandTarget;
    use crate::error::{BuildManagerError, BuildRequestError};
    use crate::infra::build_manager::{
        BuildEvent, BuildEventListener, BuildManager, RegistrationId,
    };

    /// How scripted notifications are delivered after a build request
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Delivery {
        /// Emitted before `request_build` returns
        Inline,
        /// Emitted from a separate OS thread
        Thread,
    }

    /// Listener table shared with replay threads
    #[derive(Default)]
    struct Shared {
        listeners: Mutex<HashMap<u64, Arc<dyn BuildEventListener>>>,
        building: AtomicBool,
    }

    impl Shared {
        fn emit(&self, event: BuildEvent) {
            match event {
                BuildEvent::Begin => self.building.store(true, Ordering::SeqCst),
                BuildEvent::Cancel | BuildEvent::Done => {
                    self.building.store(false, Ordering::SeqCst);
                }
            }
            let listeners: Vec<_> = self.listeners.lock().unwrap().values().cloned().collect();
            for listener in listeners {
                listener.on_event(event);
            }
        }
    }

    /// In-memory build manager that replays a fixed notification script
    pub struct ScriptedBuildManager {
        shared: Arc<Shared>,
        next_id: AtomicU64,
        script: Vec<BuildEvent>,
        delivery: Delivery,
        fail_register: bool,
        fail_busy_query: bool,
        request_error: Option<BuildRequestError>,
        register_calls: AtomicUsize,
        unregister_calls: AtomicUsize,
        request_calls: AtomicUsize,
        cancel_calls: AtomicUsize,
        busy_query_calls: AtomicUsize,
        requested: Mutex<Vec<CommandTarget>>,
    }

    impl ScriptedBuildManager {
        /// Idle manager with an empty script
        pub fn new() -> Self {
            Self {
                shared: Arc::new(Shared::default()),
                next_id: AtomicU64::new(1),
                script: Vec::new(),
                delivery: Delivery::Inline,
                fail_register: false,
                fail_busy_query: false,
                request_error: None,
                register_calls: AtomicUsize::new(0),
                unregister_calls: AtomicUsize::new(0),
                request_calls: AtomicUsize::new(0),
                cancel_calls: AtomicUsize::new(0),
                busy_query_calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        /// Report a build as already running
        pub fn building(self, building: bool) -> Self {
            self.shared.building.store(building, Ordering::SeqCst);
            self
        }

        /// Notifications to emit for each build request
        pub fn script(mut self, events: &[BuildEvent]) -> Self {
            self.script = events.to_vec();
            self
        }

        /// Deliver scripted notifications from another thread
        pub fn deliver_on_thread(mut self) -> Self {
            self.delivery = Delivery::Thread;
            self
        }

        /// Reject listener registration
        pub fn fail_register(mut self) -> Self {
            self.fail_register = true;
            self
        }

        /// Fail the busy query
        pub fn fail_busy_query(mut self) -> Self {
            self.fail_busy_query = true;
            self
        }

        /// Reject build requests with `error`
        pub fn fail_request(mut self, error: BuildRequestError) -> Self {
            self.request_error = Some(error);
            self
        }

        /// Deliver a notification to every registered listener
        pub fn emit(&self, event: BuildEvent) {
            self.shared.emit(event);
        }

        pub fn register_calls(&self) -> usize {
            self.register_calls.load(Ordering::SeqCst)
        }

        pub fn unregister_calls(&self) -> usize {
            self.unregister_calls.load(Ordering::SeqCst)
        }

        pub fn request_calls(&self) -> usize {
            self.request_calls.load(Ordering::SeqCst)
        }

        pub fn cancel_calls(&self) -> usize {
            self.cancel_calls.load(Ordering::SeqCst)
        }

        pub fn busy_query_calls(&self) -> usize {
            self.busy_query_calls.load(Ordering::SeqCst)
        }

        pub fn listener_count(&self) -> usize {
            self.shared.listeners.lock().unwrap().len()
        }

        pub fn requested_targets(&self) -> Vec<CommandTarget> {
            self.requested.lock().unwrap().clone()
        }

        fn replay(&self) {
            let shared = Arc::clone(&self.shared);
            let script = self.script.clone();
            let run = move || {
                for event in script {
                    shared.emit(event);
                }
            };
            match self.delivery {
                Delivery::Inline => run(),
                Delivery::Thread => {
                    std::thread::spawn(run);
                }
            }
        }
    }

    impl Default for ScriptedBuildManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BuildManager for ScriptedBuildManager {
        fn register(
            &self,
            listener: Arc<dyn BuildEventListener>,
        ) -> Result<RegistrationId, BuildManagerError> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_register {
                return Err(BuildManagerError::Unavailable {
                    message: "scripted registration failure".to_string(),
                });
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.shared.listeners.lock().unwrap().insert(id, listener);
            Ok(RegistrationId(id))
        }

        fn unregister(&self, id: RegistrationId) -> Result<(), BuildManagerError> {
            self.unregister_calls.fetch_add(1, Ordering::SeqCst);
            match self.shared.listeners.lock().unwrap().remove(&id.0) {
                Some(_) => Ok(()),
                None => Err(BuildManagerError::UnknownRegistration { id: id.0 }),
            }
        }

        fn is_building(&self) -> Result<bool, BuildManagerError> {
            self.busy_query_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_busy_query {
                return Err(BuildManagerError::Unavailable {
                    message: "scripted busy query failure".to_string(),
                });
            }
            Ok(self.shared.building.load(Ordering::SeqCst))
        }

        fn request_build(&self, target: &CommandTarget) -> Result<(), BuildRequestError> {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(target.clone());
            if let Some(error) = &self.request_error {
                return Err(error.clone());
            }
            self.replay();
            Ok(())
        }

        fn cancel(&self) -> bool {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            if self.shared.building.load(Ordering::SeqCst) {
                self.emit(BuildEvent::Cancel);
                true
            } else {
                false
            }
        }
    }

    /// Property provider that records every override it receives
    #[derive(Default)]
    pub struct RecordingProperty {
        value: bool,
        current: Mutex<Option<bool>>,
        history: Mutex<Vec<Option<bool>>>,
    }

    impl RecordingProperty {
        pub fn new(value: bool) -> Self {
            Self {
                value,
                ..Self::default()
            }
        }

        /// Every override applied, in order
        pub fn history(&self) -> Vec<Option<bool>> {
            self.history.lock().unwrap().clone()
        }

        /// Override currently in effect
        pub fn current_override(&self) -> Option<bool> {
            *self.current.lock().unwrap()
        }
    }

    impl PackageOnBuildProperty for RecordingProperty {
        fn should_generate_on_build(&self, _target: &CommandTarget) -> bool {
            self.current_override().unwrap_or(self.value)
        }

        fn override_generate_on_build(&self, value: Option<bool>) {
            *self.current.lock().unwrap() = value;
            self.history.lock().unwrap().push(value);
        }
    }
}

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::target::{CommandTarget, NodeKind, ProjectNode};

    /// Generate a node kind
    pub fn node_kind() -> impl Strategy<Value = NodeKind> {
        prop_oneof![
            Just(NodeKind::ProjectRoot),
            Just(NodeKind::Folder),
            Just(NodeKind::File),
        ]
    }

    /// Generate a node name (lowercase alphanumeric with hyphens)
    pub fn node_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,20}"
    }

    /// Generate an arbitrary node selection, valid or not
    pub fn command_target() -> impl Strategy<Value = CommandTarget> {
        prop::collection::vec((node_name(), node_kind()), 0..4).prop_map(|nodes| {
            CommandTarget::new(
                nodes
                    .into_iter()
                    .map(|(name, kind)| {
                        let path = format!("/work/{name}");
                        ProjectNode::new(name, path, kind)
                    })
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::core::target::NodeKind;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_command_target_generator(target in command_target()) {
            let valid = target.nodes().len() == 1
                && target.nodes()[0].kind == NodeKind::ProjectRoot;
            prop_assert_eq!(target.is_valid(), valid);
        }
    }
}
