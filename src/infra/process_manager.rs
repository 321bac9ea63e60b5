//! Process-backed build manager
//!
//! Runs the configured build command, followed by the pack command when
//! package-on-build evaluates true, as child processes in the project
//! directory. Each request is one build session reported as `Begin` followed
//! by `Cancel` or `Done`. Only one session runs at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use super::build_manager::{BuildEvent, BuildEventListener, BuildManager, RegistrationId};
use crate::core::properties::PackageOnBuildProperty;
use crate::core::settings::Settings;
use crate::core::target::CommandTarget;
use crate::error::{BuildManagerError, BuildRequestError};

/// One command of a build session
#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildStep {
    name: &'static str,
    command: Vec<String>,
}

impl BuildStep {
    fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    fn spawn(&self, dir: &Path) -> Result<Child, BuildRequestError> {
        let (program, args) =
            self.command
                .split_first()
                .ok_or_else(|| BuildRequestError::Spawn {
                    program: String::new(),
                    error: format!("{} command is empty", self.name),
                })?;

        tracing::debug!("Running {} step: {}", self.name, self.command.join(" "));

        Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BuildRequestError::Spawn {
                program: program.clone(),
                error: e.to_string(),
            })
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// State shared with running sessions
#[derive(Default)]
struct Shared {
    listeners: Mutex<HashMap<u64, Arc<dyn BuildEventListener>>>,
    next_id: AtomicU64,
    running: Mutex<Option<CancellationToken>>,
}

impl Shared {
    fn emit(&self, event: BuildEvent) {
        tracing::debug!("Build event: {event}");
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener.on_event(event);
        }
    }

    fn running(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build manager running external commands on the tokio runtime
pub struct ProcessBuildManager {
    shared: Arc<Shared>,
    build_command: Vec<String>,
    pack_command: Vec<String>,
    property: Arc<dyn PackageOnBuildProperty>,
    runtime: Handle,
}

impl ProcessBuildManager {
    /// Create a manager for the commands in `settings`
    ///
    /// Must be called from within a tokio runtime. Fails when the build
    /// program cannot be found or a command is misconfigured.
    pub fn new(
        settings: &Settings,
        property: Arc<dyn PackageOnBuildProperty>,
    ) -> Result<Self, BuildManagerError> {
        let unavailable = |message: String| BuildManagerError::Unavailable { message };

        let build_command = settings
            .build_command()
            .map_err(|e| unavailable(e.to_string()))?;
        let pack_command = settings
            .pack_command()
            .map_err(|e| unavailable(e.to_string()))?;

        which::which(&build_command[0])
            .map_err(|e| unavailable(format!("build program '{}': {e}", build_command[0])))?;

        let runtime = Handle::try_current().map_err(|e| unavailable(e.to_string()))?;

        Ok(Self {
            shared: Arc::new(Shared::default()),
            build_command,
            pack_command,
            property,
            runtime,
        })
    }

    fn steps(&self, target: &CommandTarget) -> Vec<BuildStep> {
        let mut steps = vec![BuildStep {
            name: "build",
            command: self.build_command.clone(),
        }];
        if self.property.should_generate_on_build(target) {
            steps.push(BuildStep {
                name: "pack",
                command: self.pack_command.clone(),
            });
        }
        steps
    }
}

impl BuildManager for ProcessBuildManager {
    fn register(
        &self,
        listener: Arc<dyn BuildEventListener>,
    ) -> Result<RegistrationId, BuildManagerError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        tracing::trace!("Registered build listener {id}");
        Ok(RegistrationId(id))
    }

    fn unregister(&self, id: RegistrationId) -> Result<(), BuildManagerError> {
        let removed = self
            .shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id.0);
        match removed {
            Some(_) => {
                tracing::trace!("Unregistered build listener {id}");
                Ok(())
            }
            None => Err(BuildManagerError::UnknownRegistration { id: id.0 }),
        }
    }

    fn is_building(&self) -> Result<bool, BuildManagerError> {
        Ok(self.shared.running().is_some())
    }

    fn request_build(&self, target: &CommandTarget) -> Result<(), BuildRequestError> {
        let project_dir = target.project_root()?.path.clone();

        let mut running = self.shared.running();
        if running.is_some() {
            return Err(BuildRequestError::Busy);
        }

        let mut steps = self.steps(target);
        let first = steps.remove(0);
        let child = {
            let _runtime = self.runtime.enter();
            first.spawn(&project_dir)?
        };

        let token = CancellationToken::new();
        *running = Some(token.clone());
        drop(running);

        tracing::info!(
            "Starting build in {} ({} step(s))",
            project_dir.display(),
            steps.len() + 1
        );

        let session = Session {
            shared: Arc::clone(&self.shared),
            dir: project_dir,
            token,
        };
        self.runtime.spawn(session.run(first, child, steps));
        Ok(())
    }

    fn cancel(&self) -> bool {
        match self.shared.running().as_ref() {
            Some(token) => {
                tracing::info!("Cancelling running build");
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// One running build session
struct Session {
    shared: Arc<Shared>,
    dir: PathBuf,
    token: CancellationToken,
}

impl Session {
    async fn run(self, first: BuildStep, child: Child, rest: Vec<BuildStep>) {
        self.shared.emit(BuildEvent::Begin);

        let mut outcome = self.wait(&first, child).await;
        for step in &rest {
            if outcome != StepOutcome::Succeeded {
                break;
            }
            outcome = match step.spawn(&self.dir) {
                Ok(child) => self.wait(step, child).await,
                Err(e) => {
                    tracing::warn!("{e}");
                    StepOutcome::Failed
                }
            };
        }

        let cancelled = outcome == StepOutcome::Cancelled || self.token.is_cancelled();
        *self.shared.running() = None;

        self.shared.emit(if cancelled {
            BuildEvent::Cancel
        } else {
            BuildEvent::Done
        });
    }

    async fn wait(&self, step: &BuildStep, child: Child) -> StepOutcome {
        tokio::select! {
            () = self.token.cancelled() => {
                tracing::info!("{} step cancelled", step.name);
                StepOutcome::Cancelled
            }
            output = child.wait_with_output() => match output {
                Ok(output) if output.status.success() => {
                    tracing::debug!(
                        "{} step finished: {}",
                        step.name,
                        String::from_utf8_lossy(&output.stdout).trim_end()
                    );
                    StepOutcome::Succeeded
                }
                Ok(output) => {
                    tracing::warn!(
                        "{} step '{}' failed with {}: {}",
                        step.name,
                        step.program(),
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim_end()
                    );
                    StepOutcome::Failed
                }
                Err(e) => {
                    tracing::warn!("{} step '{}' failed: {e}", step.name, step.program());
                    StepOutcome::Failed
                }
            },
        }
    }
}
