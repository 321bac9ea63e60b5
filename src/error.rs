//! Error types for packgate
//!
//! Domain-specific error types using thiserror. The CLI wraps these with
//! `anyhow` context at its edge.

use thiserror::Error;

/// Structural command target errors
///
/// These never surface as `Err` from the command paths; they are turned into
/// `handled = false` results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// No nodes were selected
    #[error("Command target is empty")]
    Empty,

    /// More than one node was selected
    #[error("Command target has {count} nodes, expected exactly one project root")]
    MultipleNodes { count: usize },

    /// The selected node is not the project root
    #[error("Node '{name}' is not a project root")]
    NotProjectRoot { name: String },
}

/// Errors raised by a build manager when asked to start a build
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildRequestError {
    /// The manager already runs a build
    #[error("A build is already in progress")]
    Busy,

    /// The target does not name a buildable project
    #[error("Cannot build target: {0}")]
    Target(#[from] TargetError),

    /// The manager cannot accept requests at all
    #[error("Build manager unavailable: {message}")]
    Unavailable { message: String },

    /// The build process could not be spawned
    #[error("Failed to spawn build command '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// Errors raised by a build manager for registration and queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildManagerError {
    /// The manager cannot be reached
    #[error("Build manager unavailable: {message}")]
    Unavailable { message: String },

    /// Unregistering an id the manager does not know
    #[error("Unknown listener registration {id}")]
    UnknownRegistration { id: u64 },
}

/// Build lifecycle tracking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Registering the lifecycle listener failed
    #[error("Failed to register for build notifications: {0}")]
    Registration(#[from] BuildManagerError),

    /// The tracker went away before a terminal notification arrived
    #[error("Build lifecycle tracker detached before the build finished")]
    Detached,
}

/// Command invocation faults
///
/// Only infrastructure failures are faults; busy and invalid-target cases are
/// ordinary results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// Could not subscribe to build notifications
    #[error("Could not observe the build: {0}")]
    Subscribe(#[from] LifecycleError),

    /// The build manager rejected the request
    #[error("Build request rejected: {0}")]
    Request(#[from] BuildRequestError),
}

/// Settings loading errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    Read { path: String, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    Parse { path: String, error: String },

    /// A command list is empty
    #[error("Setting '{key}' must name a program")]
    EmptyCommand { key: String },
}
