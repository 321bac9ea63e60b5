//! Core command logic
//!
//! Build lifecycle tracking, the start gate, command invocation and status
//! resolution. Process handling belongs in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`tracker`] - Build lifecycle tracking and terminal fan-out
//! - [`gate`] - Start/status decisions from the build state
//! - [`invoker`] - One generate-package invocation end to end
//! - [`resolver`] - Command status queries
//! - [`command`] - Host-facing generate-package command
//! - [`target`] - Selected project nodes
//! - [`state`] - Build state and command results
//! - [`properties`] - Package-on-build property
//! - [`settings`] - `packgate.toml` settings

pub mod command;
pub mod gate;
pub mod invoker;
pub mod properties;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod target;
pub mod tracker;
