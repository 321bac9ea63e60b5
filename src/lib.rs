//! packgate - generate-package command dispatch
//!
//! Starts a project build with package generation forced on, unless a build
//! is already running, and reports whether the command is available.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Lifecycle tracking, gating, invocation and status resolution
//! - [`infra`] - Build manager boundary and the process-backed manager
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
