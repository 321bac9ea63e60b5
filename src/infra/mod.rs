//! Infrastructure layer
//!
//! The build manager boundary, the process-backed build manager and
//! platform directories. This module is the only place where child processes
//! are started.

pub mod build_manager;
pub mod dirs;
pub mod process_manager;
