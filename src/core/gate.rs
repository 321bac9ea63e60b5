//! Build request gate
//!
//! Pure enablement policy over a [`BuildState`]. Nothing here suspends or
//! touches the build manager.

use super::state::{BuildState, CommandStatus, StatusFlags};

/// Whether a new build may be started
pub fn can_start(state: &BuildState) -> bool {
    !state.in_progress
}

/// Status flags for a structurally valid target
pub fn status_for(state: &BuildState) -> CommandStatus {
    let flags = if can_start(state) {
        StatusFlags::SUPPORTED_ENABLED
    } else {
        StatusFlags::SUPPORTED
    };
    CommandStatus::handled(flags)
}
