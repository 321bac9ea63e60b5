//! Command state model
//!
//! Value types shared by the tracker, the gate, the invoker and the resolver.

use serde::Serialize;
use std::fmt;

/// Most recent terminal notification seen by the tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LastOutcome {
    /// No build has finished yet
    #[default]
    None,
    /// Last build finished
    Succeeded,
    /// Last build was cancelled
    Cancelled,
}

/// Build lifecycle state as seen from one tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildState {
    /// True between a begin notification and its cancel/done
    pub in_progress: bool,
    /// Last terminal notification observed
    pub last_outcome: LastOutcome,
}

impl BuildState {
    /// Idle state with no history
    pub fn idle() -> Self {
        Self::default()
    }

    /// State with a build running
    pub fn building() -> Self {
        Self {
            in_progress: true,
            last_outcome: LastOutcome::None,
        }
    }
}

/// How a terminal notification ended a build session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalOutcome {
    /// `Done` was received
    Succeeded,
    /// `Cancel` was received
    Cancelled,
}

impl From<TerminalOutcome> for LastOutcome {
    fn from(outcome: TerminalOutcome) -> Self {
        match outcome {
            TerminalOutcome::Succeeded => Self::Succeeded,
            TerminalOutcome::Cancelled => Self::Cancelled,
        }
    }
}

/// Outcome of one command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationOutcome {
    /// No build was requested (busy or invalid target)
    NotStarted,
    /// The requested build finished
    Succeeded,
    /// The requested build was cancelled
    Cancelled,
}

impl From<TerminalOutcome> for InvocationOutcome {
    fn from(outcome: TerminalOutcome) -> Self {
        match outcome {
            TerminalOutcome::Succeeded => Self::Succeeded,
            TerminalOutcome::Cancelled => Self::Cancelled,
        }
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotStarted => "not started",
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Result of invoking the command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    /// Whether the command recognised and processed the request
    pub handled: bool,
    /// What happened to the build
    pub outcome: InvocationOutcome,
}

impl InvocationResult {
    /// The target did not apply to this command
    pub fn unhandled() -> Self {
        Self {
            handled: false,
            outcome: InvocationOutcome::NotStarted,
        }
    }

    /// Handled without starting a build
    pub fn not_started() -> Self {
        Self {
            handled: true,
            outcome: InvocationOutcome::NotStarted,
        }
    }

    /// Handled, build reached a terminal notification
    pub fn finished(outcome: TerminalOutcome) -> Self {
        Self {
            handled: true,
            outcome: outcome.into(),
        }
    }
}

/// Command status flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StatusFlags {
    /// The command applies to the target
    pub supported: bool,
    /// The command can run now
    pub enabled: bool,
}

impl StatusFlags {
    /// No flags set
    pub const NONE: Self = Self {
        supported: false,
        enabled: false,
    };

    /// Supported only
    pub const SUPPORTED: Self = Self {
        supported: true,
        enabled: false,
    };

    /// Supported and enabled
    pub const SUPPORTED_ENABLED: Self = Self {
        supported: true,
        enabled: true,
    };
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.supported {
            names.push("supported");
        }
        if self.enabled {
            names.push("enabled");
        }
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

/// Status reported to the command surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandStatus {
    /// Whether the command answered for this target
    pub handled: bool,
    /// Status flags
    pub flags: StatusFlags,
}

impl CommandStatus {
    /// The command does not apply to the target
    pub fn unhandled() -> Self {
        Self {
            handled: false,
            flags: StatusFlags::NONE,
        }
    }

    /// Handled with the given flags
    pub fn handled(flags: StatusFlags) -> Self {
        Self {
            handled: true,
            flags,
        }
    }
}
