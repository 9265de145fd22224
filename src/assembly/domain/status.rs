//! Task status values and the canonical lifecycle graph.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assembly task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task exists but has not been scheduled.
    Pending,
    /// Task has a planned date.
    Planned,
    /// Crew has started work.
    InProgress,
    /// Work is finished and signed off.
    Completed,
    /// Work is halted by at least one reported issue.
    Blocked,
}

impl TaskStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Planned,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// Returns `true` when no further work is expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns whether `target` is an edge of the canonical lifecycle graph.
    ///
    /// The engine does not refuse transitions outside this graph (explicit
    /// status overrides, starting a completed task, and reporting an issue on
    /// a pending or completed task are all applied), but callers use this to
    /// flag them.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Planned | Self::InProgress | Self::Completed
            ) | (
                Self::Planned,
                Self::InProgress | Self::Completed | Self::Blocked
            ) | (Self::InProgress, Self::Completed | Self::Blocked)
                | (Self::Blocked, Self::Planned | Self::InProgress)
        )
    }

    /// Sort key for the daily crew manifest: work in progress first, then
    /// unscheduled work, then everything else.
    #[must_use]
    pub const fn manifest_priority(self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Pending => 1,
            Self::Planned | Self::Completed | Self::Blocked => 2,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
