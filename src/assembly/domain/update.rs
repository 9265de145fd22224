//! Field-level task updates.
//!
//! Planners send partial updates: a field may be left alone, explicitly
//! cleared, or set to a new value. [`FieldUpdate`] keeps those three cases
//! apart so the merge in [`super::Task::apply_update`] does not depend on how
//! a transport layer encodes optionality.

use super::{PersonId, ScheduleDate, TaskStatus, TeamId};
use std::collections::BTreeSet;

/// Tri-state update for a single optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the field unchanged.
    Absent,
    /// Reset the field to empty.
    Clear,
    /// Overwrite the field.
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Maps transport-style optionality where `None` means "not supplied".
    #[must_use]
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Set)
    }

    /// Returns `true` if the field is left unchanged.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Merges the update into `field`.
    pub fn merge_into(self, field: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Clear => *field = None,
            Self::Set(value) => *field = Some(value),
        }
    }
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

/// Partial update of a task's schedule, assignment, status, and note.
///
/// Each field is applied independently. An explicit `status` is applied last
/// and therefore overrides the automatic `pending -> planned` advance that a
/// planned date triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Internal planned date.
    pub planned_date: FieldUpdate<ScheduleDate>,
    /// Assigned crew identifier.
    pub team_id: FieldUpdate<TeamId>,
    /// Assigned crew display name.
    pub team_name: FieldUpdate<String>,
    /// Assigned people. Clearing empties the set.
    pub assigned_personnel: FieldUpdate<BTreeSet<PersonId>>,
    /// Explicit status override.
    pub status: Option<TaskStatus>,
    /// Free-text note.
    pub note: FieldUpdate<String>,
}

impl TaskUpdate {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the planned date.
    #[must_use]
    pub fn with_planned_date(mut self, planned_date: ScheduleDate) -> Self {
        self.planned_date = FieldUpdate::Set(planned_date);
        self
    }

    /// Assigns a crew.
    #[must_use]
    pub fn with_team(mut self, team_id: TeamId, team_name: impl Into<String>) -> Self {
        self.team_id = FieldUpdate::Set(team_id);
        self.team_name = FieldUpdate::Set(team_name.into());
        self
    }

    /// Replaces the assigned people.
    #[must_use]
    pub fn with_personnel(mut self, personnel: impl IntoIterator<Item = PersonId>) -> Self {
        self.assigned_personnel = FieldUpdate::Set(personnel.into_iter().collect());
        self
    }

    /// Forces the status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = FieldUpdate::Set(note.into());
        self
    }
}
