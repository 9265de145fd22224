//! Diesel row models for assembly task persistence.

use super::schema::assembly_tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assembly_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Serialized task aggregate.
    pub document: Value,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assembly_tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning job identifier.
    pub job_id: String,
    /// Role identifier.
    pub role_id: String,
    /// Stage identifier.
    pub stage_id: String,
    /// Assigned crew identifier.
    pub team_id: Option<String>,
    /// Task status.
    pub status: String,
    /// Planned date as supplied.
    pub planned_date: Option<String>,
    /// Serialized task aggregate.
    pub document: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written after a task mutation.
///
/// Job, role, and stage never change after creation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = assembly_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Assigned crew identifier.
    pub team_id: Option<String>,
    /// Task status.
    pub status: String,
    /// Planned date as supplied.
    pub planned_date: Option<String>,
    /// Serialized task aggregate.
    pub document: Value,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
