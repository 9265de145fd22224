//! `PostgreSQL` task store.
//!
//! Each row carries the full task as a JSONB document next to the columns
//! that scans filter on. Mutations run inside a transaction holding row
//! locks, so concurrent read-modify-write cycles on a task serialise.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::assembly_tasks,
};
use crate::assembly::{
    domain::{JobId, Task, TaskId},
    ports::{JobMutator, TaskMutator, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by assembly adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

impl From<DieselError> for TaskStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(assembly_tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, task_id))?;
            Ok(())
        })
        .await
    }

    async fn insert_stage(&self, task: &Task) -> TaskStoreResult<bool> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx_conn| {
                // Serialises provisioning per job; row locks cannot cover rows
                // that do not exist yet.
                diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
                    .bind::<diesel::sql_types::Text, _>(new_row.job_id.clone())
                    .execute(tx_conn)?;

                let existing = assembly_tasks::table
                    .filter(assembly_tasks::job_id.eq(&new_row.job_id))
                    .filter(assembly_tasks::role_id.eq(&new_row.role_id))
                    .filter(assembly_tasks::stage_id.eq(&new_row.stage_id))
                    .select(assembly_tasks::id)
                    .first::<uuid::Uuid>(tx_conn)
                    .optional()?;
                if existing.is_some() {
                    return Ok(false);
                }

                diesel::insert_into(assembly_tasks::table)
                    .values(&new_row)
                    .execute(tx_conn)
                    .map_err(|err| map_insert_error(err, task_id))?;
                Ok(true)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = assembly_tasks::table
                .filter(assembly_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn scan(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>> {
        let filters = query.clone();
        self.run_blocking(move |connection| {
            let rows = build_scan(&filters).load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update(&self, id: TaskId, mutator: TaskMutator) -> TaskStoreResult<Task> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx_conn| {
                let row = assembly_tasks::table
                    .filter(assembly_tasks::id.eq(id.into_inner()))
                    .select(TaskRow::as_select())
                    .for_update()
                    .first::<TaskRow>(tx_conn)
                    .optional()?
                    .ok_or(TaskStoreError::NotFound(id))?;
                let mut task = row_to_task(row)?;
                mutator(&mut task).map_err(TaskStoreError::Rejected)?;
                write_back(tx_conn, &task)?;
                Ok(task)
            })
        })
        .await
    }

    async fn update_job(
        &self,
        job_id: &JobId,
        mutator: JobMutator,
    ) -> TaskStoreResult<Vec<Task>> {
        let job_key = job_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx_conn| {
                let rows = assembly_tasks::table
                    .filter(assembly_tasks::job_id.eq(&job_key))
                    .order(assembly_tasks::seq.asc())
                    .select(TaskRow::as_select())
                    .for_update()
                    .load::<TaskRow>(tx_conn)?;
                let mut tasks = rows
                    .into_iter()
                    .map(row_to_task)
                    .collect::<TaskStoreResult<Vec<_>>>()?;
                mutator(&mut tasks).map_err(TaskStoreError::Rejected)?;
                for task in &tasks {
                    write_back(tx_conn, task)?;
                }
                Ok(tasks)
            })
        })
        .await
    }
}

fn build_scan(
    query: &TaskQuery,
) -> assembly_tasks::BoxedQuery<
    'static,
    diesel::pg::Pg,
    (diesel::sql_types::Uuid, diesel::sql_types::Jsonb),
> {
    use assembly_tasks::dsl;

    let mut statement = assembly_tasks::table
        .order(dsl::seq.asc())
        .select((dsl::id, dsl::document))
        .into_boxed();

    if let Some(job_id) = &query.job_id {
        statement = statement.filter(dsl::job_id.eq(job_id.as_str().to_owned()));
    }
    if let Some(role_id) = &query.role_id {
        statement = statement.filter(dsl::role_id.eq(role_id.as_str().to_owned()));
    }
    if let Some(team_id) = &query.team_id {
        statement = statement.filter(dsl::team_id.eq(team_id.as_str().to_owned()));
    }
    if let Some(status) = query.status {
        statement = statement.filter(dsl::status.eq(status.as_str().to_owned()));
    }
    // An absent planned date compares as the empty string.
    if let Some(from) = query.planned_from.as_ref().filter(|from| !from.is_empty()) {
        statement = statement.filter(dsl::planned_date.ge(from.clone()));
    }
    if let Some(to) = &query.planned_to {
        statement = statement.filter(
            dsl::planned_date
                .le(to.clone())
                .or(dsl::planned_date.is_null()),
        );
    }
    if let Some(day) = &query.planned_on {
        statement = statement.filter(dsl::planned_date.eq(day.as_str().to_owned()));
    }
    statement
}

fn write_back(connection: &mut PgConnection, task: &Task) -> TaskStoreResult<()> {
    let changeset = to_changeset(task)?;
    diesel::update(assembly_tasks::table.filter(assembly_tasks::id.eq(task.id().into_inner())))
        .set(&changeset)
        .execute(connection)?;
    Ok(())
}

fn to_new_row(task: &Task) -> TaskStoreResult<NewTaskRow> {
    let document = serde_json::to_value(task).map_err(TaskStoreError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        job_id: task.job_id().as_str().to_owned(),
        role_id: task.role().id.as_str().to_owned(),
        stage_id: task.stage().id.as_str().to_owned(),
        team_id: task.team_id().map(|team| team.as_str().to_owned()),
        status: task.status().as_str().to_owned(),
        planned_date: task.planned_date().map(|date| date.as_str().to_owned()),
        document,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> TaskStoreResult<TaskChangeset> {
    let document = serde_json::to_value(task).map_err(TaskStoreError::persistence)?;

    Ok(TaskChangeset {
        team_id: task.team_id().map(|team| team.as_str().to_owned()),
        status: task.status().as_str().to_owned(),
        planned_date: task.planned_date().map(|date| date.as_str().to_owned()),
        document,
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow { id, document } = row;
    let task = serde_json::from_value::<Task>(document).map_err(TaskStoreError::persistence)?;
    if task.id().into_inner() != id {
        return Err(TaskStoreError::persistence(std::io::Error::other(format!(
            "task document {} stored under row {id}",
            task.id()
        ))));
    }
    Ok(task)
}

fn map_insert_error(err: DieselError, task_id: TaskId) -> TaskStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskStoreError::DuplicateTask(task_id)
        }
        _ => TaskStoreError::persistence(err),
    }
}
