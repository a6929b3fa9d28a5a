//! `PostgreSQL` store implementation for task lifecycle persistence.

use super::{models::NewTaskRow, schema::tasks};
use crate::task::{
    domain::{PropertyId, TaskId, TaskRecord},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
///
/// The aggregate is persisted whole as `jsonb`; status, assignment, property
/// and revision are mirrored into scalar columns for filtering and for the
/// conditional-update concurrency check.
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

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn insert(&self, task: &TaskRecord) -> TaskStoreResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskStoreError::DuplicateTask(task_id)
                    }
                    _ => TaskStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &TaskRecord, expected_revision: u64) -> TaskStoreResult<()> {
        let task_id = task.id();
        let expected = i64::try_from(expected_revision).map_err(TaskStoreError::persistence)?;
        let new_revision = i64::try_from(task.revision()).map_err(TaskStoreError::persistence)?;
        let record = serde_json::to_value(task).map_err(TaskStoreError::persistence)?;
        let status = task.status().as_str().to_owned();
        let assignment = task.assignment().as_str().to_owned();
        let updated_at = task.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::revision.eq(expected)),
            )
            .set((
                tasks::status.eq(status),
                tasks::assignment.eq(assignment),
                tasks::record.eq(record),
                tasks::revision.eq(new_revision),
                tasks::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(TaskStoreError::persistence)?;

            if affected == 0 {
                let exists = tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .count()
                    .get_result::<i64>(connection)
                    .map_err(TaskStoreError::persistence)?
                    > 0;
                if exists {
                    return Err(TaskStoreError::RevisionConflict(task_id));
                }
                return Err(TaskStoreError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>> {
        self.run_blocking(move |connection| {
            let record = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(tasks::record)
                .first::<Value>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            record.map(record_to_task).transpose()
        })
        .await
    }

    async fn list_for_property(&self, property_id: PropertyId) -> TaskStoreResult<Vec<TaskRecord>> {
        self.run_blocking(move |connection| {
            let records = tasks::table
                .filter(tasks::property_id.eq(property_id.into_inner()))
                .select(tasks::record)
                .load::<Value>(connection)
                .map_err(TaskStoreError::persistence)?;
            records.into_iter().map(record_to_task).collect()
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            if affected == 0 {
                return Err(TaskStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn to_new_row(task: &TaskRecord) -> TaskStoreResult<NewTaskRow> {
    let record = serde_json::to_value(task).map_err(TaskStoreError::persistence)?;
    let revision = i64::try_from(task.revision()).map_err(TaskStoreError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        property_id: task.property_id().into_inner(),
        status: task.status().as_str().to_owned(),
        assignment: task.assignment().as_str().to_owned(),
        record,
        revision,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn record_to_task(record: Value) -> TaskStoreResult<TaskRecord> {
    serde_json::from_value::<TaskRecord>(record).map_err(TaskStoreError::persistence)
}
