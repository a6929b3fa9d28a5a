//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Insert model for task records.
///
/// Reads rehydrate the aggregate from the `record` column alone, so no
/// query counterpart exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning property identifier.
    pub property_id: uuid::Uuid,
    /// Work lifecycle status.
    pub status: String,
    /// Offer/acceptance state.
    pub assignment: String,
    /// Serialized task aggregate.
    pub record: Value,
    /// Optimistic-concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
